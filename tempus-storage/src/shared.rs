//! Serialised access for several callers
//!
//! The engine takes `&mut self`, so two tasks (the clock poll loop and a
//! radio callback, say) cannot both hold it. [`SharedEeprom`] parks it
//! behind a blocking mutex; pick the raw mutex for the context:
//!
//! - `NoopRawMutex` when every caller runs in the same executor
//! - `CriticalSectionRawMutex` when interrupts or other cores touch it

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::eeprom::Eeprom;

/// An [`Eeprom`] behind a blocking mutex
pub struct SharedEeprom<M: RawMutex, B, D> {
    inner: Mutex<M, RefCell<Eeprom<B, D>>>,
}

impl<M: RawMutex, B, D> SharedEeprom<M, B, D> {
    /// Wrap an engine
    pub const fn new(eeprom: Eeprom<B, D>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(eeprom)),
        }
    }

    /// Run `f` with exclusive access to the engine
    ///
    /// Panics if called re-entrantly from inside `f`.
    pub fn lock<R>(&self, f: impl FnOnce(&mut Eeprom<B, D>) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Like [`lock`](Self::lock), but returns `None` instead of panicking
    /// when the engine is already in use further up the stack
    pub fn try_lock<R>(&self, f: impl FnOnce(&mut Eeprom<B, D>) -> R) -> Option<R> {
        self.inner
            .lock(|cell| cell.try_borrow_mut().ok().map(|mut eeprom| f(&mut eeprom)))
    }

    /// Take the engine back out
    pub fn into_inner(self) -> Eeprom<B, D> {
        self.inner.into_inner().into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::sector::Sector;
    use crate::sim::{SimBus, SimDelay};
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    type Shared = SharedEeprom<NoopRawMutex, SimBus, SimDelay>;

    #[test]
    fn test_lock_serialises_requests() {
        let shared = Shared::new(Eeprom::new(SimBus::new(), SimDelay::new()));

        shared
            .lock(|eeprom| eeprom.write(Sector::A, 0, 0, b"tick"))
            .unwrap();
        shared
            .lock(|eeprom| eeprom.write_id_page(0, b"id"))
            .unwrap();

        let mut out = [0u8; 4];
        shared
            .lock(|eeprom| eeprom.read(Sector::A, 0, 0, &mut out))
            .unwrap();
        assert_eq!(&out, b"tick");

        let (bus, _) = shared.into_inner().release();
        assert_eq!(&bus.sector(Sector::Identification)[..2], b"id");
    }

    #[test]
    fn test_try_lock_reentrant() {
        let shared = Shared::new(Eeprom::new(SimBus::new(), SimDelay::new()));

        let nested = shared.lock(|_| shared.try_lock(|_| ()));
        assert_eq!(nested, None);

        let result = shared.try_lock(|eeprom| eeprom.write(Sector::D, 255, 255, &[1, 2]));
        assert_eq!(
            result,
            Some(Err(StorageError::InsufficientCapacity {
                requested: 2,
                available: 1
            }))
        );
    }
}
