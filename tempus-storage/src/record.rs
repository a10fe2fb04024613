//! Typed record persistence
//!
//! Stores a serde value at a fixed EEPROM address using postcard:
//!
//! ```text
//! ┌──────────┬──────────────────────┐
//! │ LEN (BE) │ POSTCARD PAYLOAD     │
//! │ 2B       │ LEN bytes            │
//! └──────────┴──────────────────────┘
//! ```
//!
//! An erased length prefix (`0xFFFF`) means nothing was ever stored there.
//! Stores erase the prefix, write the body, then write the real prefix.

use embedded_hal::delay::DelayNs;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempus_hal::I2cBus;

use crate::eeprom::Eeprom;
use crate::error::StorageError;
use crate::plan::PagePlan;
use crate::sector::{Address, Sector};

/// Length prefix size
pub const RECORD_PREFIX_SIZE: usize = 2;

/// Length prefix of a never-written record
const ERASED_PREFIX: u16 = 0xFFFF;

/// Record persistence errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecordError<E> {
    /// EEPROM access failed
    Storage(StorageError<E>),
    /// Serialization failed (usually a short scratch buffer)
    Serialize,
    /// Stored bytes do not decode as the requested type
    Deserialize,
    /// Record does not fit the scratch buffer or the length prefix
    TooLarge,
    /// No record has been stored at this address
    Empty,
}

impl<E> From<StorageError<E>> for RecordError<E> {
    fn from(e: StorageError<E>) -> Self {
        RecordError::Storage(e)
    }
}

impl<B: I2cBus, D: DelayNs> Eeprom<B, D> {
    /// Serialize `value` into `scratch` and store it at `address`
    ///
    /// `scratch` must hold the prefix plus the serialized form. The prefix
    /// is erased first and rewritten only after the body has landed, so an
    /// interrupted store reads back as [`RecordError::Empty`]. Returns the
    /// number of record bytes on the device.
    pub fn store_record<T: Serialize>(
        &mut self,
        sector: Sector,
        address: Address,
        value: &T,
        scratch: &mut [u8],
    ) -> Result<usize, RecordError<B::Error>> {
        if scratch.len() < RECORD_PREFIX_SIZE {
            return Err(RecordError::TooLarge);
        }

        let (prefix, body) = scratch.split_at_mut(RECORD_PREFIX_SIZE);
        let len = postcard::to_slice(value, body)
            .map_err(|_| RecordError::Serialize)?
            .len();

        let encoded_len = u16::try_from(len)
            .ok()
            .filter(|&n| n != ERASED_PREFIX)
            .ok_or(RecordError::TooLarge)?;
        prefix.copy_from_slice(&encoded_len.to_be_bytes());

        let total = RECORD_PREFIX_SIZE + len;
        PagePlan::new(sector, address, total).map_err(StorageError::<B::Error>::from)?;

        self.write(
            sector,
            address.high,
            address.low,
            &ERASED_PREFIX.to_be_bytes(),
        )?;
        if len > 0 {
            let body_at = address
                .advance(RECORD_PREFIX_SIZE)
                .map_err(StorageError::<B::Error>::from)?;
            self.write(sector, body_at.high, body_at.low, &scratch[RECORD_PREFIX_SIZE..total])?;
        }
        self.write(sector, address.high, address.low, &scratch[..RECORD_PREFIX_SIZE])?;

        debug!("record: stored {=usize} bytes at {}:{}", total, sector, address);
        Ok(total)
    }

    /// Load the record stored at `address`, using `scratch` as read buffer
    pub fn load_record<T: DeserializeOwned>(
        &mut self,
        sector: Sector,
        address: Address,
        scratch: &mut [u8],
    ) -> Result<T, RecordError<B::Error>> {
        let mut prefix = [0u8; RECORD_PREFIX_SIZE];
        self.read(sector, address.high, address.low, &mut prefix)?;

        let len = u16::from_be_bytes(prefix);
        if len == ERASED_PREFIX {
            debug!("record: nothing stored at {}:{}", sector, address);
            return Err(RecordError::Empty);
        }

        let total = RECORD_PREFIX_SIZE + len as usize;
        let buffer = scratch.get_mut(..total).ok_or(RecordError::TooLarge)?;
        self.read(sector, address.high, address.low, buffer)?;

        postcard::from_bytes(&buffer[RECORD_PREFIX_SIZE..]).map_err(|_| RecordError::Deserialize)
    }
}
