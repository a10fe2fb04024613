//! M24M02 storage engine
//!
//! Turns `(sector, address, bytes)` requests into bus transactions:
//!
//! ```text
//! write(sector, high, low, data)
//!   └─ PagePlan        capacity check, page-bounded chunks
//!        └─ send_chunk      1-2 WriteFrames per chunk
//!             └─ I2cBus::write + settle delay
//! ```
//!
//! Requests are admitted before any traffic, so a refused request never
//! touches the device. A bus failure mid-request aborts at once and leaves
//! earlier pages written.

use embedded_hal::delay::DelayNs;
use tempus_hal::I2cBus;

use crate::config::EepromConfig;
use crate::error::StorageError;
use crate::frame::{read_frame_count, write_frame_count, WriteFrame, MAX_READ_PAYLOAD};
use crate::plan::{admit_page_chunk, PagePlan};
use crate::sector::{Address, Sector};

/// Paged EEPROM engine over an I2C bus
pub struct Eeprom<B, D> {
    bus: B,
    delay: D,
    config: EepromConfig,
}

impl<B: I2cBus, D: DelayNs> Eeprom<B, D> {
    /// Create an engine with the default board configuration
    pub fn new(bus: B, delay: D) -> Self {
        Self::with_config(bus, delay, EepromConfig::default())
    }

    /// Create an engine with a custom configuration
    pub fn with_config(bus: B, delay: D, config: EepromConfig) -> Self {
        Self { bus, delay, config }
    }

    /// Active configuration
    pub fn config(&self) -> &EepromConfig {
        &self.config
    }

    /// Direct bus access
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Direct delay access
    pub fn delay_mut(&mut self) -> &mut D {
        &mut self.delay
    }

    /// Give back the bus and delay
    pub fn release(self) -> (B, D) {
        (self.bus, self.delay)
    }

    /// Check that every sector's device address acknowledges
    ///
    /// Issues a one-byte current-address read per sector, stopping at the
    /// first failure.
    pub fn probe(&mut self) -> Result<(), StorageError<B::Error>> {
        for sector in Sector::ALL {
            let device = self.config.address(sector);
            let mut byte = [0u8; 1];
            if let Err(e) = self.bus.read(device, &mut byte) {
                warn!("eeprom: sector {} at {=u8:#x} did not answer", sector, device);
                return Err(StorageError::Bus(e));
            }
            trace!("eeprom: sector {} at {=u8:#x} ok", sector, device);
        }
        info!("eeprom: all sectors present");
        Ok(())
    }

    /// Write `data` starting at `(high, low)` in `sector`
    pub fn write(
        &mut self,
        sector: Sector,
        high: u8,
        low: u8,
        data: &[u8],
    ) -> Result<(), StorageError<B::Error>> {
        let plan = Self::admit(sector, Address::new(high, low), data.len())?;

        for chunk in plan {
            let chunk = chunk?;
            self.send_chunk(sector, chunk.address, &data[chunk.range()])?;
        }
        Ok(())
    }

    /// Read `out.len()` bytes starting at `(high, low)` in `sector`
    pub fn read(
        &mut self,
        sector: Sector,
        high: u8,
        low: u8,
        out: &mut [u8],
    ) -> Result<(), StorageError<B::Error>> {
        let plan = Self::admit(sector, Address::new(high, low), out.len())?;

        for chunk in plan {
            let chunk = chunk?;
            self.receive_chunk(sector, chunk.address, &mut out[chunk.range()])?;
        }
        Ok(())
    }

    /// Write into the identification page
    pub fn write_id_page(&mut self, low: u8, data: &[u8]) -> Result<(), StorageError<B::Error>> {
        self.write(Sector::Identification, 0, low, data)
    }

    /// Read from the identification page
    pub fn read_id_page(&mut self, low: u8, out: &mut [u8]) -> Result<(), StorageError<B::Error>> {
        self.read(Sector::Identification, 0, low, out)
    }

    /// Send one page chunk as one or two write transactions
    ///
    /// `payload` must stay inside the page at `address`. Each transaction is
    /// followed by the configured settle delay.
    pub fn send_chunk(
        &mut self,
        sector: Sector,
        address: Address,
        payload: &[u8],
    ) -> Result<(), StorageError<B::Error>> {
        admit_page_chunk(sector, address, payload.len())?;

        let device = self.config.address(sector);
        let mut at = address;
        let mut rest = payload;
        trace!(
            "eeprom: chunk of {=usize} bytes in {=usize} write frames",
            payload.len(),
            write_frame_count(payload.len())
        );

        while !rest.is_empty() {
            let (frame, taken) = WriteFrame::fill(at, rest);
            trace!(
                "eeprom: write {=usize} bytes to {}:{}",
                taken,
                sector,
                frame.address()
            );

            if let Err(e) = self.bus.write(device, frame.as_bytes()) {
                warn!("eeprom: write to {} failed at {}", sector, frame.address());
                return Err(StorageError::Bus(e));
            }
            self.delay.delay_ms(self.config.settle_delay_ms);

            at = at.within_page(taken);
            rest = &rest[taken..];
        }
        Ok(())
    }

    /// Fill `out` from one page chunk with one or two read transactions
    pub fn receive_chunk(
        &mut self,
        sector: Sector,
        address: Address,
        out: &mut [u8],
    ) -> Result<(), StorageError<B::Error>> {
        admit_page_chunk(sector, address, out.len())?;

        let device = self.config.address(sector);
        let mut at = address;
        trace!(
            "eeprom: chunk of {=usize} bytes in {=usize} read frames",
            out.len(),
            read_frame_count(out.len())
        );

        for piece in out.chunks_mut(MAX_READ_PAYLOAD) {
            trace!(
                "eeprom: read {=usize} bytes from {}:{=u8}:{=u8}",
                piece.len(),
                sector,
                at.high,
                at.low
            );

            if let Err(e) = self.bus.write_read(device, &at.to_bytes(), piece) {
                warn!("eeprom: read from {} failed at {}", sector, at);
                return Err(StorageError::Bus(e));
            }
            at = at.within_page(piece.len());
        }
        Ok(())
    }

    fn admit(
        sector: Sector,
        start: Address,
        len: usize,
    ) -> Result<PagePlan, StorageError<B::Error>> {
        match PagePlan::new(sector, start, len) {
            Ok(plan) => {
                debug!(
                    "eeprom: {=usize} bytes at {}:{}, {=usize} chunks",
                    len,
                    sector,
                    start,
                    plan.size_hint().0
                );
                Ok(plan)
            }
            Err(e) => {
                warn!("eeprom: refused {=usize} bytes at {}:{}: {}", len, sector, start, e);
                Err(e.into())
            }
        }
    }
}
