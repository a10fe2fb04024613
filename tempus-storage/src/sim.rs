//! In-memory M24M02 model for host testing
//!
//! [`SimBus`] behaves like the real part on an I2C bus capped at
//! [`MAX_FRAME_SIZE`] bytes per transaction:
//!
//! - the first two bytes of a write set the address pointer
//! - written data wraps inside the current page
//! - reads continue from the pointer and roll over the whole sector
//! - a transaction to an unknown address is not acknowledged
//!
//! Every transaction is logged, and any one of them can be made to fail.

use alloc::vec;
use alloc::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

use crate::config::DEFAULT_ADDRESSES;
use crate::frame::{HEADER_SIZE, MAX_FRAME_SIZE, MAX_READ_PAYLOAD};
use crate::sector::{Sector, PAGE_SIZE, SECTOR_COUNT};

/// Content of never-written EEPROM cells
pub const ERASED: u8 = 0xFF;

/// Errors the model can report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimError {
    /// No device answers on this address
    NoDevice(u8),
    /// Transaction exceeded the transport frame limit
    FrameTooLarge(usize),
    /// Failure injected by the test
    Injected,
}

impl embedded_hal::i2c::Error for SimError {
    fn kind(&self) -> ErrorKind {
        match self {
            SimError::NoDevice(_) => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
            SimError::FrameTooLarge(_) => ErrorKind::Overrun,
            SimError::Injected => ErrorKind::Other,
        }
    }
}

/// One logged bus transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimTransaction {
    /// 7-bit device address
    pub device: u8,
    /// Bytes written (address header first, then any payload)
    pub written: Vec<u8>,
    /// Bytes read back
    pub read_len: usize,
}

impl SimTransaction {
    /// Whether this transaction wrote data into the array
    pub fn is_write(&self) -> bool {
        self.read_len == 0 && self.written.len() > HEADER_SIZE
    }

    /// Payload bytes after the address header
    pub fn payload(&self) -> &[u8] {
        self.written.get(HEADER_SIZE..).unwrap_or(&[])
    }
}

/// Simulated M24M02 on an I2C bus
#[derive(Debug, Clone)]
pub struct SimBus {
    addresses: [u8; SECTOR_COUNT],
    memory: [Vec<u8>; SECTOR_COUNT],
    pointers: [usize; SECTOR_COUNT],
    log: Vec<SimTransaction>,
    fail_at: Option<usize>,
    attempts: usize,
}

impl Default for SimBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SimBus {
    /// Erased device on the default addresses
    pub fn new() -> Self {
        Self::with_addresses(DEFAULT_ADDRESSES)
    }

    /// Erased device on custom addresses
    pub fn with_addresses(addresses: [u8; SECTOR_COUNT]) -> Self {
        Self {
            addresses,
            memory: Sector::ALL.map(|sector| vec![ERASED; sector.capacity()]),
            pointers: [0; SECTOR_COUNT],
            log: Vec::new(),
            fail_at: None,
            attempts: 0,
        }
    }

    /// Fail the transaction with this zero-based index (counting every
    /// attempt, including earlier failures)
    pub fn fail_transaction(&mut self, index: usize) {
        self.fail_at = Some(index);
    }

    /// Contents of a sector
    pub fn sector(&self, sector: Sector) -> &[u8] {
        &self.memory[sector.index()]
    }

    /// Mutable contents of a sector, for seeding test data
    pub fn sector_mut(&mut self, sector: Sector) -> &mut [u8] {
        &mut self.memory[sector.index()]
    }

    /// Successful transactions so far
    pub fn transactions(&self) -> &[SimTransaction] {
        &self.log
    }

    /// Successful write transactions so far
    pub fn writes(&self) -> impl Iterator<Item = &SimTransaction> {
        self.log.iter().filter(|t| t.is_write())
    }

    /// Forget logged transactions
    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    fn sector_for(&self, device: u8) -> Option<usize> {
        self.addresses.iter().position(|&a| a == device)
    }

    fn apply_write(&mut self, index: usize, bytes: &[u8]) {
        let size = self.memory[index].len();
        if bytes.len() < HEADER_SIZE {
            return;
        }

        // Identification page ignores the high byte
        let start = (bytes[0] as usize * PAGE_SIZE + bytes[1] as usize) % size;
        self.pointers[index] = start;

        let page_base = start - start % PAGE_SIZE;
        let mut low = start % PAGE_SIZE;
        for &byte in &bytes[HEADER_SIZE..] {
            self.memory[index][page_base + low] = byte;
            low = (low + 1) % PAGE_SIZE;
        }
        self.pointers[index] = page_base + low;
    }

    fn apply_read(&mut self, index: usize, buf: &mut [u8]) {
        let size = self.memory[index].len();
        let mut pointer = self.pointers[index];
        for slot in buf.iter_mut() {
            *slot = self.memory[index][pointer];
            pointer = (pointer + 1) % size;
        }
        self.pointers[index] = pointer;
    }
}

impl ErrorType for SimBus {
    type Error = SimError;
}

impl I2c for SimBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let attempt = self.attempts;
        self.attempts += 1;

        if self.fail_at == Some(attempt) {
            return Err(SimError::Injected);
        }

        let index = self.sector_for(address).ok_or(SimError::NoDevice(address))?;

        for op in operations.iter() {
            match op {
                Operation::Write(bytes) if bytes.len() > MAX_FRAME_SIZE => {
                    return Err(SimError::FrameTooLarge(bytes.len()));
                }
                Operation::Read(buf) if buf.len() > MAX_READ_PAYLOAD => {
                    return Err(SimError::FrameTooLarge(buf.len()));
                }
                _ => {}
            }
        }

        let mut record = SimTransaction {
            device: address,
            written: Vec::new(),
            read_len: 0,
        };

        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => {
                    self.apply_write(index, bytes);
                    record.written.extend_from_slice(bytes);
                }
                Operation::Read(buf) => {
                    self.apply_read(index, buf);
                    record.read_len += buf.len();
                }
            }
        }

        self.log.push(record);
        Ok(())
    }
}

/// Delay that records instead of sleeping
#[derive(Debug, Clone, Default)]
pub struct SimDelay {
    /// Millisecond delays requested, in order
    pub ms_calls: Vec<u32>,
    /// Total requested time in nanoseconds
    pub total_ns: u64,
}

impl SimDelay {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.ms_calls.push(ms);
        self.total_ns += ms as u64 * 1_000_000;
    }
}
