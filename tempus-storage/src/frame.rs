//! Transport frame staging
//!
//! The bus driver moves at most [`MAX_FRAME_SIZE`] bytes per transaction,
//! less than a page plus its address header. A page chunk is therefore sent
//! as one or two frames:
//!
//! ```text
//! ┌──────┬──────┬──────────────────────┐
//! │ HIGH │ LOW  │ PAYLOAD              │
//! │ 1B   │ 1B   │ 0-253B               │
//! └──────┴──────┴──────────────────────┘
//! ```
//!
//! Reads send the same two-byte header and receive up to
//! [`MAX_READ_PAYLOAD`] bytes back.

use heapless::Vec;

use crate::sector::Address;

/// Largest single bus transaction in bytes
pub const MAX_FRAME_SIZE: usize = 255;

/// Address header size (high byte, low byte)
pub const HEADER_SIZE: usize = 2;

/// Payload bytes that fit in one write frame
pub const MAX_WRITE_PAYLOAD: usize = MAX_FRAME_SIZE - HEADER_SIZE;

/// Bytes received per read transaction
pub const MAX_READ_PAYLOAD: usize = MAX_FRAME_SIZE - 1;

// Header plus the largest payload must fit one staged frame
const _: () = assert!(HEADER_SIZE + MAX_WRITE_PAYLOAD <= MAX_FRAME_SIZE);

/// One staged write transaction: address header plus payload
///
/// Lives on the caller's stack for the duration of one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteFrame {
    bytes: Vec<u8, MAX_FRAME_SIZE>,
}

impl WriteFrame {
    /// Stage as much of `payload` as fits in one frame
    ///
    /// Returns the frame and the number of payload bytes it took.
    pub fn fill(address: Address, payload: &[u8]) -> (Self, usize) {
        let taken = payload.len().min(MAX_WRITE_PAYLOAD);

        let mut bytes: Vec<u8, MAX_FRAME_SIZE> = Vec::new();
        let staged = bytes
            .extend_from_slice(&address.to_bytes())
            .and_then(|()| bytes.extend_from_slice(&payload[..taken]));
        debug_assert!(staged.is_ok(), "frame overflowed MAX_FRAME_SIZE");

        (Self { bytes }, taken)
    }

    /// Address the payload lands at
    pub fn address(&self) -> Address {
        Address::new(self.bytes[0], self.bytes[1])
    }

    /// Payload bytes without the header
    pub fn payload(&self) -> &[u8] {
        &self.bytes[HEADER_SIZE..]
    }

    /// Complete frame as sent on the bus
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Number of write transactions needed for a page chunk of `len` bytes
pub const fn write_frame_count(len: usize) -> usize {
    if len == 0 {
        0
    } else {
        len.div_ceil(MAX_WRITE_PAYLOAD)
    }
}

/// Number of read transactions needed for a page chunk of `len` bytes
pub const fn read_frame_count(len: usize) -> usize {
    if len == 0 {
        0
    } else {
        len.div_ceil(MAX_READ_PAYLOAD)
    }
}
