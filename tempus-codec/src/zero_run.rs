//! Zero-run byte codec
//!
//! Stream format (no length header):
//! - `0x00 N`: N zero bytes, N in 1..=255
//! - any other byte: itself
//!
//! A run longer than 255 is written as repeated `0x00 0xFF` pairs followed by
//! one `0x00 (N mod 255)` pair when the remainder is non-zero.

use core::convert::Infallible;

/// Byte that introduces a run count
pub const RUN_MARKER: u8 = 0x00;

/// Longest run a single marker pair can describe
pub const MAX_RUN: usize = 255;

/// Errors from encoding or decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodecError {
    /// Output buffer cannot hold the result
    BufferTooSmall,
    /// Stream ended between a run marker and its count byte
    TruncatedRun,
}

/// Emit the marker pairs for a run of `run` zero bytes
fn flush_run<E>(mut run: usize, emit: &mut impl FnMut(u8) -> Result<(), E>) -> Result<(), E> {
    while run >= MAX_RUN {
        emit(RUN_MARKER)?;
        emit(MAX_RUN as u8)?;
        run -= MAX_RUN;
    }
    if run > 0 {
        emit(RUN_MARKER)?;
        emit(run as u8)?;
    }
    Ok(())
}

/// Core encoder, parameterised over where the output bytes go
fn encode_with<E>(raw: &[u8], mut emit: impl FnMut(u8) -> Result<(), E>) -> Result<(), E> {
    let mut run = 0usize;

    for &byte in raw {
        if byte == RUN_MARKER {
            run += 1;
        } else {
            flush_run(run, &mut emit)?;
            run = 0;
            emit(byte)?;
        }
    }

    flush_run(run, &mut emit)
}

/// Number of bytes [`encode_into`] will produce for `raw`
pub fn encoded_len(raw: &[u8]) -> usize {
    let mut len = 0usize;
    let counted: Result<(), Infallible> = encode_with(raw, |_| {
        len += 1;
        Ok(())
    });
    match counted {
        Ok(()) => len,
        Err(never) => match never {},
    }
}

/// Encode `raw` into `out`
///
/// Returns the number of bytes written.
pub fn encode_into(raw: &[u8], out: &mut [u8]) -> Result<usize, CodecError> {
    let mut pos = 0usize;
    encode_with(raw, |byte| {
        let slot = out.get_mut(pos).ok_or(CodecError::BufferTooSmall)?;
        *slot = byte;
        pos += 1;
        Ok(())
    })?;
    Ok(pos)
}

/// One decoded unit of a zero-run stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Symbol {
    /// A non-zero byte copied through
    Literal(u8),
    /// This many zero bytes
    Zeros(u8),
}

/// Incremental decoder
///
/// Fed one encoded byte at a time, so image data can be expanded straight
/// out of page-sized EEPROM reads without buffering the whole stream.
#[derive(Debug, Clone, Default)]
pub struct RunDecoder {
    awaiting_count: bool,
}

impl RunDecoder {
    /// Create a decoder at the start of a stream
    pub const fn new() -> Self {
        Self {
            awaiting_count: false,
        }
    }

    /// Reset to the start-of-stream state
    pub fn reset(&mut self) {
        self.awaiting_count = false;
    }

    /// Feed a single encoded byte
    ///
    /// Returns `Some(symbol)` once a unit is complete, `None` after a run
    /// marker while the count byte is still outstanding.
    pub fn feed(&mut self, byte: u8) -> Option<Symbol> {
        if self.awaiting_count {
            self.awaiting_count = false;
            Some(Symbol::Zeros(byte))
        } else if byte == RUN_MARKER {
            self.awaiting_count = true;
            None
        } else {
            Some(Symbol::Literal(byte))
        }
    }

    /// Check that the stream ended on a unit boundary
    pub fn finish(&self) -> Result<(), CodecError> {
        if self.awaiting_count {
            Err(CodecError::TruncatedRun)
        } else {
            Ok(())
        }
    }
}

/// Core decoder, parameterised over where the output bytes go
fn decode_with(
    encoded: &[u8],
    mut emit: impl FnMut(Symbol) -> Result<(), CodecError>,
) -> Result<(), CodecError> {
    let mut decoder = RunDecoder::new();
    for &byte in encoded {
        if let Some(symbol) = decoder.feed(byte) {
            emit(symbol)?;
        }
    }
    decoder.finish()
}

/// Number of bytes [`decode_into`] will produce for `encoded`
pub fn decoded_len(encoded: &[u8]) -> Result<usize, CodecError> {
    let mut len = 0usize;
    decode_with(encoded, |symbol| {
        len += match symbol {
            Symbol::Literal(_) => 1,
            Symbol::Zeros(n) => n as usize,
        };
        Ok(())
    })?;
    Ok(len)
}

/// Decode `encoded` into `out`
///
/// Returns the number of bytes written. A count byte of zero expands to
/// nothing; the encoder never produces one.
pub fn decode_into(encoded: &[u8], out: &mut [u8]) -> Result<usize, CodecError> {
    let mut pos = 0usize;
    decode_with(encoded, |symbol| {
        match symbol {
            Symbol::Literal(byte) => {
                let slot = out.get_mut(pos).ok_or(CodecError::BufferTooSmall)?;
                *slot = byte;
                pos += 1;
            }
            Symbol::Zeros(n) => {
                let end = pos + n as usize;
                out.get_mut(pos..end)
                    .ok_or(CodecError::BufferTooSmall)?
                    .fill(0);
                pos = end;
            }
        }
        Ok(())
    })?;
    Ok(pos)
}

/// Encode `raw` into a freshly allocated buffer
#[cfg(feature = "alloc")]
pub fn encode(raw: &[u8]) -> alloc::vec::Vec<u8> {
    let mut out = alloc::vec::Vec::with_capacity(encoded_len(raw));
    let pushed: Result<(), Infallible> = encode_with(raw, |byte| {
        out.push(byte);
        Ok(())
    });
    match pushed {
        Ok(()) => out,
        Err(never) => match never {},
    }
}

/// Decode `encoded` into a freshly allocated buffer
#[cfg(feature = "alloc")]
pub fn decode(encoded: &[u8]) -> Result<alloc::vec::Vec<u8>, CodecError> {
    let mut out = alloc::vec::Vec::new();
    decode_with(encoded, |symbol| {
        match symbol {
            Symbol::Literal(byte) => out.push(byte),
            Symbol::Zeros(n) => out.resize(out.len() + n as usize, 0),
        }
        Ok(())
    })?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_array<const N: usize>(raw: &[u8]) -> ([u8; N], usize) {
        let mut out = [0xEEu8; N];
        let len = encode_into(raw, &mut out).unwrap();
        (out, len)
    }

    #[test]
    fn test_encode_empty() {
        let (_, len) = encode_array::<4>(&[]);
        assert_eq!(len, 0);
        assert_eq!(encoded_len(&[]), 0);
    }

    #[test]
    fn test_encode_literals_pass_through() {
        let raw = [0x01, 0xFF, 0x7E];
        let (out, len) = encode_array::<8>(&raw);
        assert_eq!(&out[..len], &raw);
    }

    #[test]
    fn test_encode_single_zero() {
        let (out, len) = encode_array::<4>(&[0x00]);
        assert_eq!(&out[..len], &[0x00, 0x01]);
    }

    #[test]
    fn test_encode_run_of_255_has_no_trailing_pair() {
        let raw = [0u8; 255];
        let (out, len) = encode_array::<8>(&raw);
        assert_eq!(&out[..len], &[0x00, 0xFF]);
    }

    #[test]
    fn test_encode_run_of_256() {
        let raw = [0u8; 256];
        let (out, len) = encode_array::<8>(&raw);
        assert_eq!(&out[..len], &[0x00, 0xFF, 0x00, 0x01]);
    }

    #[test]
    fn test_encode_run_of_510() {
        let raw = [0u8; 510];
        let (out, len) = encode_array::<8>(&raw);
        assert_eq!(&out[..len], &[0x00, 0xFF, 0x00, 0xFF]);
    }

    #[test]
    fn test_encode_mixed() {
        // Pixel row from the 4x4 A1RGB555 test image: red, red, trans, trans
        let raw = [0xFC, 0x00, 0xFC, 0x00, 0x00, 0x00, 0x00, 0x00];
        let (out, len) = encode_array::<16>(&raw);
        assert_eq!(&out[..len], &[0xFC, 0x00, 0x01, 0xFC, 0x00, 0x05]);
        assert_eq!(encoded_len(&raw), len);
    }

    #[test]
    fn test_encode_buffer_too_small() {
        let mut out = [0u8; 1];
        assert_eq!(
            encode_into(&[0x00], &mut out),
            Err(CodecError::BufferTooSmall)
        );
    }

    #[test]
    fn test_decode_mixed() {
        let encoded = [0xFC, 0x00, 0x01, 0xFC, 0x00, 0x05];
        let mut out = [0xEEu8; 16];
        let len = decode_into(&encoded, &mut out).unwrap();
        assert_eq!(
            &out[..len],
            &[0xFC, 0x00, 0xFC, 0x00, 0x00, 0x00, 0x00, 0x00]
        );
        assert_eq!(decoded_len(&encoded), Ok(8));
    }

    #[test]
    fn test_decode_truncated_run() {
        let mut out = [0u8; 8];
        assert_eq!(
            decode_into(&[0x12, 0x00], &mut out),
            Err(CodecError::TruncatedRun)
        );
        assert_eq!(decoded_len(&[0x00]), Err(CodecError::TruncatedRun));
    }

    #[test]
    fn test_decode_zero_count_expands_to_nothing() {
        let mut out = [0xEEu8; 4];
        let len = decode_into(&[0x00, 0x00, 0x42], &mut out).unwrap();
        assert_eq!(&out[..len], &[0x42]);
    }

    #[test]
    fn test_decode_buffer_too_small() {
        let mut out = [0u8; 3];
        assert_eq!(
            decode_into(&[0x00, 0x04], &mut out),
            Err(CodecError::BufferTooSmall)
        );
    }

    #[test]
    fn test_run_decoder_across_feeds() {
        let mut decoder = RunDecoder::new();
        assert_eq!(decoder.feed(0x00), None);
        assert_eq!(decoder.finish(), Err(CodecError::TruncatedRun));
        assert_eq!(decoder.feed(0x03), Some(Symbol::Zeros(3)));
        assert_eq!(decoder.feed(0x9A), Some(Symbol::Literal(0x9A)));
        assert_eq!(decoder.finish(), Ok(()));

        decoder.feed(0x00);
        decoder.reset();
        assert_eq!(decoder.finish(), Ok(()));
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn test_vec_helpers_round_trip() {
        let raw = [0x00, 0x00, 0x11, 0x00, 0x22, 0x22, 0x00];
        let encoded = encode(&raw);
        assert_eq!(
            encoded.as_slice(),
            &[0x00, 0x02, 0x11, 0x00, 0x01, 0x22, 0x22, 0x00, 0x01]
        );
        assert_eq!(decode(&encoded).unwrap().as_slice(), &raw);
    }
}
