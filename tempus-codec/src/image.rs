//! Raw image container
//!
//! Container format:
//! - SIGNATURE (3 bytes): ASCII "raw"
//! - CHUNK*: LENGTH (2 bytes, big-endian, payload only), TAG (3 ASCII bytes), PAYLOAD
//!
//! Chunks, in order:
//! - `hdr`: width (1B), height (1B), pixel format (1B)
//! - `dat`: pixel bytes, row-major
//! - `end`: empty, terminates the container

/// Container signature
pub const IMAGE_SIGNATURE: [u8; 3] = *b"raw";

/// Header chunk tag
pub const TAG_HEADER: [u8; 3] = *b"hdr";

/// Pixel data chunk tag
pub const TAG_DATA: [u8; 3] = *b"dat";

/// End chunk tag
pub const TAG_END: [u8; 3] = *b"end";

/// LENGTH + TAG
const CHUNK_PREFIX_SIZE: usize = 2 + 3;

/// Header chunk payload size
const HEADER_PAYLOAD_SIZE: usize = 3;

/// Errors from container parsing or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ImageError {
    /// Data does not start with "raw"
    BadSignature,
    /// A chunk runs past the end of the data
    Truncated,
    /// Chunk tag not recognised
    UnknownChunk,
    /// Pixel format byte not recognised
    UnknownFormat,
    /// Header chunk has the wrong payload size
    InvalidHeader,
    /// A chunk that may appear once appeared twice
    DuplicateChunk,
    /// Data chunk appeared before the header chunk
    MissingHeader,
    /// No data chunk before the end chunk
    MissingData,
    /// Container has no end chunk
    MissingEnd,
    /// Data length disagrees with width, height and format
    DataLengthMismatch,
    /// Pixel data too long for a 16-bit chunk length
    DataTooLarge,
    /// Output buffer too small for encoding
    BufferTooSmall,
}

/// Pixel encodings understood by the display pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PixelFormat {
    /// 8-bit red, green, blue
    Rgb888 = 0x03,
    /// 8-bit red, green, blue, alpha
    Rgba8888 = 0x04,
    /// 4-bit red, green, blue, two pixels per three bytes
    Rgb444 = 0x05,
    /// 5-6-5 packed, two bytes per pixel
    Rgb565 = 0x06,
    /// 6-bit channels sent as three bytes per pixel
    Rgb666 = 0x07,
    /// 1-bit alpha plus 5-5-5 colour, two bytes per pixel
    A1Rgb555 = 0x08,
    /// Pixel bytes are zero-run encoded
    ZeroRun = 0x09,
}

impl PixelFormat {
    /// Get the format as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a format from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x03 => Some(PixelFormat::Rgb888),
            0x04 => Some(PixelFormat::Rgba8888),
            0x05 => Some(PixelFormat::Rgb444),
            0x06 => Some(PixelFormat::Rgb565),
            0x07 => Some(PixelFormat::Rgb666),
            0x08 => Some(PixelFormat::A1Rgb555),
            0x09 => Some(PixelFormat::ZeroRun),
            _ => None,
        }
    }

    /// Bytes needed for `pixels` pixels, or `None` when the size depends
    /// on the content
    pub fn data_len(self, pixels: usize) -> Option<usize> {
        match self {
            PixelFormat::Rgb888 | PixelFormat::Rgb666 => Some(pixels * 3),
            PixelFormat::Rgba8888 => Some(pixels * 4),
            PixelFormat::Rgb444 => Some((pixels * 3).div_ceil(2)),
            PixelFormat::Rgb565 | PixelFormat::A1Rgb555 => Some(pixels * 2),
            PixelFormat::ZeroRun => None,
        }
    }
}

/// A borrowed view of one container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawImage<'a> {
    /// Width in pixels
    pub width: u8,
    /// Height in pixels
    pub height: u8,
    /// Encoding of `data`
    pub format: PixelFormat,
    /// Pixel bytes
    pub data: &'a [u8],
}

impl<'a> RawImage<'a> {
    /// Create an image view, checking the data length against the format
    pub fn new(
        width: u8,
        height: u8,
        format: PixelFormat,
        data: &'a [u8],
    ) -> Result<Self, ImageError> {
        let image = Self {
            width,
            height,
            format,
            data,
        };
        image.check_data_len()?;
        Ok(image)
    }

    /// Number of pixels
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Expected pixel data size, if fixed by the format
    pub fn expected_data_len(&self) -> Option<usize> {
        self.format.data_len(self.pixel_count())
    }

    /// Whether the pixel bytes are zero-run encoded
    pub fn is_compressed(&self) -> bool {
        self.format == PixelFormat::ZeroRun
    }

    fn check_data_len(&self) -> Result<(), ImageError> {
        if self.data.len() > u16::MAX as usize {
            return Err(ImageError::DataTooLarge);
        }
        match self.expected_data_len() {
            Some(expected) if expected != self.data.len() => Err(ImageError::DataLengthMismatch),
            _ => Ok(()),
        }
    }

    /// Parse a container
    ///
    /// Bytes after the end chunk are ignored, so a container can be parsed
    /// straight out of a larger EEPROM read.
    pub fn parse(bytes: &'a [u8]) -> Result<Self, ImageError> {
        let rest = bytes
            .strip_prefix(&IMAGE_SIGNATURE[..])
            .ok_or(ImageError::BadSignature)?;

        let mut header: Option<(u8, u8, PixelFormat)> = None;
        let mut data: Option<&'a [u8]> = None;
        let mut chunks = ChunkIter { rest };

        loop {
            let (tag, payload) = match chunks.next_chunk()? {
                Some(chunk) => chunk,
                None => return Err(ImageError::MissingEnd),
            };

            match tag {
                TAG_HEADER => {
                    if header.is_some() {
                        return Err(ImageError::DuplicateChunk);
                    }
                    if payload.len() != HEADER_PAYLOAD_SIZE {
                        return Err(ImageError::InvalidHeader);
                    }
                    let format =
                        PixelFormat::from_u8(payload[2]).ok_or(ImageError::UnknownFormat)?;
                    header = Some((payload[0], payload[1], format));
                }
                TAG_DATA => {
                    if header.is_none() {
                        return Err(ImageError::MissingHeader);
                    }
                    if data.is_some() {
                        return Err(ImageError::DuplicateChunk);
                    }
                    data = Some(payload);
                }
                TAG_END => break,
                _ => return Err(ImageError::UnknownChunk),
            }
        }

        let (width, height, format) = header.ok_or(ImageError::MissingHeader)?;
        let data = data.ok_or(ImageError::MissingData)?;
        Self::new(width, height, format, data)
    }

    /// Size of the encoded container in bytes
    pub fn encoded_len(&self) -> usize {
        IMAGE_SIGNATURE.len()
            + CHUNK_PREFIX_SIZE
            + HEADER_PAYLOAD_SIZE
            + CHUNK_PREFIX_SIZE
            + self.data.len()
            + CHUNK_PREFIX_SIZE
    }

    /// Encode this image into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode_into(&self, buffer: &mut [u8]) -> Result<usize, ImageError> {
        self.check_data_len()?;
        let len = self.encoded_len();
        if buffer.len() < len {
            return Err(ImageError::BufferTooSmall);
        }

        let mut pos = 0;
        buffer[..3].copy_from_slice(&IMAGE_SIGNATURE);
        pos += 3;
        pos += write_chunk(
            &mut buffer[pos..],
            TAG_HEADER,
            &[self.width, self.height, self.format.as_u8()],
        );
        pos += write_chunk(&mut buffer[pos..], TAG_DATA, self.data);
        pos += write_chunk(&mut buffer[pos..], TAG_END, &[]);

        Ok(pos)
    }
}

/// Write one chunk, returning its size. Caller guarantees room.
fn write_chunk(buffer: &mut [u8], tag: [u8; 3], payload: &[u8]) -> usize {
    let len = payload.len() as u16;
    buffer[..2].copy_from_slice(&len.to_be_bytes());
    buffer[2..5].copy_from_slice(&tag);
    buffer[5..5 + payload.len()].copy_from_slice(payload);
    CHUNK_PREFIX_SIZE + payload.len()
}

/// Walks the chunks after the signature
struct ChunkIter<'a> {
    rest: &'a [u8],
}

impl<'a> ChunkIter<'a> {
    fn next_chunk(&mut self) -> Result<Option<([u8; 3], &'a [u8])>, ImageError> {
        if self.rest.is_empty() {
            return Ok(None);
        }
        if self.rest.len() < CHUNK_PREFIX_SIZE {
            return Err(ImageError::Truncated);
        }

        let len = u16::from_be_bytes([self.rest[0], self.rest[1]]) as usize;
        let tag = [self.rest[2], self.rest[3], self.rest[4]];
        let body = &self.rest[CHUNK_PREFIX_SIZE..];
        if body.len() < len {
            return Err(ImageError::Truncated);
        }

        let (payload, rest) = body.split_at(len);
        self.rest = rest;
        Ok(Some((tag, payload)))
    }
}
