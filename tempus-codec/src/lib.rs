//! Byte codecs for the Tempus watch firmware
//!
//! Image data travels from the image producer to the EEPROM in two layers:
//!
//! ```text
//! ┌───────────┬──────────────────────┬──────────────────────┬──────────────┐
//! │ "raw"     │ hdr chunk            │ dat chunk            │ end chunk    │
//! │ 3B        │ len(2) "hdr" w h fmt │ len(2) "dat" pixels  │ 0x0000 "end" │
//! └───────────┴──────────────────────┴──────────────────────┴──────────────┘
//! ```
//!
//! - [`image`] parses and writes that container.
//! - [`zero_run`] squeezes runs of zero bytes (transparent pixels, blank
//!   rows) before the bytes reach storage.
//!
//! Neither layer knows anything about pages or sectors.

#![no_std]
#![deny(unsafe_code)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod image;
pub mod zero_run;

pub use image::{ImageError, PixelFormat, RawImage, IMAGE_SIGNATURE};
pub use zero_run::{
    decode_into, decoded_len, encode_into, encoded_len, CodecError, RunDecoder, Symbol,
    MAX_RUN, RUN_MARKER,
};

#[cfg(feature = "alloc")]
pub use zero_run::{decode, encode};
