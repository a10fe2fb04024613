//! Paged EEPROM storage engine
//!
//! Persists byte buffers on an M24M02 (256 KiB serial EEPROM) behind a
//! transport that moves at most 255 bytes per transaction.
//!
//! ```text
//! ┌─────────────┐   ┌──────────┐   ┌───────────┐   ┌──────────────┐
//! │ Eeprom      │──▶│ PagePlan │──▶│ WriteFrame│──▶│ I2cBus       │
//! │ write/read  │   │ chunks   │   │ ≤255B     │   │ + settle     │
//! └─────────────┘   └──────────┘   └───────────┘   └──────────────┘
//! ```
//!
//! - [`sector`] - sector and address arithmetic
//! - [`plan`] - capacity check and page-bounded chunking
//! - [`frame`] - transaction staging
//! - [`eeprom`] - the engine
//! - [`shared`] - mutex wrapper for several callers
//! - `record` - postcard records (feature `serde`)
//! - `sim` - in-memory device model (feature `sim`)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

// Must come first so the logging macros are visible to every module
mod fmt;

#[cfg(any(test, feature = "sim"))]
extern crate alloc;

pub mod config;
pub mod eeprom;
pub mod error;
pub mod frame;
pub mod plan;
#[cfg(feature = "serde")]
pub mod record;
pub mod sector;
pub mod shared;
#[cfg(any(test, feature = "sim"))]
pub mod sim;

pub use config::EepromConfig;
pub use eeprom::Eeprom;
pub use error::{PlanError, StorageError};
pub use frame::{HEADER_SIZE, MAX_FRAME_SIZE};
pub use plan::{Chunk, PagePlan};
#[cfg(feature = "serde")]
pub use record::RecordError;
pub use sector::{Address, Sector, SectorError, PAGE_SIZE};
pub use shared::SharedEeprom;
