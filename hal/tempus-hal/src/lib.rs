//! Tempus Hardware Abstraction Layer
//!
//! This crate defines the bus traits the storage engine is written against,
//! so the same engine runs on the watch board, on a dev kit, or against an
//! in-memory model on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Engine (tempus-storage)                │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tempus-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ embedded-hal  │       │  host models  │
//! │  I2C drivers  │       │  (SimBus etc) │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`i2c::I2cBus`] - I2C bus operations

#![no_std]
#![deny(unsafe_code)]

pub mod i2c;

pub use i2c::I2cBus;
