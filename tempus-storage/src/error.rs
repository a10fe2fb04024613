//! Storage error types

use crate::sector::SectorError;

/// Reasons a request is refused before any bus traffic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlanError {
    /// Request runs past the end of the sector
    InsufficientCapacity {
        /// Bytes asked for
        requested: usize,
        /// Bytes left between the start address and the sector end
        available: usize,
    },
    /// Start address lies outside the sector
    InvalidAddress,
}

/// Errors from EEPROM reads and writes
///
/// `E` is the bus error type. Only [`StorageError::Bus`] can leave the
/// device partially written; every other variant is raised before the
/// first transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError<E> {
    /// Request runs past the end of the sector
    InsufficientCapacity {
        /// Bytes asked for
        requested: usize,
        /// Bytes left between the start address and the sector end
        available: usize,
    },
    /// Start address lies outside the sector
    InvalidAddress,
    /// Page advance past the last page (planner invariant broken)
    AddressOverflow,
    /// Transport failure; earlier chunks stay written
    Bus(E),
}

impl<E> From<PlanError> for StorageError<E> {
    fn from(e: PlanError) -> Self {
        match e {
            PlanError::InsufficientCapacity {
                requested,
                available,
            } => StorageError::InsufficientCapacity {
                requested,
                available,
            },
            PlanError::InvalidAddress => StorageError::InvalidAddress,
        }
    }
}

impl<E> From<SectorError> for StorageError<E> {
    fn from(e: SectorError) -> Self {
        match e {
            SectorError::AddressOverflow => StorageError::AddressOverflow,
            SectorError::InvalidAddress => StorageError::InvalidAddress,
        }
    }
}

impl From<SectorError> for PlanError {
    fn from(_: SectorError) -> Self {
        PlanError::InvalidAddress
    }
}
