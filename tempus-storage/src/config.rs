//! EEPROM engine configuration

use crate::sector::{Sector, SECTOR_COUNT};

/// Settle delay after each write transaction on the watch board
pub const DEFAULT_SETTLE_DELAY_MS: u32 = 8;

/// M24M02 device-select addresses: E2 tied low, A17/A16 in the low bits,
/// identification page on the 0b1011 prefix
pub const DEFAULT_ADDRESSES: [u8; SECTOR_COUNT] = [0x50, 0x51, 0x52, 0x53, 0x58];

/// Engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EepromConfig {
    /// Pause after every write transaction for the internal write cycle.
    /// The device is not polled for completion.
    pub settle_delay_ms: u32,
    /// 7-bit bus address per sector, indexed by [`Sector::index`]
    pub addresses: [u8; SECTOR_COUNT],
}

impl Default for EepromConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            addresses: DEFAULT_ADDRESSES,
        }
    }
}

impl EepromConfig {
    /// Set the settle delay
    pub const fn with_settle_delay_ms(mut self, ms: u32) -> Self {
        self.settle_delay_ms = ms;
        self
    }

    /// Set the bus address for one sector
    pub fn with_address(mut self, sector: Sector, address: u8) -> Self {
        self.addresses[sector.index()] = address;
        self
    }

    /// Bus address for a sector
    pub const fn address(&self, sector: Sector) -> u8 {
        self.addresses[sector.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_addresses() {
        let config = EepromConfig::default();
        assert_eq!(config.address(Sector::A), 0x50);
        assert_eq!(config.address(Sector::D), 0x53);
        assert_eq!(config.address(Sector::Identification), 0x58);
        assert_eq!(config.settle_delay_ms, 8);
    }

    #[test]
    fn test_builders() {
        let config = EepromConfig::default()
            .with_settle_delay_ms(10)
            .with_address(Sector::B, 0x55);
        assert_eq!(config.settle_delay_ms, 10);
        assert_eq!(config.address(Sector::B), 0x55);
        assert_eq!(config.address(Sector::A), 0x50);
    }
}
