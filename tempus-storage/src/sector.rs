//! Sector address model
//!
//! The M24M02 answers on five device-select addresses. Four of them each
//! expose 64 KiB (256 pages of 256 bytes, addressed by a high and a low
//! byte); the fifth is the 256-byte identification page.
//!
//! Page writes do not carry across page boundaries: the device wraps the low
//! address byte inside the current page. Everything here is pure arithmetic
//! so the planner can prove a request fits before touching the bus.

/// Bytes per page
pub const PAGE_SIZE: usize = 256;

/// Pages in a main sector
pub const PAGES_PER_SECTOR: usize = 256;

/// Bytes in a main sector
pub const MAIN_SECTOR_SIZE: usize = PAGE_SIZE * PAGES_PER_SECTOR;

/// Bytes in the identification sector
pub const ID_SECTOR_SIZE: usize = PAGE_SIZE;

/// Number of sectors (and bus endpoints)
pub const SECTOR_COUNT: usize = 5;

/// Errors from the address model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SectorError {
    /// Page advance attempted from the last page
    AddressOverflow,
    /// Address names a page the sector does not have
    InvalidAddress,
}

/// One independently addressed memory region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Sector {
    /// Main array, first quarter
    A = 0,
    /// Main array, second quarter
    B = 1,
    /// Main array, third quarter
    C = 2,
    /// Main array, fourth quarter
    D = 3,
    /// Identification page
    Identification = 4,
}

impl Sector {
    /// The four 64 KiB sectors, in address order
    pub const MAIN: [Sector; 4] = [Sector::A, Sector::B, Sector::C, Sector::D];

    /// Every sector, in lookup-table order
    pub const ALL: [Sector; SECTOR_COUNT] = [
        Sector::A,
        Sector::B,
        Sector::C,
        Sector::D,
        Sector::Identification,
    ];

    /// Index into per-sector tables
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Create a sector from its table index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Whether this is one of the four main sectors
    pub const fn is_main(self) -> bool {
        !matches!(self, Sector::Identification)
    }

    /// Number of pages in this sector
    pub const fn page_count(self) -> usize {
        if self.is_main() {
            PAGES_PER_SECTOR
        } else {
            1
        }
    }

    /// Total bytes in this sector
    pub const fn capacity(self) -> usize {
        self.page_count() * PAGE_SIZE
    }

    /// Whether `address` lies inside this sector
    pub const fn contains(self, address: Address) -> bool {
        (address.high as usize) < self.page_count()
    }

    /// Bytes from `address` to the end of the sector
    ///
    /// For a main sector this is `(255 - high) * 256 + (256 - low)`.
    pub fn remaining_capacity(self, address: Address) -> Result<usize, SectorError> {
        if !self.contains(address) {
            return Err(SectorError::InvalidAddress);
        }
        Ok(self.capacity() - address.offset())
    }
}

/// A byte address inside a sector
///
/// `high` selects the page, `low` the byte within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Address {
    /// Page number (A15-A8)
    pub high: u8,
    /// Byte within the page (A7-A0)
    pub low: u8,
}

impl Address {
    /// Start of the sector
    pub const ZERO: Self = Self { high: 0, low: 0 };

    /// Create an address from its two bytes
    pub const fn new(high: u8, low: u8) -> Self {
        Self { high, low }
    }

    /// Address of byte `low` on the identification page
    pub const fn id_page(low: u8) -> Self {
        Self { high: 0, low }
    }

    /// Linear byte offset from the start of the sector
    pub const fn offset(self) -> usize {
        self.high as usize * PAGE_SIZE + self.low as usize
    }

    /// Bytes left in the current page, including this one
    pub const fn page_remaining(self) -> usize {
        PAGE_SIZE - self.low as usize
    }

    /// Start of the following page
    ///
    /// Fails from the last page; callers check capacity first so this is
    /// never reached in a well-formed plan.
    pub fn advance_page(self) -> Result<Self, SectorError> {
        let high = self.high.checked_add(1).ok_or(SectorError::AddressOverflow)?;
        Ok(Self { high, low: 0 })
    }

    /// Address `n` bytes further along the same page
    ///
    /// Callers keep `low + n` inside the page; the device would wrap anyway.
    pub const fn within_page(self, n: usize) -> Self {
        Self {
            high: self.high,
            low: (self.low as usize + n) as u8,
        }
    }

    /// Address `n` bytes further along the sector, possibly on a later page
    pub fn advance(self, n: usize) -> Result<Self, SectorError> {
        let offset = self.offset() + n;
        let high = u8::try_from(offset / PAGE_SIZE).map_err(|_| SectorError::AddressOverflow)?;
        Ok(Self {
            high,
            low: (offset % PAGE_SIZE) as u8,
        })
    }

    /// Two-byte address header sent ahead of every transaction
    pub const fn to_bytes(self) -> [u8; 2] {
        [self.high, self.low]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sector_capacity() {
        for sector in Sector::MAIN {
            assert_eq!(sector.capacity(), 65536);
            assert!(sector.is_main());
        }
        assert_eq!(Sector::Identification.capacity(), 256);
        assert!(!Sector::Identification.is_main());
    }

    #[test]
    fn test_sector_index_roundtrip() {
        for sector in Sector::ALL {
            assert_eq!(Sector::from_index(sector.index()), Some(sector));
        }
        assert_eq!(Sector::from_index(SECTOR_COUNT), None);
    }

    #[test]
    fn test_remaining_capacity_main() {
        assert_eq!(Sector::A.remaining_capacity(Address::ZERO), Ok(65536));
        assert_eq!(Sector::B.remaining_capacity(Address::new(0, 200)), Ok(65336));
        assert_eq!(Sector::C.remaining_capacity(Address::new(255, 255)), Ok(1));
        assert_eq!(
            Sector::D.remaining_capacity(Address::new(254, 0)),
            Ok((255 - 254) * 256 + 256)
        );
    }

    #[test]
    fn test_remaining_capacity_id_page() {
        let id = Sector::Identification;
        assert_eq!(id.remaining_capacity(Address::id_page(0)), Ok(256));
        assert_eq!(id.remaining_capacity(Address::id_page(255)), Ok(1));
        assert_eq!(
            id.remaining_capacity(Address::new(1, 0)),
            Err(SectorError::InvalidAddress)
        );
    }

    #[test]
    fn test_advance_page() {
        assert_eq!(Address::new(0, 200).advance_page(), Ok(Address::new(1, 0)));
        assert_eq!(Address::new(254, 0).advance_page(), Ok(Address::new(255, 0)));
        assert_eq!(
            Address::new(255, 17).advance_page(),
            Err(SectorError::AddressOverflow)
        );
    }

    #[test]
    fn test_advance_across_pages() {
        assert_eq!(Address::new(7, 250).advance(2), Ok(Address::new(7, 252)));
        assert_eq!(Address::new(7, 254).advance(2), Ok(Address::new(8, 0)));
        assert_eq!(Address::new(0, 10).advance(600), Ok(Address::new(2, 98)));
        assert_eq!(Address::new(255, 255).advance(0), Ok(Address::new(255, 255)));
        assert_eq!(
            Address::new(255, 255).advance(1),
            Err(SectorError::AddressOverflow)
        );
    }

    #[test]
    fn test_address_helpers() {
        let addr = Address::new(2, 10);
        assert_eq!(addr.offset(), 522);
        assert_eq!(addr.page_remaining(), 246);
        assert_eq!(addr.to_bytes(), [2, 10]);
        assert_eq!(Address::new(2, 0).within_page(253), Address::new(2, 253));
    }
}
