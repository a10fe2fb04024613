//! Page-bounded request planning
//!
//! Splits a `(sector, address, len)` request into chunks that never cross a
//! page boundary. The first chunk runs from the start address to the end of
//! its page, middle chunks are whole pages, and the last chunk is whatever
//! remains. Capacity is checked once, up front, so a plan either covers the
//! whole request or is never created.

use crate::error::PlanError;
use crate::sector::{Address, Sector, SectorError};

/// A page-bounded slice of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Chunk {
    /// Device address of the first byte
    pub address: Address,
    /// Offset of the first byte in the caller's buffer
    pub offset: usize,
    /// Number of bytes, at most to the end of the page
    pub len: usize,
}

impl Chunk {
    /// Range of the caller's buffer this chunk covers
    pub fn range(&self) -> core::ops::Range<usize> {
        self.offset..self.offset + self.len
    }
}

/// Check that `len` bytes at `address` stay inside one page of `sector`
pub fn admit_page_chunk(sector: Sector, address: Address, len: usize) -> Result<(), PlanError> {
    if !sector.contains(address) {
        return Err(PlanError::InvalidAddress);
    }
    let available = address.page_remaining();
    if len > available {
        return Err(PlanError::InsufficientCapacity {
            requested: len,
            available,
        });
    }
    Ok(())
}

/// Iterator over the chunks of one admitted request
#[derive(Debug, Clone)]
pub struct PagePlan {
    sector: Sector,
    next: Address,
    offset: usize,
    remaining: usize,
}

impl PagePlan {
    /// Admit a request, checking it fits in the sector
    pub fn new(sector: Sector, start: Address, len: usize) -> Result<Self, PlanError> {
        let available = sector.remaining_capacity(start)?;
        if available < len {
            return Err(PlanError::InsufficientCapacity {
                requested: len,
                available,
            });
        }

        Ok(Self {
            sector,
            next: start,
            offset: 0,
            remaining: len,
        })
    }

    /// Sector this plan targets
    pub fn sector(&self) -> Sector {
        self.sector
    }

    /// Bytes not yet yielded
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Whether the request fits in its first page
    pub fn is_single_page(&self) -> bool {
        self.remaining <= self.next.page_remaining()
    }
}

impl Iterator for PagePlan {
    type Item = Result<Chunk, SectorError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let len = self.remaining.min(self.next.page_remaining());
        let chunk = Chunk {
            address: self.next,
            offset: self.offset,
            len,
        };

        self.offset += len;
        self.remaining -= len;

        if self.remaining > 0 {
            match self.next.advance_page() {
                Ok(next) => self.next = next,
                Err(e) => {
                    self.remaining = 0;
                    return Some(Err(e));
                }
            }
        }

        Some(Ok(chunk))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.remaining == 0 {
            return (0, Some(0));
        }
        let first = self.next.page_remaining();
        let chunks = if self.remaining <= first {
            1
        } else {
            1 + (self.remaining - first).div_ceil(crate::sector::PAGE_SIZE)
        };
        (chunks, Some(chunks))
    }
}
