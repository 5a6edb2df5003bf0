// Wed Aug 19 2026 - Alex

use crate::memory::{Address, MemoryRange, Protection};
use std::fmt;

/// Commit state of a region as reported by the platform. Only committed
/// regions have backing pages worth scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionState {
    Committed,
    Reserved,
    Free,
}

#[derive(Debug, Clone)]
pub struct MemoryRegion {
    range: MemoryRange,
    protection: Protection,
    state: RegionState,
}

impl MemoryRegion {
    pub fn new(range: MemoryRange, protection: Protection, state: RegionState) -> Self {
        Self { range, protection, state }
    }

    pub fn range(&self) -> &MemoryRange {
        &self.range
    }

    pub fn protection(&self) -> Protection {
        self.protection
    }

    pub fn state(&self) -> RegionState {
        self.state
    }

    pub fn start(&self) -> Address {
        self.range.start()
    }

    pub fn end(&self) -> Address {
        self.range.end()
    }

    pub fn size(&self) -> u64 {
        self.range.size()
    }

    pub fn contains(&self, addr: Address) -> bool {
        self.range.contains(addr)
    }

    /// True when the table scan should read this region: committed pages
    /// with read-write (or rwx) protection.
    pub fn is_scannable(&self) -> bool {
        self.state == RegionState::Committed && self.protection.is_scannable()
    }
}

impl fmt::Display for MemoryRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {:?}", self.range, self.protection, self.state)
    }
}
