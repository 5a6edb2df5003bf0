// Thu Aug 20 2026 - Alex

use crate::memory::{Address, MemoryError, MemoryRange, MemoryRegion, Protection, RegionState};

/// Capability surface the scanner and codec need from a target process.
///
/// `query_region` follows VirtualQueryEx-style semantics: given a cursor
/// address, describe the region containing it, or the next region above it
/// if the cursor falls in unmapped space. Callers advance by one page and
/// retry on failure, so an implementation may fail transiently without
/// stalling a scan.
pub trait ProcessMemory: Send + Sync {
    /// Minimum and maximum application addresses. Queried once per scan.
    fn address_bounds(&self) -> Result<(Address, Address), MemoryError>;

    fn query_region(&self, addr: Address) -> Result<MemoryRegion, MemoryError>;

    fn read_bytes(&self, addr: Address, len: usize) -> Result<Vec<u8>, MemoryError>;

    fn write_bytes(&self, addr: Address, data: &[u8]) -> Result<(), MemoryError>;

    fn read_u8(&self, addr: Address) -> Result<u8, MemoryError> {
        let bytes = self.read_bytes(addr, 1)?;
        Ok(bytes[0])
    }

    fn write_u8(&self, addr: Address, value: u8) -> Result<(), MemoryError> {
        self.write_bytes(addr, &[value])
    }
}

/// Buffer-backed implementation for tests and offline experiments. One
/// committed read-write region at a configurable base address, plus an
/// optional set of unreadable holes to exercise skip paths.
pub struct SyntheticMemory {
    base: Address,
    data: parking_lot::RwLock<Vec<u8>>,
    unreadable: Vec<MemoryRange>,
    query_failures: Vec<Address>,
}

impl SyntheticMemory {
    pub fn new(base: u64, data: Vec<u8>) -> Self {
        Self {
            base: Address::new(base),
            data: parking_lot::RwLock::new(data),
            unreadable: Vec::new(),
            query_failures: Vec::new(),
        }
    }

    /// Mark a range as unreadable; reads touching it fail like a freed
    /// region would.
    pub fn with_unreadable(mut self, start: u64, size: u64) -> Self {
        self.unreadable
            .push(MemoryRange::from_start_size(Address::new(start), size));
        self
    }

    /// Make `query_region` fail at the given cursor address.
    pub fn with_query_failure(mut self, addr: u64) -> Self {
        self.query_failures.push(Address::new(addr));
        self
    }

    pub fn base(&self) -> Address {
        self.base
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    fn end(&self) -> Address {
        self.base + self.data.read().len() as u64
    }
}

impl ProcessMemory for SyntheticMemory {
    fn address_bounds(&self) -> Result<(Address, Address), MemoryError> {
        Ok((Address::zero(), self.end()))
    }

    fn query_region(&self, addr: Address) -> Result<MemoryRegion, MemoryError> {
        if self.query_failures.contains(&addr) {
            return Err(MemoryError::RegionQueryFailed(addr.as_u64()));
        }
        if addr < self.base {
            // Unmapped gap below the buffer, reported as a free region
            // running up to the buffer base.
            let range = MemoryRange::new(addr, self.base);
            return Ok(MemoryRegion::new(range, Protection::None, RegionState::Free));
        }
        if addr >= self.end() {
            return Err(MemoryError::RegionQueryFailed(addr.as_u64()));
        }
        let range = MemoryRange::new(self.base, self.end());
        Ok(MemoryRegion::new(range, Protection::ReadWrite, RegionState::Committed))
    }

    fn read_bytes(&self, addr: Address, len: usize) -> Result<Vec<u8>, MemoryError> {
        let read = MemoryRange::from_start_size(addr, len as u64);
        for hole in &self.unreadable {
            if hole.contains(addr) || read.contains(hole.start()) {
                return Err(MemoryError::ReadFailed(addr.as_u64()));
            }
        }
        let data = self.data.read();
        let start = addr
            .as_u64()
            .checked_sub(self.base.as_u64())
            .ok_or(MemoryError::ReadFailed(addr.as_u64()))? as usize;
        let end = start
            .checked_add(len)
            .filter(|&e| e <= data.len())
            .ok_or(MemoryError::ReadFailed(addr.as_u64()))?;
        Ok(data[start..end].to_vec())
    }

    fn write_bytes(&self, addr: Address, bytes: &[u8]) -> Result<(), MemoryError> {
        let mut data = self.data.write();
        let start = addr
            .as_u64()
            .checked_sub(self.base.as_u64())
            .ok_or(MemoryError::WriteFailed(addr.as_u64()))? as usize;
        let end = start
            .checked_add(bytes.len())
            .filter(|&e| e <= data.len())
            .ok_or(MemoryError::WriteFailed(addr.as_u64()))?;
        data[start..end].copy_from_slice(bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_read_write() {
        let mem = SyntheticMemory::new(0x1000, vec![0u8; 64]);
        mem.write_bytes(Address::new(0x1010), &[1, 2, 3]).unwrap();
        assert_eq!(mem.read_bytes(Address::new(0x1010), 3).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_synthetic_out_of_bounds_read() {
        let mem = SyntheticMemory::new(0x1000, vec![0u8; 64]);
        assert!(mem.read_bytes(Address::new(0x1000), 65).is_err());
        assert!(mem.read_bytes(Address::new(0x0fff), 1).is_err());
    }

    #[test]
    fn test_synthetic_unreadable_hole() {
        let mem = SyntheticMemory::new(0x1000, vec![0u8; 64]).with_unreadable(0x1020, 8);
        assert!(mem.read_bytes(Address::new(0x1020), 4).is_err());
        assert!(mem.read_bytes(Address::new(0x1000), 4).is_ok());
    }
}
