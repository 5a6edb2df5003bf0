// Fri Aug 21 2026 - Alex

use crate::config::ScanConfig;
use crate::memory::{Address, MemoryError, ProcessMemory};
use crate::pattern::{record_signature, Pattern};
use std::sync::atomic::{AtomicBool, Ordering};

/// Cursor step when the platform cannot describe the region at the
/// current address. One page keeps worst-case progress bounded.
const PAGE_SIZE: u64 = 0x1000;

/// Locates the start of the character table by scanning the target's
/// writable committed regions for four consecutive record signatures
/// preceded by a run of zero bytes.
///
/// The four-in-a-row requirement is the only thing separating the real
/// table from coincidental byte runs, and it is probabilistic: a large
/// enough address space can always produce a false positive. That risk
/// is accepted rather than tightened here.
pub struct RecordLocator<'a> {
    config: &'a ScanConfig,
    signature: Pattern,
}

impl<'a> RecordLocator<'a> {
    pub fn new(config: &'a ScanConfig) -> Self {
        let signature = record_signature(config);
        Self { config, signature }
    }

    pub fn find_first(&self, memory: &dyn ProcessMemory) -> Result<Option<Address>, MemoryError> {
        self.find_first_until(memory, &AtomicBool::new(false))
    }

    /// Scan until a match, the end of the address space, or `stop` is
    /// raised. `stop` is checked between regions, so cancellation waits
    /// at most one region read.
    pub fn find_first_until(
        &self,
        memory: &dyn ProcessMemory,
        stop: &AtomicBool,
    ) -> Result<Option<Address>, MemoryError> {
        let (_min_address, max_address) = memory.address_bounds()?;
        let max_address = max_address.as_u64();
        let mut address = if self.config.fast_scan {
            self.config.fast_scan_start_address
        } else {
            0
        };
        log::debug!(
            "Scanning for record table from 0x{:x} to 0x{:x}",
            address,
            max_address
        );

        while address < max_address {
            if stop.load(Ordering::Relaxed) {
                log::debug!("Scan stopped at 0x{:x}", address);
                return Ok(None);
            }

            let region = match memory.query_region(Address::new(address)) {
                Ok(region) => region,
                Err(_) => {
                    address += PAGE_SIZE;
                    continue;
                }
            };

            if region.is_scannable() {
                // The cursor can sit mid-region after a fast-scan start;
                // read only what is left of the region, capped at the
                // maximum application address.
                let read_size = (region.end().as_u64().min(max_address) - address) as usize;
                match memory.read_bytes(Address::new(address), read_size) {
                    Ok(chunk) => {
                        if let Some(offset) = self.search_chunk(&chunk) {
                            let found = Address::new(address + offset as u64);
                            log::info!("Record table found at {}", found);
                            return Ok(Some(found));
                        }
                    }
                    Err(_) => {
                        // Region vanished or is protected; skip it whole.
                        log::debug!("Unreadable region at 0x{:x}, skipping", address);
                    }
                }
            }

            address = next_cursor(address, region.end().as_u64());
        }

        Ok(None)
    }

    /// Search one region's bytes. The zero-run check runs first because
    /// it rejects almost every offset with a fraction of the work a
    /// four-window signature match costs.
    fn search_chunk(&self, chunk: &[u8]) -> Option<usize> {
        let struct_size = self.config.struct_size;
        let preceding = self.config.preceding_zeroes;
        let needed = 4 * struct_size;
        if chunk.len() < preceding + needed {
            return None;
        }

        for i in preceding..=(chunk.len() - needed) {
            if chunk[i - preceding..i].iter().any(|&b| b != 0x00) {
                continue;
            }
            if (0..4).all(|j| self.signature.matches_at(chunk, i + j * struct_size)) {
                return Some(i);
            }
        }
        None
    }
}

fn next_cursor(address: u64, region_end: u64) -> u64 {
    // Guarantee forward progress even if the backend reports a region
    // that does not extend past the cursor.
    region_end.max(address + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::SyntheticMemory;

    fn small_config() -> ScanConfig {
        ScanConfig {
            struct_size: 8,
            padding_length: 2,
            preceding_zeroes: 4,
            fast_scan: false,
            fast_scan_start_address: 0,
            ..ScanConfig::default()
        }
    }

    /// [4 zero bytes][4 records of: 0x80, 5 nonzero, 2 zero] with noise
    /// in front.
    fn table_buffer(lead_noise: usize) -> Vec<u8> {
        let mut data = vec![0xaa; lead_noise];
        data.extend_from_slice(&[0x00; 4]);
        for _ in 0..4 {
            data.extend_from_slice(&[0x80, 1, 2, 3, 4, 5, 0, 0]);
        }
        data.extend_from_slice(&[0xbb; 16]);
        data
    }

    #[test]
    fn test_finds_table_after_zero_run() {
        let config = small_config();
        let locator = RecordLocator::new(&config);
        let mem = SyntheticMemory::new(0x10000, table_buffer(32));
        let found = locator.find_first(&mem).unwrap();
        assert_eq!(found, Some(Address::new(0x10000 + 32 + 4)));
    }

    #[test]
    fn test_requires_zero_run() {
        let config = small_config();
        let locator = RecordLocator::new(&config);
        // Records present but preceded by nonzero bytes everywhere.
        let mut data = vec![0xaa; 16];
        for _ in 0..4 {
            data.extend_from_slice(&[0x80, 1, 2, 3, 4, 5, 0, 0]);
        }
        let mem = SyntheticMemory::new(0x10000, data);
        assert_eq!(locator.find_first(&mem).unwrap(), None);
    }

    #[test]
    fn test_requires_four_consecutive_records() {
        let config = small_config();
        let locator = RecordLocator::new(&config);
        let mut data = vec![0x00; 8];
        for _ in 0..3 {
            data.extend_from_slice(&[0x80, 1, 2, 3, 4, 5, 0, 0]);
        }
        // Fourth window breaks the signature.
        data.extend_from_slice(&[0x00, 1, 2, 3, 4, 5, 0, 0]);
        let mem = SyntheticMemory::new(0x10000, data);
        assert_eq!(locator.find_first(&mem).unwrap(), None);
    }

    #[test]
    fn test_no_match_returns_none() {
        let config = small_config();
        let locator = RecordLocator::new(&config);
        let mem = SyntheticMemory::new(0x10000, vec![0x11; 4096]);
        assert_eq!(locator.find_first(&mem).unwrap(), None);
    }

    #[test]
    fn test_query_failure_advances_one_page() {
        let config = small_config();
        let locator = RecordLocator::new(&config);
        // Buffer sits one page up; the cursor below it always fails to
        // resolve, forcing the page-step path.
        let mem = SyntheticMemory::new(0x1000, table_buffer(0)).with_query_failure(0);
        let found = locator.find_first(&mem).unwrap();
        assert_eq!(found, Some(Address::new(0x1000 + 4)));
    }

    #[test]
    fn test_stop_flag_cancels() {
        let config = small_config();
        let locator = RecordLocator::new(&config);
        let mem = SyntheticMemory::new(0x10000, table_buffer(0));
        let stop = AtomicBool::new(true);
        assert_eq!(locator.find_first_until(&mem, &stop).unwrap(), None);
    }

    #[test]
    fn test_fast_scan_start_skips_low_addresses() {
        let mut config = small_config();
        config.fast_scan = true;
        // Start above the table; the scan must not look below it.
        config.fast_scan_start_address = 0x20000;
        let locator = RecordLocator::new(&config);
        let mem = SyntheticMemory::new(0x10000, table_buffer(0));
        assert_eq!(locator.find_first(&mem).unwrap(), None);
    }
}
