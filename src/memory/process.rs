// Thu Aug 20 2026 - Alex

use crate::memory::{
    Address, MemoryError, MemoryRange, MemoryRegion, ProcessMemory, Protection, RegionState,
};
use libc::pid_t;
use std::fs::{self, File};
use std::os::unix::fs::FileExt;
use std::path::Path;

/// Live-process backend over procfs: regions come from /proc/<pid>/maps,
/// reads and writes go through /proc/<pid>/mem at the target's virtual
/// offsets.
pub struct LinuxProcess {
    pid: pid_t,
    mem: File,
}

impl LinuxProcess {
    pub fn attach(pid: pid_t) -> Result<Self, MemoryError> {
        let mem = File::options()
            .read(true)
            .write(true)
            .open(format!("/proc/{}/mem", pid))
            .map_err(|_| {
                MemoryError::ProcessNotFound(format!(
                    "Failed to open process {}. Root or ptrace permission may be required.",
                    pid
                ))
            })?;
        Ok(Self { pid, mem })
    }

    pub fn attach_by_name(name: &str) -> Result<Self, MemoryError> {
        let pids = Self::find_processes_by_name(name)?;
        match pids.first() {
            Some(&pid) => Self::attach(pid),
            None => Err(MemoryError::ProcessNotFound(format!(
                "Process '{}' not found",
                name
            ))),
        }
    }

    pub fn find_processes_by_name(name: &str) -> Result<Vec<pid_t>, MemoryError> {
        let mut pids = Vec::new();
        for entry in fs::read_dir("/proc")? {
            let entry = match entry {
                Ok(e) => e,
                Err(_) => continue,
            };
            let pid: pid_t = match entry.file_name().to_string_lossy().parse() {
                Ok(pid) => pid,
                Err(_) => continue,
            };
            if let Some(comm) = read_comm(&entry.path()) {
                if comm.contains(name) {
                    pids.push(pid);
                }
            }
        }
        pids.sort_unstable();
        Ok(pids)
    }

    pub fn pid(&self) -> pid_t {
        self.pid
    }

    fn mappings(&self) -> Result<Vec<MemoryRegion>, MemoryError> {
        let maps = fs::read_to_string(format!("/proc/{}/maps", self.pid))
            .map_err(|_| MemoryError::ProcessNotFound(format!("Process {} has exited", self.pid)))?;
        let mut regions = Vec::new();
        for line in maps.lines() {
            if let Some(region) = parse_maps_line(line) {
                regions.push(region);
            }
        }
        Ok(regions)
    }
}

fn read_comm(proc_dir: &Path) -> Option<String> {
    fs::read_to_string(proc_dir.join("comm"))
        .ok()
        .map(|s| s.trim_end().to_string())
}

/// One line of /proc/<pid>/maps:
/// `55d0f2f9c000-55d0f2fbd000 rw-p 00000000 00:00 0 [heap]`
fn parse_maps_line(line: &str) -> Option<MemoryRegion> {
    let mut split = line.splitn(3, ' ');
    let mut range_split = split.next()?.split('-');
    let start = u64::from_str_radix(range_split.next()?, 16).ok()?;
    let end = u64::from_str_radix(range_split.next()?, 16).ok()?;
    let protection = Protection::from_proc_flags(split.next()?);
    let range = MemoryRange::new(Address::new(start), Address::new(end));
    // procfs only reports mapped regions, so everything it lists is
    // committed from the scanner's point of view.
    Some(MemoryRegion::new(range, protection, RegionState::Committed))
}

impl ProcessMemory for LinuxProcess {
    fn address_bounds(&self) -> Result<(Address, Address), MemoryError> {
        let regions = self.mappings()?;
        let min = regions.first().map(|r| r.start()).unwrap_or(Address::zero());
        let max = regions
            .iter()
            // The vsyscall page sits at the top of the kernel half and
            // would stretch the scan range across terabytes of gap.
            .filter(|r| r.end().as_u64() < 0xffff_0000_0000_0000)
            .map(|r| r.end())
            .max()
            .unwrap_or(Address::zero());
        Ok((min, max))
    }

    fn query_region(&self, addr: Address) -> Result<MemoryRegion, MemoryError> {
        let regions = self.mappings()?;
        for region in &regions {
            if region.contains(addr) {
                return Ok(region.clone());
            }
            if addr < region.start() {
                // Cursor is in an unmapped gap; report it as free space
                // reaching to the next mapping so the caller can step
                // over it in one move.
                let range = MemoryRange::new(addr, region.start());
                return Ok(MemoryRegion::new(range, Protection::None, RegionState::Free));
            }
        }
        Err(MemoryError::RegionQueryFailed(addr.as_u64()))
    }

    fn read_bytes(&self, addr: Address, len: usize) -> Result<Vec<u8>, MemoryError> {
        let mut buffer = vec![0u8; len];
        self.mem
            .read_exact_at(&mut buffer, addr.as_u64())
            .map_err(|_| MemoryError::ReadFailed(addr.as_u64()))?;
        Ok(buffer)
    }

    fn write_bytes(&self, addr: Address, data: &[u8]) -> Result<(), MemoryError> {
        self.mem
            .write_all_at(data, addr.as_u64())
            .map_err(|_| MemoryError::WriteFailed(addr.as_u64()))
    }
}
