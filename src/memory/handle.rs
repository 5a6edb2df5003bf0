// Thu Aug 20 2026 - Alex

use crate::memory::{LinuxProcess, MemoryError, ProcessMemory};
use std::sync::Arc;

/// Owns the attachment to the target process. Every scanner and codec
/// operation goes through `backend()`, which fails with `NotAttached`
/// until a successful `attach` — address math on a stale handle is never
/// reachable.
pub struct ProcessHandle {
    process_name: String,
    backend: Option<Arc<dyn ProcessMemory>>,
}

impl ProcessHandle {
    pub fn new(process_name: &str) -> Self {
        Self {
            process_name: process_name.to_string(),
            backend: None,
        }
    }

    pub fn process_name(&self) -> &str {
        &self.process_name
    }

    /// Attach to the named running process. Returns false and stays
    /// detached when the process is missing or the open is denied;
    /// callers are expected to poll and retry.
    pub fn attach(&mut self) -> bool {
        match LinuxProcess::attach_by_name(&self.process_name) {
            Ok(process) => {
                log::info!("Attached to process '{}' (pid {})", self.process_name, process.pid());
                self.backend = Some(Arc::new(process));
                true
            }
            Err(e) => {
                log::debug!("Attach failed: {}", e);
                self.backend = None;
                false
            }
        }
    }

    /// Install an arbitrary backend. Used by tests and anything driving
    /// the scanner against non-live memory.
    pub fn attach_backend(&mut self, backend: Arc<dyn ProcessMemory>) {
        self.backend = Some(backend);
    }

    /// Release the handle. Idempotent.
    pub fn close(&mut self) {
        if self.backend.take().is_some() {
            log::info!("Detached from process '{}'", self.process_name);
        }
    }

    pub fn is_attached(&self) -> bool {
        self.backend.is_some()
    }

    pub fn backend(&self) -> Result<&Arc<dyn ProcessMemory>, MemoryError> {
        self.backend.as_ref().ok_or(MemoryError::NotAttached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::SyntheticMemory;

    #[test]
    fn test_unattached_reports_error() {
        let handle = ProcessHandle::new("nonexistent");
        assert!(!handle.is_attached());
        assert!(matches!(handle.backend(), Err(MemoryError::NotAttached)));
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut handle = ProcessHandle::new("test");
        handle.attach_backend(Arc::new(SyntheticMemory::new(0, vec![0u8; 16])));
        assert!(handle.is_attached());
        handle.close();
        handle.close();
        assert!(!handle.is_attached());
        assert!(matches!(handle.backend(), Err(MemoryError::NotAttached)));
    }

    #[test]
    fn test_reattach_after_close() {
        let mut handle = ProcessHandle::new("test");
        handle.attach_backend(Arc::new(SyntheticMemory::new(0, vec![0u8; 16])));
        handle.close();
        handle.attach_backend(Arc::new(SyntheticMemory::new(0, vec![0u8; 16])));
        assert!(handle.backend().is_ok());
    }

    #[test]
    fn test_attach_missing_process_returns_false() {
        let mut handle = ProcessHandle::new("definitely-not-a-real-process-name-xyz");
        assert!(!handle.attach());
        assert!(!handle.is_attached());
    }
}
