// Sat Aug 22 2026 - Alex

use crate::config::ScanConfig;
use crate::memory::ProcessMemory;
use crate::scanner::table::{read_all_records, Record};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// Events a scan emits to its subscriber: any number of status lines,
/// then exactly one `Finished` or `Error` (none when the scan is
/// stopped by its owner).
#[derive(Debug)]
pub enum ScanEvent {
    Status { message: String, severity: Severity },
    Finished(Vec<Record>),
    Error(String),
}

/// Runs the locate/enumerate/decode pipeline on a dedicated thread so
/// the caller stays responsive over a multi-gigabyte address space.
///
/// One scan at a time: `start` refuses while a scan is in flight.
/// `stop` signals the thread and joins it, so no scan outlives the
/// worker that owns it.
pub struct ScanWorker {
    config: ScanConfig,
    sender: Sender<ScanEvent>,
    running: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl ScanWorker {
    pub fn new(config: ScanConfig, sender: Sender<ScanEvent>) -> Self {
        Self {
            config,
            sender,
            running: Arc::new(AtomicBool::new(false)),
            stop: Arc::new(AtomicBool::new(false)),
            thread: None,
        }
    }

    /// Begin a scan against the given backend. Returns false without
    /// starting anything when a scan is already running.
    pub fn start(&mut self, memory: Arc<dyn ProcessMemory>) -> bool {
        if self.running.swap(true, Ordering::SeqCst) {
            log::debug!("Scan already in progress, ignoring start request");
            return false;
        }
        // The previous thread, if any, has finished; reap it.
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
        self.stop.store(false, Ordering::SeqCst);

        let config = self.config.clone();
        let sender = self.sender.clone();
        let running = self.running.clone();
        let stop = self.stop.clone();

        let handle = thread::spawn(move || {
            let _ = sender.send(ScanEvent::Status {
                message: "Scanning memory for character structs...".to_string(),
                severity: Severity::Info,
            });

            let result = read_all_records(memory.as_ref(), &config, &stop);

            if stop.load(Ordering::SeqCst) {
                let _ = sender.send(ScanEvent::Status {
                    message: "Scan cancelled".to_string(),
                    severity: Severity::Info,
                });
            } else {
                match result {
                    Ok(records) => {
                        let _ = sender.send(ScanEvent::Finished(records));
                    }
                    Err(e) => {
                        let _ = sender.send(ScanEvent::Error(format!("Error scanning memory: {}", e)));
                    }
                }
            }

            running.store(false, Ordering::SeqCst);
        });

        self.thread = Some(handle);
        true
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Signal the in-flight scan to stop and wait for the thread to
    /// terminate. Safe to call with no scan running.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ScanWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{FieldDescriptor, FieldType};
    use crate::memory::{
        Address, MemoryError, MemoryRange, MemoryRegion, Protection, RegionState, SyntheticMemory,
    };
    use std::sync::mpsc;
    use std::time::Duration;

    fn small_config() -> ScanConfig {
        let mut config = ScanConfig {
            struct_size: 8,
            padding_length: 2,
            preceding_zeroes: 4,
            max_records: 10,
            ..ScanConfig::default()
        };
        config.offsets.clear();
        config.offsets.insert(
            "is_unlocked".to_string(),
            FieldDescriptor { offset: 0, field_type: FieldType::Bool },
        );
        config
    }

    fn table_backend() -> Arc<SyntheticMemory> {
        let mut data = vec![0x00; 4];
        for _ in 0..4 {
            data.extend_from_slice(&[0x80, 1, 2, 3, 4, 5, 0, 0]);
        }
        data.extend_from_slice(&[0xff; 8]);
        Arc::new(SyntheticMemory::new(0x8000, data))
    }

    fn drain_terminal_events(receiver: &mpsc::Receiver<ScanEvent>) -> (usize, usize) {
        let mut finished = 0;
        let mut errors = 0;
        while let Ok(event) = receiver.recv_timeout(Duration::from_secs(5)) {
            match event {
                ScanEvent::Finished(_) => finished += 1,
                ScanEvent::Error(_) => errors += 1,
                ScanEvent::Status { .. } => {}
            }
        }
        (finished, errors)
    }

    #[test]
    fn test_scan_emits_one_finished_event() {
        let (sender, receiver) = mpsc::channel();
        let mut worker = ScanWorker::new(small_config(), sender);
        assert!(worker.start(table_backend()));
        worker.stop();
        drop(worker);
        let (finished, errors) = drain_terminal_events(&receiver);
        assert!(finished + errors <= 1);

        // A fresh run allowed to complete emits exactly one Finished
        // with the decoded table.
        let (sender, receiver) = mpsc::channel();
        let mut worker = ScanWorker::new(small_config(), sender);
        assert!(worker.start(table_backend()));
        while worker.is_running() {
            thread::sleep(Duration::from_millis(5));
        }
        worker.stop();
        drop(worker);

        let mut finished_records = None;
        let mut finished_count = 0;
        while let Ok(event) = receiver.recv_timeout(Duration::from_secs(5)) {
            if let ScanEvent::Finished(records) = event {
                finished_count += 1;
                finished_records = Some(records);
            }
        }
        assert_eq!(finished_count, 1);
        assert_eq!(finished_records.unwrap().len(), 4);
    }

    /// Backend whose region queries take a few milliseconds each, so a
    /// scan stays observably in flight.
    struct SlowMemory;

    impl ProcessMemory for SlowMemory {
        fn address_bounds(&self) -> Result<(Address, Address), MemoryError> {
            Ok((Address::zero(), Address::new(0x100000)))
        }

        fn query_region(&self, addr: Address) -> Result<MemoryRegion, MemoryError> {
            thread::sleep(Duration::from_millis(4));
            let range = MemoryRange::from_start_size(addr, 0x1000);
            Ok(MemoryRegion::new(range, Protection::ReadWrite, RegionState::Committed))
        }

        fn read_bytes(&self, _addr: Address, len: usize) -> Result<Vec<u8>, MemoryError> {
            Ok(vec![0x11; len])
        }

        fn write_bytes(&self, addr: Address, _data: &[u8]) -> Result<(), MemoryError> {
            Err(MemoryError::WriteFailed(addr.as_u64()))
        }
    }

    #[test]
    fn test_second_start_while_running_is_rejected() {
        let (sender, receiver) = mpsc::channel();
        let mut worker = ScanWorker::new(small_config(), sender);
        assert!(worker.start(Arc::new(SlowMemory)));
        // 256 slow region queries keep the first scan busy well past
        // this call.
        assert!(!worker.start(Arc::new(SlowMemory)));
        while worker.is_running() {
            thread::sleep(Duration::from_millis(5));
        }
        worker.stop();
        drop(worker);

        let (finished, errors) = drain_terminal_events(&receiver);
        assert_eq!(finished + errors, 1);
    }

    #[test]
    fn test_restart_after_completion() {
        let (sender, receiver) = mpsc::channel();
        let mut worker = ScanWorker::new(small_config(), sender);
        assert!(worker.start(table_backend()));
        while worker.is_running() {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(worker.start(table_backend()));
        while worker.is_running() {
            thread::sleep(Duration::from_millis(5));
        }
        worker.stop();
        drop(worker);

        let (finished, errors) = drain_terminal_events(&receiver);
        assert_eq!(errors, 0);
        assert_eq!(finished, 2);
    }

    #[test]
    fn test_stop_joins_thread() {
        let (sender, _receiver) = mpsc::channel();
        let mut worker = ScanWorker::new(small_config(), sender);
        assert!(worker.start(Arc::new(SlowMemory)));
        worker.stop();
        assert!(worker.thread.is_none());
    }
}
