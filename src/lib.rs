// Wed Aug 19 2026 - Alex

pub mod config;
pub mod fields;
pub mod memory;
pub mod pattern;
pub mod scanner;

pub use config::ScanConfig;
pub use fields::{FieldCodec, FieldDescriptor, FieldType, FieldValue};
pub use memory::{Address, MemoryError, ProcessHandle, ProcessMemory};
pub use pattern::{Pattern, PatternBuilder};
pub use scanner::{CharacterScanner, Record, RecordLocator, ScanEvent, ScanWorker, Severity};
