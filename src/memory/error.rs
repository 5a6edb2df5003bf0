// Wed Aug 19 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No process attached. Call attach() first.")]
    NotAttached,
    #[error("Process not found: {0}")]
    ProcessNotFound(String),
    #[error("Read failed at address 0x{0:x}")]
    ReadFailed(u64),
    #[error("Write failed at address 0x{0:x}")]
    WriteFailed(u64),
    #[error("Region query failed at address 0x{0:x}")]
    RegionQueryFailed(u64),
    #[error("Unknown field: {0}")]
    UnknownField(String),
    #[error("Type mismatch for field {field}: expected {expected}")]
    TypeMismatch { field: String, expected: &'static str },
}
