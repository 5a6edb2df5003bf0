// Wed Aug 19 2026 - Alex

pub mod access;
pub mod address;
pub mod error;
pub mod handle;
pub mod process;
pub mod protection;
pub mod range;
pub mod region;

pub use access::{ProcessMemory, SyntheticMemory};
pub use address::Address;
pub use error::MemoryError;
pub use handle::ProcessHandle;
pub use process::LinuxProcess;
pub use protection::Protection;
pub use range::MemoryRange;
pub use region::{MemoryRegion, RegionState};
