// Fri Aug 21 2026 - Alex

pub mod locator;
pub mod table;
pub mod worker;

pub use locator::RecordLocator;
pub use table::{CharacterScanner, Record};
pub use worker::{ScanEvent, ScanWorker, Severity};
