// Thu Aug 20 2026 - Alex

pub mod pattern;
pub mod signature;

pub use pattern::{Pattern, PatternBuilder};
pub use signature::record_signature;
