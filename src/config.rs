// Fri Aug 21 2026 - Alex

use crate::fields::{FieldDescriptor, FieldType};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Layout of the character table in the default target build: a 50-byte
/// struct led by the unlock flag, with stats stored big-endian and a
/// 4-byte zero tail.
static DEFAULT_OFFSETS: Lazy<IndexMap<String, FieldDescriptor>> = Lazy::new(|| {
    let mut offsets = IndexMap::new();
    offsets.insert(
        "is_unlocked".to_string(),
        FieldDescriptor { offset: 0, field_type: FieldType::Bool },
    );
    offsets.insert(
        "level".to_string(),
        FieldDescriptor { offset: 1, field_type: FieldType::Byte },
    );
    offsets.insert(
        "experience".to_string(),
        FieldDescriptor { offset: 2, field_type: FieldType::Int32 },
    );
    offsets.insert(
        "health".to_string(),
        FieldDescriptor { offset: 6, field_type: FieldType::Int32 },
    );
    offsets.insert(
        "mana".to_string(),
        FieldDescriptor { offset: 10, field_type: FieldType::Int32 },
    );
    offsets
});

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub process_name: String,
    /// Size in bytes of one character struct.
    pub struct_size: usize,
    /// Zeroed bytes at the tail of every struct.
    pub padding_length: usize,
    /// Zero bytes required immediately before the first struct.
    pub preceding_zeroes: usize,
    /// Skip the low part of the address space and start scanning at
    /// `fast_scan_start_address`. Heuristic only: it assumes the table
    /// never appears below that address, which nothing enforces.
    pub fast_scan: bool,
    pub fast_scan_start_address: u64,
    /// Upper bound on table length; enumeration also stops at the first
    /// invalid flag byte.
    pub max_records: usize,
    /// Field name -> offset/type. Order here is the order record dumps
    /// are emitted in.
    pub offsets: IndexMap<String, FieldDescriptor>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            process_name: "game".to_string(),
            struct_size: 50,
            padding_length: 4,
            preceding_zeroes: 10,
            fast_scan: false,
            fast_scan_start_address: 0,
            max_records: 42,
            offsets: DEFAULT_OFFSETS.clone(),
        }
    }
}

impl ScanConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_process_name(mut self, name: &str) -> Self {
        self.process_name = name.to_string();
        self
    }

    pub fn with_fast_scan(mut self, start_address: u64) -> Self {
        self.fast_scan = true;
        self.fast_scan_start_address = start_address;
        self
    }

    pub fn load(path: &Path) -> Result<Self, String> {
        let text = fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
        let config: Self =
            serde_json::from_str(&text).map_err(|e| format!("{}: {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), String> {
        let text = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(path, text).map_err(|e| format!("{}: {}", path.display(), e))
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.process_name.is_empty() {
            return Err("process_name must not be empty".to_string());
        }
        if self.struct_size == 0 {
            return Err("struct_size must be greater than 0".to_string());
        }
        if self.padding_length + 1 > self.struct_size {
            return Err("padding_length must leave room for the flag byte".to_string());
        }
        if self.max_records == 0 {
            return Err("max_records must be greater than 0".to_string());
        }
        if self.fast_scan && self.fast_scan_start_address == 0 {
            return Err("fast_scan requires a nonzero fast_scan_start_address".to_string());
        }
        for (name, descriptor) in &self.offsets {
            if descriptor.offset + descriptor.field_type.width() > self.struct_size {
                return Err(format!(
                    "field '{}' extends past the end of the struct ({} + {} > {})",
                    name,
                    descriptor.offset,
                    descriptor.field_type.width(),
                    self.struct_size
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ScanConfig::default().validate().is_ok());
    }

    #[test]
    fn test_field_past_struct_end_rejected() {
        let mut config = ScanConfig::default();
        config.offsets.insert(
            "overflow".to_string(),
            FieldDescriptor { offset: 48, field_type: FieldType::Int32 },
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_padding_must_leave_flag_byte() {
        let config = ScanConfig { struct_size: 4, padding_length: 4, ..ScanConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fast_scan_needs_start_address() {
        let config = ScanConfig { fast_scan: true, fast_scan_start_address: 0, ..ScanConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let config = ScanConfig::default().with_process_name("target").with_fast_scan(0x10000);
        let text = serde_json::to_string(&config).unwrap();
        let parsed: ScanConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.process_name, "target");
        assert!(parsed.fast_scan);
        assert_eq!(parsed.fast_scan_start_address, 0x10000);
        assert_eq!(parsed.offsets.len(), config.offsets.len());
        assert_eq!(
            parsed.offsets.keys().collect::<Vec<_>>(),
            config.offsets.keys().collect::<Vec<_>>()
        );
    }
}
