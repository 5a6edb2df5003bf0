// Fri Aug 21 2026 - Alex

use crate::config::ScanConfig;
use crate::memory::{Address, MemoryError, ProcessMemory};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of field encodings. Adding a variant forces every match
/// below to handle it, so a descriptor table can never name a type the
/// codec silently ignores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Byte,
    Bool,
    Int32,
}

impl FieldType {
    pub fn width(&self) -> usize {
        match self {
            FieldType::Byte | FieldType::Bool => 1,
            FieldType::Int32 => 4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Byte => "byte",
            FieldType::Bool => "bool",
            FieldType::Int32 => "int32",
        }
    }
}

/// Offset and encoding of one named value inside a record. One table is
/// shared by every record for the life of the attachment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub offset: usize,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Byte(u8),
    Int32(i32),
}

impl FieldValue {
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::Byte(_) => FieldType::Byte,
            FieldValue::Bool(_) => FieldType::Bool,
            FieldValue::Int32(_) => FieldType::Int32,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Byte(v) => write!(f, "{}", v),
            FieldValue::Bool(v) => write!(f, "{}", v),
            FieldValue::Int32(v) => write!(f, "{}", v),
        }
    }
}

/// Decode a field value from its raw bytes. `raw` must be exactly the
/// declared width.
pub fn decode(field_type: FieldType, raw: &[u8]) -> FieldValue {
    debug_assert_eq!(raw.len(), field_type.width());
    match field_type {
        FieldType::Byte => FieldValue::Byte(raw[0]),
        // Exactly 0x80 means true. 0x01 or any other nonzero value is
        // still false for this encoding.
        FieldType::Bool => FieldValue::Bool(raw[0] == 0x80),
        FieldType::Int32 => {
            FieldValue::Int32(i32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]))
        }
    }
}

/// Encode a field value into the bytes stored in the target process.
pub fn encode(value: FieldValue) -> Vec<u8> {
    match value {
        FieldValue::Byte(v) => vec![v],
        FieldValue::Bool(v) => vec![if v { 0x80 } else { 0x00 }],
        FieldValue::Int32(v) => v.to_be_bytes().to_vec(),
    }
}

/// Reads and writes single named fields of a record through the
/// process-memory capability.
pub struct FieldCodec<'a> {
    config: &'a ScanConfig,
}

impl<'a> FieldCodec<'a> {
    pub fn new(config: &'a ScanConfig) -> Self {
        Self { config }
    }

    fn descriptor(&self, field_name: &str) -> Result<&FieldDescriptor, MemoryError> {
        self.config
            .offsets
            .get(field_name)
            .ok_or_else(|| MemoryError::UnknownField(field_name.to_string()))
    }

    pub fn read_field(
        &self,
        memory: &dyn ProcessMemory,
        base_address: Address,
        field_name: &str,
    ) -> Result<FieldValue, MemoryError> {
        let descriptor = self.descriptor(field_name)?;
        let field_address = base_address + descriptor.offset as u64;
        let raw = memory.read_bytes(field_address, descriptor.field_type.width())?;
        Ok(decode(descriptor.field_type, &raw))
    }

    pub fn write_field(
        &self,
        memory: &dyn ProcessMemory,
        base_address: Address,
        field_name: &str,
        value: FieldValue,
    ) -> Result<(), MemoryError> {
        let descriptor = self.descriptor(field_name)?;
        if value.field_type() != descriptor.field_type {
            return Err(MemoryError::TypeMismatch {
                field: field_name.to_string(),
                expected: descriptor.field_type.name(),
            });
        }
        let field_address = base_address + descriptor.offset as u64;
        memory.write_bytes(field_address, &encode(value))
    }
}
