// Sat Aug 22 2026 - Alex

use crate::config::ScanConfig;
use crate::fields::{FieldCodec, FieldValue};
use crate::memory::{Address, MemoryError, ProcessHandle, ProcessMemory};
use crate::scanner::RecordLocator;
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::atomic::AtomicBool;

/// Flag byte values a valid record may carry. Anything else marks the
/// end of the table during enumeration.
const FLAG_LOCKED: u8 = 0x00;
const FLAG_UNLOCKED: u8 = 0x80;

/// One decoded character record: its base address in the target process
/// and every declared field, in descriptor-table order.
#[derive(Debug, Clone, Serialize)]
pub struct Record {
    pub address: Address,
    pub fields: IndexMap<String, FieldValue>,
}

/// Walk forward from the first record in struct-size strides, keeping
/// addresses whose flag byte is valid. Stops at the first invalid flag
/// byte or at `max_records`. The flag check is a heuristic: a corrupted
/// flag truncates the table early rather than erroring.
pub fn enumerate_addresses(
    memory: &dyn ProcessMemory,
    config: &ScanConfig,
    first_address: Address,
) -> Result<Vec<Address>, MemoryError> {
    let mut addresses = Vec::new();
    for i in 0..config.max_records {
        let address = first_address + (i * config.struct_size) as u64;
        let flag = memory.read_u8(address)?;
        if flag != FLAG_LOCKED && flag != FLAG_UNLOCKED {
            log::debug!(
                "Table ends at index {}: flag byte 0x{:02x} at {}",
                i,
                flag,
                address
            );
            break;
        }
        addresses.push(address);
    }
    Ok(addresses)
}

/// Decode every declared field of the record at `base_address`.
pub fn read_record(
    memory: &dyn ProcessMemory,
    config: &ScanConfig,
    base_address: Address,
) -> Result<Record, MemoryError> {
    let codec = FieldCodec::new(config);
    let mut fields = IndexMap::with_capacity(config.offsets.len());
    for name in config.offsets.keys() {
        let value = codec.read_field(memory, base_address, name)?;
        fields.insert(name.clone(), value);
    }
    Ok(Record { address: base_address, fields })
}

/// Full pipeline: locate the table, enumerate it, decode every record.
/// An empty Vec means the signature was not found anywhere; that is a
/// result, not an error.
pub fn read_all_records(
    memory: &dyn ProcessMemory,
    config: &ScanConfig,
    stop: &AtomicBool,
) -> Result<Vec<Record>, MemoryError> {
    let locator = RecordLocator::new(config);
    let first_address = match locator.find_first_until(memory, stop)? {
        Some(address) => address,
        None => return Ok(Vec::new()),
    };
    let addresses = enumerate_addresses(memory, config, first_address)?;
    addresses
        .into_iter()
        .map(|address| read_record(memory, config, address))
        .collect()
}

/// Attached-process facade over the locator, enumerator and codec.
/// Every operation reports `NotAttached` before touching any address.
pub struct CharacterScanner {
    handle: ProcessHandle,
    config: ScanConfig,
}

impl CharacterScanner {
    pub fn new(config: ScanConfig) -> Self {
        let handle = ProcessHandle::new(&config.process_name);
        Self { handle, config }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn handle(&self) -> &ProcessHandle {
        &self.handle
    }

    pub fn handle_mut(&mut self) -> &mut ProcessHandle {
        &mut self.handle
    }

    pub fn attach(&mut self) -> bool {
        self.handle.attach()
    }

    pub fn close(&mut self) {
        self.handle.close();
    }

    pub fn is_attached(&self) -> bool {
        self.handle.is_attached()
    }

    pub fn find_first_record_address(&self) -> Result<Option<Address>, MemoryError> {
        let memory = self.handle.backend()?;
        RecordLocator::new(&self.config).find_first(memory.as_ref())
    }

    pub fn record_addresses(&self) -> Result<Vec<Address>, MemoryError> {
        let memory = self.handle.backend()?;
        match RecordLocator::new(&self.config).find_first(memory.as_ref())? {
            Some(first) => enumerate_addresses(memory.as_ref(), &self.config, first),
            None => Ok(Vec::new()),
        }
    }

    pub fn get_record(&self, base_address: Address) -> Result<Record, MemoryError> {
        let memory = self.handle.backend()?;
        read_record(memory.as_ref(), &self.config, base_address)
    }

    pub fn get_all_records(&self) -> Result<Vec<Record>, MemoryError> {
        let memory = self.handle.backend()?;
        read_all_records(memory.as_ref(), &self.config, &AtomicBool::new(false))
    }

    pub fn read_field(&self, base_address: Address, name: &str) -> Result<FieldValue, MemoryError> {
        let memory = self.handle.backend()?;
        FieldCodec::new(&self.config).read_field(memory.as_ref(), base_address, name)
    }

    pub fn write_field(
        &self,
        base_address: Address,
        name: &str,
        value: FieldValue,
    ) -> Result<(), MemoryError> {
        let memory = self.handle.backend()?;
        FieldCodec::new(&self.config).write_field(memory.as_ref(), base_address, name, value)
    }
}
