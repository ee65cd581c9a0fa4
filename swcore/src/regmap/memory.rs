//! In-memory register map
//!
//! Useful for exercising the pin controller without hardware: registers read
//! as zero until written, selected bits can be marked read-only to model
//! hardware status fields, and every write is recorded.

use std::collections::BTreeMap;

use super::RegisterMap;
use crate::error::RegmapError;

#[derive(Debug, Default, Clone)]
pub struct MemoryMap {
    registers: BTreeMap<u32, u32>,
    read_only: BTreeMap<u32, u32>,
    size: Option<u32>,
    writes: Vec<(u32, u32)>,
}

impl MemoryMap {
    /// An unbounded map with all registers reading as zero
    pub fn new() -> Self {
        Self::default()
    }

    /// A map of `size` bytes
    ///
    /// A size below one register leaves an empty map that rejects every
    /// offset.
    pub fn with_size(size: u32) -> Self {
        Self {
            size: Some(size),
            ..Self::default()
        }
    }

    /// Seed the initial value of a register
    ///
    /// Seeding is not recorded as a write.
    pub fn with_register(mut self, offset: u32, value: u32) -> Self {
        self.registers.insert(offset, value);
        self
    }

    /// Seed the initial values of several registers
    pub fn with_registers(mut self, registers: impl IntoIterator<Item = (u32, u32)>) -> Self {
        self.registers.extend(registers);
        self
    }

    /// Mark the bits of `mask` in the register at `offset` as read-only
    ///
    /// Writes to the register leave those bits unchanged.
    pub fn with_read_only(mut self, offset: u32, mask: u32) -> Self {
        *self.read_only.entry(offset).or_default() |= mask;
        self
    }

    /// Current value of a register, without recording an access
    pub fn get(&self, offset: u32) -> u32 {
        self.registers.get(&offset).copied().unwrap_or_default()
    }

    /// All registers that hold a value, ordered by offset
    pub fn registers(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.registers.iter().map(|(&offset, &value)| (offset, value))
    }

    /// Every write performed so far, as `(offset, value)` pairs
    pub fn writes(&self) -> &[(u32, u32)] {
        &self.writes
    }

    /// Forget the recorded writes
    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }
}

impl RegisterMap for MemoryMap {
    fn read(&mut self, offset: u32) -> Result<u32, RegmapError> {
        self.check_offset(offset)?;

        Ok(self.get(offset))
    }

    fn write(&mut self, offset: u32, value: u32) -> Result<(), RegmapError> {
        self.check_offset(offset)?;

        let read_only = self.read_only.get(&offset).copied().unwrap_or_default();
        let value = (self.get(offset) & read_only) | (value & !read_only);

        self.registers.insert(offset, value);
        self.writes.push((offset, value));

        Ok(())
    }

    fn max_register(&self) -> Option<u32> {
        self.size.and_then(|size| size.checked_sub(self.reg_stride()))
    }

    fn is_empty(&self) -> bool {
        self.size.is_some_and(|size| size < self.reg_stride())
    }
}
