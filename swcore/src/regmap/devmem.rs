//! Physical memory access through `/dev/mem`
//!
//! On the switch SoCs themselves the switch core registers are mapped at a
//! fixed physical address (0x1b00_0000 on both RTL838x and RTL839x). The
//! SoCs are big endian MIPS cores, so that is the default byte order.

use std::{
    fs::{File, OpenOptions},
    io,
    os::unix::fs::FileExt,
    path::Path,
};

use strum::{Display, EnumString, VariantNames};

use super::RegisterMap;
use crate::error::{Error, RegmapError};

/// Default location of the physical memory device
pub const DEV_MEM: &str = "/dev/mem";

/// Physical base address of the switch core register space
pub const SWITCHCORE_BASE: u64 = 0x1b00_0000;

/// Byte order of the registers
#[cfg_attr(feature = "cli", derive(serde::Deserialize))]
#[cfg_attr(feature = "cli", serde(rename_all = "lowercase"))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Display, EnumString, VariantNames)]
#[strum(serialize_all = "lowercase")]
pub enum Endianness {
    #[default]
    Big,
    Little,
}

/// Register map backed by physical memory
#[derive(Debug)]
pub struct DevMem {
    file: File,
    base: u64,
    size: Option<u32>,
    endianness: Endianness,
}

impl DevMem {
    /// Open the memory device at `path`, with the register space starting at
    /// physical address `base`
    pub fn open(path: impl AsRef<Path>, base: u64) -> Result<Self, Error> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|err| Error::DeviceOpen(path.display().to_string(), err))?;

        Ok(Self {
            file,
            base,
            size: None,
            endianness: Endianness::default(),
        })
    }

    /// Limit the register space to `size` bytes
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }

    fn io_error(offset: u32) -> impl FnOnce(io::Error) -> RegmapError {
        move |source| RegmapError::Io { offset, source }
    }
}

impl RegisterMap for DevMem {
    fn read(&mut self, offset: u32) -> Result<u32, RegmapError> {
        self.check_offset(offset)?;

        let mut bytes = [0u8; 4];
        self.file
            .read_exact_at(&mut bytes, self.base + u64::from(offset))
            .map_err(Self::io_error(offset))?;

        Ok(match self.endianness {
            Endianness::Big => u32::from_be_bytes(bytes),
            Endianness::Little => u32::from_le_bytes(bytes),
        })
    }

    fn write(&mut self, offset: u32, value: u32) -> Result<(), RegmapError> {
        self.check_offset(offset)?;

        let bytes = match self.endianness {
            Endianness::Big => value.to_be_bytes(),
            Endianness::Little => value.to_le_bytes(),
        };
        self.file
            .write_all_at(&bytes, self.base + u64::from(offset))
            .map_err(Self::io_error(offset))
    }

    fn max_register(&self) -> Option<u32> {
        self.size.and_then(|size| size.checked_sub(self.reg_stride()))
    }

    fn is_empty(&self) -> bool {
        self.size.is_some_and(|size| size < self.reg_stride())
    }
}
