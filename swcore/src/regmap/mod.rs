//! Register map access
//!
//! The switch core exposes a single, shared 32-bit register space. Everything
//! in this crate talks to it through the [RegisterMap] trait, which only
//! requires word reads and writes; bit-field updates are built on top of
//! those.
//!
//! Multiplexer fields are described statically as a [RegField] and bound to
//! a register map once, yielding a [FieldAccessor] that performs scoped
//! read-modify-write cycles on just those bits.

use std::fmt::{self, Display, Formatter};

use log::trace;

use crate::error::RegmapError;

#[cfg(unix)]
#[cfg_attr(docsrs, doc(cfg(unix)))]
pub mod devmem;
pub mod memory;

/// Contiguous mask with bits `lsb..=msb` set
///
/// Returns an empty mask if the bit range is malformed.
pub const fn genmask(msb: u32, lsb: u32) -> u32 {
    if msb > 31 || lsb > msb {
        return 0;
    }

    (u32::MAX >> (31 - msb)) & (u32::MAX << lsb)
}

/// Extract the field described by `mask` from a register value
pub const fn field_get(mask: u32, value: u32) -> u32 {
    if mask == 0 {
        return 0;
    }

    (value & mask) >> mask.trailing_zeros()
}

/// Shift `value` into the field described by `mask`, truncating it to the
/// field's width
pub const fn field_prep(mask: u32, value: u32) -> u32 {
    if mask == 0 {
        return 0;
    }

    (value << mask.trailing_zeros()) & mask
}

/// A bit field within a single register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegField {
    /// Offset of the register within the register map
    pub offset: u32,
    /// Least significant bit of the field
    pub lsb: u32,
    /// Most significant bit of the field
    pub msb: u32,
}

impl RegField {
    pub const fn new(offset: u32, lsb: u32, msb: u32) -> Self {
        Self { offset, lsb, msb }
    }

    /// Does the field describe a non-empty bit range within a 32-bit
    /// register?
    pub const fn is_valid(&self) -> bool {
        self.lsb <= self.msb && self.msb < 32
    }

    /// Number of bits in the field
    pub const fn width(&self) -> u32 {
        if self.is_valid() {
            self.msb - self.lsb + 1
        } else {
            0
        }
    }

    /// Register mask covering the field
    pub const fn mask(&self) -> u32 {
        genmask(self.msb, self.lsb)
    }

    /// Largest value the field can hold
    pub const fn max_value(&self) -> u32 {
        field_get(self.mask(), u32::MAX)
    }
}

impl Display for RegField {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}[{}:{}]", self.offset, self.msb, self.lsb)
    }
}

/// Word-addressed access to a register space
pub trait RegisterMap {
    /// Read the register at `offset`
    fn read(&mut self, offset: u32) -> Result<u32, RegmapError>;

    /// Write `value` to the register at `offset`
    fn write(&mut self, offset: u32, value: u32) -> Result<(), RegmapError>;

    /// Replace the bits selected by `mask` with those of `value`
    ///
    /// The register is only written if its contents actually change.
    fn update_bits(&mut self, offset: u32, mask: u32, value: u32) -> Result<(), RegmapError> {
        let current = self.read(offset)?;
        let updated = (current & !mask) | (value & mask);

        if updated != current {
            trace!("update {offset:#06x}: {current:#010x} -> {updated:#010x}");
            self.write(offset, updated)?;
        }

        Ok(())
    }

    /// Offset of the last register in the map, if the map is bounded
    ///
    /// Empty maps have no last register and report `None` here as well, see
    /// [`RegisterMap::is_empty`].
    fn max_register(&self) -> Option<u32> {
        None
    }

    /// Whether the map is bounded to less than one register
    fn is_empty(&self) -> bool {
        false
    }

    /// Distance in bytes between consecutive registers
    fn reg_stride(&self) -> u32 {
        4
    }

    /// Check that `offset` addresses a register of this map
    fn check_offset(&self, offset: u32) -> Result<(), RegmapError> {
        let stride = self.reg_stride();
        if stride > 1 && offset % stride != 0 {
            return Err(RegmapError::Unaligned { offset, stride });
        }
        if self.is_empty() {
            return Err(RegmapError::Empty { offset });
        }

        match self.max_register() {
            Some(max) if offset > max => Err(RegmapError::OutOfRange { offset, max }),
            _ => Ok(()),
        }
    }

    /// Bind a field of this map
    fn field(&self, field: RegField) -> Result<FieldAccessor, RegmapError> {
        FieldAccessor::new(self, field)
    }
}

impl<M: RegisterMap + ?Sized> RegisterMap for &mut M {
    fn read(&mut self, offset: u32) -> Result<u32, RegmapError> {
        (**self).read(offset)
    }

    fn write(&mut self, offset: u32, value: u32) -> Result<(), RegmapError> {
        (**self).write(offset, value)
    }

    fn update_bits(&mut self, offset: u32, mask: u32, value: u32) -> Result<(), RegmapError> {
        (**self).update_bits(offset, mask, value)
    }

    fn max_register(&self) -> Option<u32> {
        (**self).max_register()
    }

    fn is_empty(&self) -> bool {
        (**self).is_empty()
    }

    fn reg_stride(&self) -> u32 {
        (**self).reg_stride()
    }

    fn check_offset(&self, offset: u32) -> Result<(), RegmapError> {
        (**self).check_offset(offset)
    }

    fn field(&self, field: RegField) -> Result<FieldAccessor, RegmapError> {
        (**self).field(field)
    }
}

impl<M: RegisterMap + ?Sized> RegisterMap for Box<M> {
    fn read(&mut self, offset: u32) -> Result<u32, RegmapError> {
        (**self).read(offset)
    }

    fn write(&mut self, offset: u32, value: u32) -> Result<(), RegmapError> {
        (**self).write(offset, value)
    }

    fn update_bits(&mut self, offset: u32, mask: u32, value: u32) -> Result<(), RegmapError> {
        (**self).update_bits(offset, mask, value)
    }

    fn max_register(&self) -> Option<u32> {
        (**self).max_register()
    }

    fn is_empty(&self) -> bool {
        (**self).is_empty()
    }

    fn reg_stride(&self) -> u32 {
        (**self).reg_stride()
    }

    fn check_offset(&self, offset: u32) -> Result<(), RegmapError> {
        (**self).check_offset(offset)
    }

    fn field(&self, field: RegField) -> Result<FieldAccessor, RegmapError> {
        (**self).field(field)
    }
}

/// A register field bound to a register map
///
/// Acquiring an accessor validates the field against the map, so reads and
/// writes through it can only fail on transport errors. The accessor does not
/// borrow the map; pass the same map it was acquired from to [read] and
/// [write].
///
/// [read]: FieldAccessor::read
/// [write]: FieldAccessor::write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldAccessor {
    field: RegField,
    mask: u32,
}

impl FieldAccessor {
    pub fn new<M: RegisterMap + ?Sized>(map: &M, field: RegField) -> Result<Self, RegmapError> {
        if !field.is_valid() {
            return Err(RegmapError::InvalidField(field));
        }
        map.check_offset(field.offset)?;

        Ok(Self {
            field,
            mask: field.mask(),
        })
    }

    /// The field this accessor is bound to
    pub fn field(&self) -> RegField {
        self.field
    }

    /// Read the current value of the field
    pub fn read<M: RegisterMap + ?Sized>(&self, map: &mut M) -> Result<u32, RegmapError> {
        let value = map.read(self.field.offset)?;

        Ok(field_get(self.mask, value))
    }

    /// Write `value` into the field, leaving the other bits of the register
    /// untouched
    ///
    /// Values wider than the field are truncated.
    pub fn write<M: RegisterMap + ?Sized>(&self, map: &mut M, value: u32) -> Result<(), RegmapError> {
        trace!("write {} = {value:#x}", self.field);
        map.update_bits(self.field.offset, self.mask, field_prep(self.mask, value))
    }
}
