//! Supported switch core families
//!
//! Every family has its own register layout for the identification
//! registers, its own quirks when decoding them, its own pin-control table
//! and its own set of sibling devices. The [Chip] enum dispatches to the
//! family modules.

use std::fmt::{self, Display, Formatter};

use strum::{Display, EnumIter, EnumString, IntoEnumIterator, VariantNames};

use crate::{
    pinctrl::SwcoreConfig,
    regmap::{field_get, field_prep, genmask, RegisterMap},
    switchcore::DeviceCell,
    Error,
};

mod cypress;
mod maple;

const MODEL_NAME_ID: u32 = genmask(31, 16);
const MODEL_NAME_CHAR: u32 = genmask(15, 11);

const CHIP_INFO_UNLOCK: u32 = genmask(31, 28);
const CHIP_INFO_UNLOCK_CODE: u32 = 0xa;
const CHIP_INFO_CHIP_REV: u32 = genmask(20, 16);
const CHIP_INFO_RL_ID: u32 = genmask(15, 0);

/// All supported switch core families
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, VariantNames,
)]
#[non_exhaustive]
#[strum(serialize_all = "lowercase")]
pub enum Chip {
    /// RTL838x
    Maple,
    /// RTL839x
    Cypress,
}

impl Chip {
    /// Find the family matching a switch core or pin controller compatible
    /// string
    pub fn from_compatible(compatible: &str) -> Result<Self, Error> {
        Chip::iter()
            .find(|chip| {
                chip.compatible() == compatible || chip.pinctrl_compatible() == compatible
            })
            .ok_or_else(|| Error::UnknownCompatible(compatible.to_string()))
    }

    /// All recognized compatible strings
    pub fn compatibles() -> Vec<&'static str> {
        Chip::iter()
            .flat_map(|chip| [chip.compatible(), chip.pinctrl_compatible()])
            .collect()
    }

    /// Compatible string of the switch core
    pub fn compatible(&self) -> &'static str {
        match self {
            Chip::Maple => "realtek,maple-switchcore",
            Chip::Cypress => "realtek,cypress-switchcore",
        }
    }

    /// Compatible string of the switch core's pin controller
    pub fn pinctrl_compatible(&self) -> &'static str {
        match self {
            Chip::Maple => "realtek,maple-pinctrl",
            Chip::Cypress => "realtek,cypress-pinctrl",
        }
    }

    /// Marketing name of the SoC series
    pub fn family(&self) -> &'static str {
        match self {
            Chip::Maple => "RTL838x",
            Chip::Cypress => "RTL839x",
        }
    }

    /// Read the identification registers
    ///
    /// On Maple this disables the global register lock, which is left
    /// disabled afterwards.
    pub fn identify<M: RegisterMap + ?Sized>(&self, map: &mut M) -> Result<ChipIdentity, Error> {
        match self {
            Chip::Maple => maple::identify(map),
            Chip::Cypress => cypress::identify(map),
        }
    }

    /// Model numbers of the family's members
    pub fn models(&self) -> &'static [u16] {
        match self {
            Chip::Maple => maple::MODELS,
            Chip::Cypress => cypress::MODELS,
        }
    }

    /// Is `identity` a known member of this family?
    pub fn is_known(&self, identity: &ChipIdentity) -> bool {
        self.models().contains(&identity.model_id)
    }

    /// Pin-control table of the family
    pub fn pinctrl_config(&self) -> &'static SwcoreConfig {
        match self {
            Chip::Maple => &maple::PINCTRL,
            Chip::Cypress => &cypress::PINCTRL,
        }
    }

    /// Devices sharing the switch core's register space
    pub fn devices(&self) -> &'static [DeviceCell] {
        match self {
            Chip::Maple => maple::DEVICES,
            Chip::Cypress => cypress::DEVICES,
        }
    }
}

/// Decoded contents of the identification registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipIdentity {
    /// Model number, e.g. 0x8380
    pub model_id: u16,
    /// Letter following the model number, if any
    pub model_suffix: Option<char>,
    /// Revision, where 0 is the A cut
    pub revision: u8,
    /// Internal part number
    pub rl_id: u16,
}

impl ChipIdentity {
    pub fn revision_letter(&self) -> char {
        char::from(b'A'.saturating_add(self.revision))
    }
}

impl Display for ChipIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "RTL{:04x}", self.model_id)?;
        if let Some(suffix) = self.model_suffix {
            write!(f, "{suffix}")?;
        }
        write!(
            f,
            " rev. {}, RL:{:04x}",
            self.revision_letter(),
            self.rl_id
        )
    }
}

/// Decode the 5-bit model letter, where 0 means there is no letter
///
/// Codes past 26 continue on from 'Z' in ASCII.
const fn model_char(code: u32) -> Option<char> {
    match code {
        1..=31 => Some((b'A' + (code as u8) - 1) as char),
        _ => None,
    }
}

/// Read the model number and letter from a MODEL_NAME_INFO register
fn read_chip_name<M: RegisterMap + ?Sized>(
    map: &mut M,
    reg: u32,
) -> Result<(u16, Option<char>), Error> {
    let value = map.read(reg)?;

    Ok((
        field_get(MODEL_NAME_ID, value) as u16,
        model_char(field_get(MODEL_NAME_CHAR, value)),
    ))
}

/// Unlock a CHIP_INFO register and read the raw revision and RL id from it
fn read_chip_info<M: RegisterMap + ?Sized>(map: &mut M, reg: u32) -> Result<(u8, u16), Error> {
    map.write(reg, field_prep(CHIP_INFO_UNLOCK, CHIP_INFO_UNLOCK_CODE))?;
    let value = map.read(reg)?;

    Ok((
        field_get(CHIP_INFO_CHIP_REV, value) as u8,
        field_get(CHIP_INFO_RL_ID, value) as u16,
    ))
}
