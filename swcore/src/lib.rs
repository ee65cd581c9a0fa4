//! Chip identification and pin multiplexing for Realtek switch SoCs
//!
//! The RTL838x ("Maple") and RTL839x ("Cypress") switch cores share a single
//! register space between the switch fabric and a handful of pins that can be
//! muxed between GPIO, JTAG, an auxiliary MDIO bus, the system LED and a
//! UART. This crate identifies the switch core that is present, selects the
//! matching pin-control table and resolves function/group requests into
//! writes of the correct register field.
//!
//! Register access is abstracted behind the [RegisterMap] trait; an in-memory
//! map is provided for testing and simulation, and on unix hosts the switch
//! core can be accessed directly through `/dev/mem`.
//!
//! ```
//! use swcore::{pinctrl::PinmuxOps, regmap::memory::MemoryMap, Switchcore};
//!
//! let switchcore = Switchcore::probe("realtek,maple-switchcore", MemoryMap::new())?;
//! let mut pinctrl = switchcore.into_pinctrl()?;
//!
//! // Function 0 is "gpio", group 0 is "jtag"
//! pinctrl.set_mux(0, 0)?;
//! assert_eq!(pinctrl.map().get(0x1000), 0b1000);
//! # Ok::<(), swcore::Error>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub use self::{
    error::Error,
    regmap::{FieldAccessor, RegField, RegisterMap},
    switchcore::Switchcore,
    targets::{Chip, ChipIdentity},
};

pub mod error;
pub mod pinctrl;
pub mod regmap;
pub mod switchcore;
pub mod targets;

#[cfg(feature = "cli")]
#[cfg_attr(docsrs, doc(cfg(feature = "cli")))]
pub mod cli;

#[cfg(feature = "cli")]
#[cfg_attr(docsrs, doc(cfg(feature = "cli")))]
pub mod logging;
