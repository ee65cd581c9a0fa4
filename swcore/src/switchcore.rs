//! Switch core bring-up
//!
//! The switch core is the first device to claim the shared register space. It
//! identifies the chip, reports it, and hands the register map on to the
//! devices that live inside it; of those, only the pin controller is provided
//! by this crate.

use std::fmt::{self, Display, Formatter};

use log::{debug, info, warn};

use crate::{
    pinctrl::Pinctrl,
    regmap::RegisterMap,
    targets::{Chip, ChipIdentity},
    Error,
};

/// A device sharing the switch core's register space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceCell {
    pub name: &'static str,
    pub compatible: &'static str,
}

impl DeviceCell {
    pub const fn new(name: &'static str, compatible: &'static str) -> Self {
        Self { name, compatible }
    }
}

impl Display for DeviceCell {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.compatible)
    }
}

/// A probed switch core
#[derive(Debug)]
pub struct Switchcore<M> {
    chip: Chip,
    identity: Option<ChipIdentity>,
    map: M,
}

impl<M: RegisterMap> Switchcore<M> {
    /// Probe the switch core matching `compatible`
    pub fn probe(compatible: &str, map: M) -> Result<Self, Error> {
        let chip = Chip::from_compatible(compatible)?;

        Ok(Self::probe_chip(chip, map))
    }

    /// Probe a switch core of a known family
    ///
    /// Identification is informational only: a chip that can not be read, or
    /// that reports a model outside of its family, is still brought up.
    pub fn probe_chip(chip: Chip, mut map: M) -> Self {
        let identity = match chip.identify(&mut map) {
            Ok(identity) => {
                if chip.is_known(&identity) {
                    info!("found {identity}");
                } else {
                    warn!("found unrecognized {} chip {identity}", chip.family());
                }
                Some(identity)
            }
            Err(err) => {
                warn!("Failed to identify {} switch core: {err}", chip.family());
                None
            }
        };

        for device in chip.devices() {
            debug!("Registering {device}");
        }

        Self {
            chip,
            identity,
            map,
        }
    }

    /// Bind the switch core's pin controller
    pub fn into_pinctrl(self) -> Result<Pinctrl<M>, Error> {
        Pinctrl::bind(self.chip.pinctrl_config(), self.map)
    }
}

impl<M> Switchcore<M> {
    pub fn chip(&self) -> Chip {
        self.chip
    }

    /// The identity read while probing, unless the registers could not be
    /// read
    pub fn identity(&self) -> Option<&ChipIdentity> {
        self.identity.as_ref()
    }

    /// Devices sharing the register space
    pub fn devices(&self) -> &'static [DeviceCell] {
        self.chip.devices()
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut M {
        &mut self.map
    }

    pub fn into_inner(self) -> M {
        self.map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::RegmapError, pinctrl::PinctrlOps, regmap::memory::MemoryMap};

    struct Broken;

    impl RegisterMap for Broken {
        fn read(&mut self, offset: u32) -> Result<u32, RegmapError> {
            Err(RegmapError::Io {
                offset,
                source: std::io::ErrorKind::BrokenPipe.into(),
            })
        }

        fn write(&mut self, offset: u32, _value: u32) -> Result<(), RegmapError> {
            self.read(offset).map(drop)
        }
    }

    #[test]
    fn probe_by_compatible() {
        let map = MemoryMap::new()
            .with_registers([(0x00d4, 0x8382_0000), (0x00d8, 0x0002_1234)])
            .with_read_only(0x00d8, 0x0fff_ffff);
        let switchcore = Switchcore::probe("realtek,maple-switchcore", map).unwrap();

        assert_eq!(switchcore.chip(), Chip::Maple);
        assert_eq!(
            switchcore.identity().map(ToString::to_string).as_deref(),
            Some("RTL8382 rev. B, RL:1234")
        );
        assert_eq!(switchcore.devices().len(), 3);
    }

    #[test]
    fn unknown_compatible() {
        assert!(matches!(
            Switchcore::probe("realtek,mango-switchcore", MemoryMap::new()),
            Err(Error::UnknownCompatible(_))
        ));
    }

    #[test]
    fn unreadable_identity_is_not_fatal() {
        let switchcore = Switchcore::probe_chip(Chip::Cypress, Broken);

        assert!(switchcore.identity().is_none());
    }

    #[test]
    fn unknown_model_is_not_fatal() {
        let map = MemoryMap::new().with_register(0x0ff0, 0x8380_0000);
        let switchcore = Switchcore::probe_chip(Chip::Cypress, map);

        let identity = switchcore.identity().unwrap();
        assert!(!Chip::Cypress.is_known(identity));

        let pinctrl = switchcore.into_pinctrl().unwrap();
        assert_eq!(pinctrl.group_count(), 3);
    }

    #[test]
    fn pinctrl_binding_failure() {
        // Too small to hold any of the mux fields
        let switchcore = Switchcore::probe_chip(Chip::Maple, MemoryMap::with_size(0x100));

        assert!(matches!(
            switchcore.into_pinctrl(),
            Err(Error::Binding { .. })
        ));
    }
}
