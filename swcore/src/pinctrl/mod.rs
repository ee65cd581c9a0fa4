//! Switch core pin control
//!
//! Pins are frequently muxed between alternative functions, but the control
//! bits for the muxes are scattered throughout the switch core's register
//! space. Each mux field is described by a [MuxDesc] (a "group"), which lists
//! the pins it controls. A [FunctionDesc] lists, for every group the function
//! can be enabled on, the value to write into that group's field.
//!
//! A [SwcoreConfig] ties the pins, groups and functions of one chip family
//! together. Tables are static; functions refer to groups by their index in
//! the table ([GroupId]) rather than by name, so two groups can never be
//! confused even if they were to share a name.

use std::collections::HashSet;

use crate::{error::ConfigError, regmap::RegField, Error};

pub use self::{
    device::PinctrlDevice,
    engine::Pinctrl,
    ops::{PinctrlOps, PinmuxOps},
};

mod device;
mod engine;
mod ops;

/// A physical (or virtual) pin of the package
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinDesc {
    pub number: u32,
    pub name: &'static str,
}

impl PinDesc {
    pub const fn new(number: u32, name: &'static str) -> Self {
        Self { number, name }
    }
}

/// Index of a group within its [SwcoreConfig]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub usize);

/// A mux field and the pins it controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MuxDesc {
    pub name: &'static str,
    pub field: RegField,
    pub pins: &'static [u32],
}

impl MuxDesc {
    pub const fn new(name: &'static str, field: RegField, pins: &'static [u32]) -> Self {
        Self { name, field, pins }
    }
}

/// Value to write into a group's field to enable a function on it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MuxConfig {
    pub group: GroupId,
    pub setting: u32,
    /// Whether the setting has been confirmed on hardware
    pub verified: bool,
}

impl MuxConfig {
    pub const fn new(group: GroupId, setting: u32) -> Self {
        Self {
            group,
            setting,
            verified: true,
        }
    }

    /// A setting taken over from vendor code whose pin correspondence has not
    /// been confirmed
    pub const fn unverified(group: GroupId, setting: u32) -> Self {
        Self {
            group,
            setting,
            verified: false,
        }
    }
}

/// A pin function and the groups it can be enabled on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionDesc {
    pub name: &'static str,
    pub configs: &'static [MuxConfig],
}

impl FunctionDesc {
    pub const fn new(name: &'static str, configs: &'static [MuxConfig]) -> Self {
        Self { name, configs }
    }

    /// The first configuration of this function for `group`
    pub fn config_for(&self, group: GroupId) -> Option<&MuxConfig> {
        self.configs.iter().find(|config| config.group == group)
    }
}

/// Names of the groups a function can be enabled on, in configuration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionGroups {
    pub name: &'static str,
    pub groups: Vec<&'static str>,
}

/// Pin control description of one switch core family
#[derive(Debug)]
pub struct SwcoreConfig {
    pub pins: &'static [PinDesc],
    pub groups: &'static [MuxDesc],
    pub functions: &'static [FunctionDesc],
}

impl SwcoreConfig {
    pub fn group(&self, id: GroupId) -> Option<&'static MuxDesc> {
        self.groups.get(id.0)
    }

    pub fn pin(&self, number: u32) -> Option<&'static PinDesc> {
        self.pins.iter().find(|pin| pin.number == number)
    }

    /// Names of the groups containing `pin`
    pub fn pin_groups(&self, pin: u32) -> impl Iterator<Item = &'static str> + '_ {
        self.groups
            .iter()
            .filter(move |group| group.pins.contains(&pin))
            .map(|group| group.name)
    }

    /// Generate the group list of every function
    ///
    /// The lists follow the order of each function's configurations, so the
    /// n-th group name of a function is the group of its n-th configuration.
    pub fn function_groups(&self) -> Vec<FunctionGroups> {
        self.functions
            .iter()
            .map(|function| FunctionGroups {
                name: function.name,
                groups: function
                    .configs
                    .iter()
                    .filter_map(|config| self.group(config.group))
                    .map(|group| group.name)
                    .collect(),
            })
            .collect()
    }

    /// Check the table for authoring defects
    pub fn validate(&self) -> Result<(), Error> {
        let mut errors = Vec::new();

        let mut pins = HashSet::new();
        for pin in self.pins {
            if !pins.insert(pin.number) {
                errors.push(ConfigError::DuplicatePin(pin.number));
            }
        }

        let mut group_names = HashSet::new();
        for group in self.groups {
            if !group_names.insert(group.name) {
                errors.push(ConfigError::DuplicateGroup(group.name));
            }
            if !group.field.is_valid() {
                errors.push(ConfigError::InvalidField {
                    group: group.name,
                    field: group.field,
                });
            }
            if group.pins.is_empty() {
                errors.push(ConfigError::EmptyGroup(group.name));
            }
            for &pin in group.pins {
                if !pins.contains(&pin) {
                    errors.push(ConfigError::UnknownPin {
                        group: group.name,
                        pin,
                    });
                }
            }
        }

        let mut function_names = HashSet::new();
        for function in self.functions {
            if !function_names.insert(function.name) {
                errors.push(ConfigError::DuplicateFunction(function.name));
            }
            if function.configs.is_empty() {
                errors.push(ConfigError::EmptyFunction(function.name));
            }

            let mut configured = HashSet::new();
            for config in function.configs {
                let Some(group) = self.group(config.group) else {
                    errors.push(ConfigError::DanglingGroup {
                        function: function.name,
                        index: config.group.0,
                    });
                    continue;
                };

                if !configured.insert(config.group) {
                    errors.push(ConfigError::DuplicateConfig {
                        function: function.name,
                        group: group.name,
                    });
                }
                if group.field.is_valid() && config.setting > group.field.max_value() {
                    errors.push(ConfigError::SettingOutOfRange {
                        function: function.name,
                        group: group.name,
                        setting: config.setting,
                        max: group.field.max_value(),
                    });
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::InvalidConfig(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    static PINS: &[PinDesc] = &[
        PinDesc::new(1, "GPIO1"),
        PinDesc::new(2, "GPIO2"),
        PinDesc::new(2, "GPIO2_AGAIN"),
    ];

    static GROUPS: &[MuxDesc] = &[
        MuxDesc::new("led", RegField::new(0x0, 0, 0), &[1]),
        MuxDesc::new("uart", RegField::new(0x0, 1, 2), &[2, 3]),
        MuxDesc::new("led", RegField::new(0x4, 2, 1), &[]),
    ];

    static FUNCTIONS: &[FunctionDesc] = &[
        FunctionDesc::new("gpio", &[MuxConfig::new(GroupId(0), 0), MuxConfig::new(GroupId(1), 4)]),
        FunctionDesc::new("uart", &[MuxConfig::new(GroupId(1), 1), MuxConfig::new(GroupId(1), 2)]),
        FunctionDesc::new("ghost", &[MuxConfig::new(GroupId(7), 1)]),
        FunctionDesc::new("gpio", &[]),
    ];

    static BROKEN: SwcoreConfig = SwcoreConfig {
        pins: PINS,
        groups: GROUPS,
        functions: FUNCTIONS,
    };

    #[test]
    fn validate_reports_every_defect() {
        let Err(Error::InvalidConfig(errors)) = BROKEN.validate() else {
            panic!("broken table passed validation");
        };

        assert_eq!(
            errors,
            vec![
                ConfigError::DuplicatePin(2),
                ConfigError::UnknownPin {
                    group: "uart",
                    pin: 3
                },
                ConfigError::DuplicateGroup("led"),
                ConfigError::InvalidField {
                    group: "led",
                    field: RegField::new(0x4, 2, 1)
                },
                ConfigError::EmptyGroup("led"),
                ConfigError::SettingOutOfRange {
                    function: "gpio",
                    group: "uart",
                    setting: 4,
                    max: 3
                },
                ConfigError::DuplicateConfig {
                    function: "uart",
                    group: "uart"
                },
                ConfigError::DanglingGroup {
                    function: "ghost",
                    index: 7
                },
                ConfigError::DuplicateFunction("gpio"),
                ConfigError::EmptyFunction("gpio"),
            ]
        );
    }

    #[test]
    fn first_matching_config_wins() {
        let uart = &FUNCTIONS[1];

        assert_eq!(uart.config_for(GroupId(1)).map(|c| c.setting), Some(1));
        assert_eq!(uart.config_for(GroupId(0)), None);
    }

    #[test]
    fn function_groups_follow_config_order() {
        let groups = BROKEN.function_groups();

        assert_eq!(groups[0].groups, vec!["led", "uart"]);
        assert_eq!(groups[1].groups, vec!["uart", "uart"]);
        // Dangling references have no name to project onto
        assert!(groups[2].groups.is_empty());
    }

    #[test]
    fn pin_lookup() {
        assert_eq!(BROKEN.pin(1).map(|pin| pin.name), Some("GPIO1"));
        assert_eq!(BROKEN.pin(5), None);
        assert_eq!(BROKEN.pin_groups(2).collect::<Vec<_>>(), vec!["uart"]);
    }
}
