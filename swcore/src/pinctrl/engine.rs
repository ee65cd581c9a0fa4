use log::{debug, error, warn};

use super::{FunctionGroups, GroupId, PinctrlOps, PinmuxOps, SwcoreConfig};
use crate::{
    error::SelectorKind,
    regmap::{FieldAccessor, RegisterMap},
    Error,
};

/// A switch core pin controller bound to a register map
///
/// Construction through [Pinctrl::bind] acquires a field accessor for every
/// group and generates the function group lists up front; a `Pinctrl` that
/// exists is ready to accept mux requests.
#[derive(Debug)]
pub struct Pinctrl<M> {
    config: &'static SwcoreConfig,
    map: M,
    fields: Vec<FieldAccessor>,
    functions: Vec<FunctionGroups>,
}

impl<M: RegisterMap> Pinctrl<M> {
    /// Bind the groups of `config` to `map`
    ///
    /// Fails if the table is malformed or if any of its fields can not be
    /// bound; no controller is created in that case.
    pub fn bind(config: &'static SwcoreConfig, map: M) -> Result<Self, Error> {
        config.validate()?;

        let fields = config
            .groups
            .iter()
            .map(|group| {
                map.field(group.field).map_err(|source| Error::Binding {
                    group: group.name.to_string(),
                    field: group.field,
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        for (group, field) in config.groups.iter().zip(&fields) {
            debug!("Bound group '{}' to {}", group.name, field.field());
        }

        Ok(Self {
            config,
            map,
            fields,
            functions: config.function_groups(),
        })
    }

    /// Read the value currently held by a group's field
    pub fn current_setting(&mut self, group: usize) -> Result<u32, Error> {
        let field = self.fields.get(group).ok_or(Error::InvalidSelector {
            kind: SelectorKind::Group,
            selector: group,
            count: self.fields.len(),
        })?;

        Ok(field.read(&mut self.map)?)
    }

    /// The first function whose configuration for `group` matches the
    /// group's current setting
    pub fn active_function(&mut self, group: usize) -> Result<Option<&'static str>, Error> {
        let setting = self.current_setting(group)?;

        Ok(self
            .config
            .functions
            .iter()
            .find(|function| {
                function
                    .config_for(GroupId(group))
                    .is_some_and(|config| config.setting == setting)
            })
            .map(|function| function.name))
    }
}

impl<M> Pinctrl<M> {
    /// The chip configuration table this controller was bound with
    pub fn config(&self) -> &'static SwcoreConfig {
        self.config
    }

    /// Generated group lists of all functions, by function selector
    pub fn functions(&self) -> &[FunctionGroups] {
        &self.functions
    }

    /// Look up the selector of a group by name
    pub fn group_selector(&self, name: &str) -> Option<usize> {
        self.config.groups.iter().position(|group| group.name == name)
    }

    /// Look up the selector of a function by name
    pub fn function_selector(&self, name: &str) -> Option<usize> {
        self.functions
            .iter()
            .position(|function| function.name == name)
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut M {
        &mut self.map
    }

    /// Release the register map
    pub fn into_inner(self) -> M {
        self.map
    }
}

impl<M> PinctrlOps for Pinctrl<M> {
    fn group_count(&self) -> usize {
        self.config.groups.len()
    }

    fn group_name(&self, selector: usize) -> &'static str {
        self.config.groups[selector].name
    }

    fn group_pins(&self, selector: usize) -> &'static [u32] {
        self.config.groups[selector].pins
    }
}

impl<M: RegisterMap> PinmuxOps for Pinctrl<M> {
    const STRICT: bool = true;

    fn function_count(&self) -> usize {
        self.config.functions.len()
    }

    fn function_name(&self, selector: usize) -> &'static str {
        self.config.functions[selector].name
    }

    fn function_groups(&self, selector: usize) -> &[&'static str] {
        &self.functions[selector].groups
    }

    fn set_mux(&mut self, function: usize, group: usize) -> Result<(), Error> {
        let function_desc = self
            .config
            .functions
            .get(function)
            .ok_or(Error::InvalidSelector {
                kind: SelectorKind::Function,
                selector: function,
                count: self.config.functions.len(),
            })?;
        let group_desc = self.config.groups.get(group).ok_or(Error::InvalidSelector {
            kind: SelectorKind::Group,
            selector: group,
            count: self.config.groups.len(),
        })?;

        let Some(config) = function_desc.config_for(GroupId(group)) else {
            error!(
                "Function '{}' has no configuration for group '{}'",
                function_desc.name, group_desc.name
            );
            return Err(Error::NotFound {
                function: function_desc.name.to_string(),
                group: group_desc.name.to_string(),
            });
        };

        if !config.verified {
            warn!(
                "Setting {:#x} of function '{}' on group '{}' is unverified",
                config.setting, function_desc.name, group_desc.name
            );
        }

        debug!(
            "Muxing group '{}' to '{}': {} = {:#x}",
            group_desc.name, function_desc.name, group_desc.field, config.setting
        );

        Ok(self.fields[group].write(&mut self.map, config.setting)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::RegmapError,
        pinctrl::{FunctionDesc, MuxConfig, MuxDesc, PinDesc},
        regmap::{memory::MemoryMap, RegField},
    };

    static PINS: &[PinDesc] = &[PinDesc::new(0, "A"), PinDesc::new(1, "B")];

    static GROUPS: &[MuxDesc] = &[
        MuxDesc::new("first", RegField::new(0x0, 0, 1), &[0]),
        MuxDesc::new("second", RegField::new(0x0, 4, 5), &[1]),
    ];

    static FUNCTIONS: &[FunctionDesc] = &[
        FunctionDesc::new("gpio", &[MuxConfig::new(GroupId(1), 0), MuxConfig::new(GroupId(0), 0)]),
        FunctionDesc::new("bus", &[MuxConfig::unverified(GroupId(0), 3)]),
        FunctionDesc::new("bus-alt", &[MuxConfig::new(GroupId(0), 3)]),
    ];

    static CONFIG: SwcoreConfig = SwcoreConfig {
        pins: PINS,
        groups: GROUPS,
        functions: FUNCTIONS,
    };

    static FAR_GROUPS: &[MuxDesc] = &[
        MuxDesc::new("near", RegField::new(0x0, 0, 0), &[0]),
        MuxDesc::new("far", RegField::new(0x100, 0, 0), &[1]),
    ];

    static FAR: SwcoreConfig = SwcoreConfig {
        pins: PINS,
        groups: FAR_GROUPS,
        functions: &[],
    };

    #[test]
    fn binding_fails_as_a_whole() {
        let err = Pinctrl::bind(&FAR, MemoryMap::with_size(0x10)).unwrap_err();

        match err {
            Error::Binding {
                group,
                field,
                source: RegmapError::OutOfRange { offset, .. },
            } => {
                assert_eq!(group, "far");
                assert_eq!(field, RegField::new(0x100, 0, 0));
                assert_eq!(offset, 0x100);
            }
            err => panic!("unexpected error: {err:?}"),
        }
    }

    #[test]
    fn set_mux_writes_the_matching_field() {
        let mut pinctrl = Pinctrl::bind(&CONFIG, MemoryMap::new()).unwrap();

        pinctrl.set_mux(1, 0).unwrap();
        assert_eq!(pinctrl.map().get(0x0), 0b11);

        pinctrl.set_mux(0, 0).unwrap();
        assert_eq!(pinctrl.map().get(0x0), 0b00);
    }

    #[test]
    fn set_mux_without_config_writes_nothing() {
        let mut pinctrl = Pinctrl::bind(&CONFIG, MemoryMap::new().with_register(0x0, 0x30)).unwrap();

        let err = pinctrl.set_mux(1, 1).unwrap_err();
        assert!(matches!(
            err,
            Error::NotFound { ref function, ref group } if function == "bus" && group == "second"
        ));
        assert!(pinctrl.map().writes().is_empty());
        assert_eq!(pinctrl.map().get(0x0), 0x30);
    }

    #[test]
    fn out_of_range_selectors() {
        let mut pinctrl = Pinctrl::bind(&CONFIG, MemoryMap::new()).unwrap();

        assert!(matches!(
            pinctrl.set_mux(3, 0),
            Err(Error::InvalidSelector {
                kind: SelectorKind::Function,
                selector: 3,
                count: 3
            })
        ));
        assert!(matches!(
            pinctrl.set_mux(0, 2),
            Err(Error::InvalidSelector {
                kind: SelectorKind::Group,
                ..
            })
        ));
        assert!(pinctrl.current_setting(2).is_err());
        assert!(pinctrl.map().writes().is_empty());
    }

    #[test]
    #[should_panic]
    fn group_name_out_of_range_panics() {
        let pinctrl = Pinctrl::bind(&CONFIG, MemoryMap::new()).unwrap();
        pinctrl.group_name(2);
    }

    #[test]
    fn active_function_reads_back() {
        let mut pinctrl = Pinctrl::bind(&CONFIG, MemoryMap::new()).unwrap();

        // Both functions configure the same value, the first one is reported
        pinctrl.set_mux(2, 0).unwrap();
        assert_eq!(pinctrl.current_setting(0).unwrap(), 3);
        assert_eq!(pinctrl.active_function(0).unwrap(), Some("bus"));

        pinctrl.map_mut().write(0x0, 0x20).unwrap();
        assert_eq!(pinctrl.active_function(1).unwrap(), None);
        assert_eq!(pinctrl.active_function(0).unwrap(), Some("gpio"));
    }

    #[test]
    fn selectors_by_name() {
        let pinctrl = Pinctrl::bind(&CONFIG, MemoryMap::new()).unwrap();

        assert_eq!(pinctrl.function_selector("bus-alt"), Some(2));
        assert_eq!(pinctrl.group_selector("second"), Some(1));
        assert_eq!(pinctrl.group_selector("third"), None);
        assert_eq!(pinctrl.function_groups(0), &["second", "first"]);
        assert!(<Pinctrl<MemoryMap> as PinmuxOps>::STRICT);
    }
}
