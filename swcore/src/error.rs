//! Library and application errors

use std::{fmt::Display, io};

use miette::Diagnostic;
use thiserror::Error;

use crate::{regmap::RegField, targets::Chip};

/// All possible errors returned by swcore
#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Unrecognized compatible string: {0}")]
    #[diagnostic(
        code(swcore::unknown_compatible),
        help("Supported compatible strings are: {}", Chip::compatibles().join(", "))
    )]
    UnknownCompatible(String),

    #[error("No switch core was specified")]
    #[diagnostic(
        code(swcore::chip_not_provided),
        help("Provide the `-c/--chip` or `--compatible` option, or set `compatible` in the configuration file")
    )]
    ChipNotProvided,

    #[error("Function '{function}' has no configuration for group '{group}'")]
    #[diagnostic(
        code(swcore::pinmux::not_found),
        help("The function's group list is generated from the same table, so this points to a defect in the chip configuration table")
    )]
    NotFound { function: String, group: String },

    #[error("Invalid {kind} selector {selector}, only {count} are available")]
    #[diagnostic(code(swcore::pinmux::invalid_selector))]
    InvalidSelector {
        kind: SelectorKind,
        selector: usize,
        count: usize,
    },

    #[error("Unknown pin function '{0}'")]
    #[diagnostic(
        code(swcore::pinmux::unknown_function),
        help("Use the `functions` command to list the functions of this switch core")
    )]
    UnknownFunction(String),

    #[error("Unknown pin group '{0}'")]
    #[diagnostic(
        code(swcore::pinmux::unknown_group),
        help("Use the `groups` command to list the pin groups of this switch core")
    )]
    UnknownGroup(String),

    #[error("Function '{function}' can not be muxed onto group '{group}'")]
    #[diagnostic(
        code(swcore::pinmux::group_not_in_function),
        help("Function '{function}' is available on: {available}")
    )]
    GroupNotInFunction {
        function: String,
        group: String,
        available: String,
    },

    #[error("Failed to bind mux field {field} of group '{group}'")]
    #[diagnostic(code(swcore::pinctrl::binding))]
    Binding {
        group: String,
        field: RegField,
        #[source]
        source: RegmapError,
    },

    #[error("Invalid chip configuration table: {}", join(.0))]
    #[diagnostic(code(swcore::pinctrl::invalid_config))]
    InvalidConfig(Vec<ConfigError>),

    #[error("Error while accessing the switch core registers")]
    #[diagnostic(transparent)]
    Register(#[from] RegmapError),

    #[error("Failed to open {0}")]
    #[diagnostic(
        code(swcore::device_open),
        help("Accessing /dev/mem requires root privileges and a kernel without CONFIG_STRICT_DEVMEM")
    )]
    DeviceOpen(String, #[source] io::Error),

    #[cfg(feature = "cli")]
    #[error("Unknown key in configuration file: {0}")]
    #[diagnostic(code(swcore::cli::config_key))]
    UnknownConfigKey(String),
}

/// Register map access errors
#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum RegmapError {
    #[error("Register field {0} is malformed")]
    #[diagnostic(
        code(swcore::regmap::invalid_field),
        help("Fields must satisfy lsb <= msb <= 31")
    )]
    InvalidField(RegField),

    #[error("Register offset {offset:#06x} is not aligned to the {stride}-byte register stride")]
    #[diagnostic(code(swcore::regmap::unaligned))]
    Unaligned { offset: u32, stride: u32 },

    #[error("Register offset {offset:#06x} is beyond the end of the register map ({max:#06x})")]
    #[diagnostic(code(swcore::regmap::out_of_range))]
    OutOfRange { offset: u32, max: u32 },

    #[error("Register offset {offset:#06x} is outside the register map, which holds no registers")]
    #[diagnostic(
        code(swcore::regmap::empty),
        help("The register map must be at least one register stride in size")
    )]
    Empty { offset: u32 },

    #[error("I/O error while accessing register {offset:#06x}")]
    #[diagnostic(code(swcore::regmap::io))]
    Io {
        offset: u32,
        #[source]
        source: io::Error,
    },
}

impl RegmapError {
    /// Register offset the error refers to
    pub fn offset(&self) -> u32 {
        match self {
            RegmapError::InvalidField(field) => field.offset,
            RegmapError::Unaligned { offset, .. }
            | RegmapError::OutOfRange { offset, .. }
            | RegmapError::Empty { offset }
            | RegmapError::Io { offset, .. } => *offset,
        }
    }
}

/// Kind of selector passed to the pin controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SelectorKind {
    Function,
    Group,
}

/// Defects in a chip configuration table
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("group '{0}' has no pins")]
    EmptyGroup(&'static str),

    #[error("group '{group}' refers to undeclared pin {pin}")]
    UnknownPin { group: &'static str, pin: u32 },

    #[error("pin {0} is declared more than once")]
    DuplicatePin(u32),

    #[error("group name '{0}' is used more than once")]
    DuplicateGroup(&'static str),

    #[error("group '{group}' has a malformed field {field}")]
    InvalidField {
        group: &'static str,
        field: RegField,
    },

    #[error("function '{0}' has no configurations")]
    EmptyFunction(&'static str),

    #[error("function name '{0}' is used more than once")]
    DuplicateFunction(&'static str),

    #[error("function '{function}' refers to group #{index}, which does not exist")]
    DanglingGroup {
        function: &'static str,
        index: usize,
    },

    #[error("function '{function}' configures group '{group}' more than once")]
    DuplicateConfig {
        function: &'static str,
        group: &'static str,
    },

    #[error("function '{function}' writes {setting:#x} to group '{group}', which only holds up to {max:#x}")]
    SettingOutOfRange {
        function: &'static str,
        group: &'static str,
        setting: u32,
        max: u32,
    },
}

fn join<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
