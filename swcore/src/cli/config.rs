//! Command-line interface configuration
//!
//! The `swcore` binary reads an optional `swcore.toml`, which selects the
//! switch core and describes how its registers are reached:
//!
//! ```toml
//! compatible = "realtek,maple-switchcore"
//!
//! [transport]
//! kind = "memory"
//!
//! [registers]
//! "0x00d4" = "0x83806800"
//!
//! [read-only]
//! "0x00d8" = "0x0fffffff"
//! ```
//!
//! Offsets and values may be given as hex strings or as TOML integers.

use std::{
    collections::BTreeMap,
    fs::read_to_string,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::debug;
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{de::Error as _, Deserialize, Deserializer};

#[cfg(unix)]
use crate::regmap::devmem::{Endianness, DEV_MEM, SWITCHCORE_BASE};
use crate::{regmap::memory::MemoryMap, Error};

/// Name of the configuration file
pub const CONFIG_FILE: &str = "swcore.toml";

const KNOWN_KEYS: &[&str] = &["compatible", "transport", "registers", "read-only"];

/// Register access configuration
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Transport {
    /// Simulated registers, seeded from the configuration file
    #[default]
    Memory,
    /// Physical memory
    #[cfg(unix)]
    Devmem {
        #[serde(default = "default_path")]
        path: PathBuf,
        #[serde(default = "default_base", deserialize_with = "deserialize_hex")]
        base: u64,
        #[serde(default)]
        endianness: Endianness,
        #[serde(default, deserialize_with = "deserialize_optional_hex")]
        size: Option<u32>,
    },
}

/// Contents of the configuration file
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Compatible string of the switch core
    #[serde(default)]
    pub compatible: Option<String>,
    #[serde(default)]
    pub transport: Transport,
    /// Initial register values of the memory transport
    #[serde(default, deserialize_with = "deserialize_register_table")]
    pub registers: BTreeMap<u32, u32>,
    /// Read-only bits of the memory transport's registers
    #[serde(
        default,
        rename = "read-only",
        deserialize_with = "deserialize_register_table"
    )]
    pub read_only: BTreeMap<u32, u32>,
    /// File the configuration was loaded from
    #[serde(skip)]
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load the configuration
    ///
    /// An explicitly given path must exist. Otherwise the working directory
    /// and then the user's configuration directory are searched, and the
    /// default configuration is used if neither holds a configuration file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::find() {
                Some(path) => path,
                None => {
                    debug!("No configuration file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let raw = read_to_string(&path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read configuration file {}", path.display()))?;

        let mut config = Self::parse(&raw)
            .wrap_err_with(|| format!("Failed to parse configuration file {}", path.display()))?;
        config.path = Some(path);
        debug!("Config: {:#?}", config);

        Ok(config)
    }

    /// Parse the contents of a configuration file
    pub fn parse(raw: &str) -> Result<Self> {
        let table = toml::from_str::<toml::Table>(raw).into_diagnostic()?;
        Self::validate_keys(&table)?;

        toml::from_str(raw).into_diagnostic()
    }

    /// Candidate locations of the configuration file, in search order
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];
        if let Some(dirs) = ProjectDirs::from("rs", "realtek", "swcore") {
            paths.push(dirs.config_dir().join(CONFIG_FILE));
        }

        paths
    }

    fn find() -> Option<PathBuf> {
        Self::search_paths().into_iter().find(|path| path.is_file())
    }

    fn validate_keys(table: &toml::Table) -> Result<(), Error> {
        match table.keys().find(|key| !KNOWN_KEYS.contains(&key.as_str())) {
            Some(key) => Err(Error::UnknownConfigKey(key.clone())),
            None => Ok(()),
        }
    }

    /// Memory transport seeded with the configured registers
    pub fn memory_map(&self) -> MemoryMap {
        self.read_only.iter().fold(
            MemoryMap::new().with_registers(self.registers.clone()),
            |map, (&offset, &mask)| map.with_read_only(offset, mask),
        )
    }
}

#[cfg(unix)]
fn default_path() -> PathBuf {
    PathBuf::from(DEV_MEM)
}

#[cfg(unix)]
fn default_base() -> u64 {
    SWITCHCORE_BASE
}

/// An integer given either as a TOML integer or as a string
#[derive(Deserialize)]
#[serde(untagged)]
enum Number {
    Integer(u64),
    String(String),
}

impl Number {
    fn parse<E: serde::de::Error>(self) -> Result<u64, E> {
        match self {
            Number::Integer(value) => Ok(value),
            Number::String(value) => parse_hex(&value).map_err(E::custom),
        }
    }
}

/// Parse a hexadecimal number, with or without a `0x` prefix
pub fn parse_hex(value: &str) -> Result<u64, std::num::ParseIntError> {
    let value = value.trim().to_lowercase();
    let digits = value.trim_start_matches("0x").replace('_', "");

    u64::from_str_radix(&digits, 16)
}

fn narrow<E: serde::de::Error>(value: u64) -> Result<u32, E> {
    u32::try_from(value).map_err(|_| E::custom(format!("{value:#x} does not fit in 32 bits")))
}

#[cfg(unix)]
fn deserialize_hex<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Number::deserialize(deserializer)?.parse()
}

#[cfg(unix)]
fn deserialize_optional_hex<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Number::deserialize(deserializer)?.parse::<D::Error>()?;

    narrow(value).map(Some)
}

fn deserialize_register_table<'de, D>(deserializer: D) -> Result<BTreeMap<u32, u32>, D::Error>
where
    D: Deserializer<'de>,
{
    BTreeMap::<String, Number>::deserialize(deserializer)?
        .into_iter()
        .map(|(offset, value)| -> Result<(u32, u32), D::Error> {
            let offset = parse_hex(&offset).map_err(D::Error::custom)?;
            let value = value.parse::<D::Error>()?;

            Ok((narrow::<D::Error>(offset)?, narrow::<D::Error>(value)?))
        })
        .collect()
}
