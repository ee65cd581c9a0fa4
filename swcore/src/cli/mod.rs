//! Types and functions for the command-line interface
//!
//! No stability guaranties apply

use clap::Args;
use comfy_table::{modifiers, presets::UTF8_FULL, Attribute, Cell, Color, Table};
use log::debug;
use miette::{Result, WrapErr};

use self::config::{Config, Transport};
#[cfg(unix)]
use crate::regmap::devmem::DevMem;
use crate::{
    error::Error,
    pinctrl::{Pinctrl, PinctrlDevice, PinctrlOps, SwcoreConfig},
    regmap::RegisterMap,
    switchcore::Switchcore,
    targets::Chip,
};

pub mod config;

/// Register map selected by the configuration
pub type DynMap = Box<dyn RegisterMap + Send>;

/// Switch core selection
#[derive(Debug, Args)]
#[non_exhaustive]
pub struct ChipArgs {
    /// Switch core family
    #[arg(short = 'c', long, global = true, conflicts_with = "compatible")]
    pub chip: Option<Chip>,
    /// Compatible string of the switch core or its pin controller
    #[arg(long, global = true)]
    pub compatible: Option<String>,
}

/// Select the chip family from the command line, falling back to the
/// configuration file
pub fn resolve_chip(args: &ChipArgs, config: &Config) -> Result<Chip> {
    if let Some(chip) = args.chip {
        return Ok(chip);
    }

    let compatible = args
        .compatible
        .as_deref()
        .or(config.compatible.as_deref())
        .ok_or(Error::ChipNotProvided)?;

    Ok(Chip::from_compatible(compatible)?)
}

/// Open the register map described by the configuration
pub fn connect(config: &Config) -> Result<DynMap> {
    match &config.transport {
        Transport::Memory => {
            debug!("Using simulated registers");
            Ok(Box::new(config.memory_map()))
        }
        #[cfg(unix)]
        Transport::Devmem {
            path,
            base,
            endianness,
            size,
        } => {
            debug!("Using {} at {base:#x} ({endianness} endian)", path.display());

            let map = DevMem::open(path, *base)?.with_endianness(*endianness);
            Ok(Box::new(match size {
                Some(size) => map.with_size(*size),
                None => map,
            }))
        }
    }
}

/// Resolve the chip and check its pin control table, without touching any
/// registers
pub fn tables(args: &ChipArgs, config: &Config) -> Result<&'static SwcoreConfig> {
    let chip = resolve_chip(args, config)?;
    let tables = chip.pinctrl_config();
    tables.validate()?;

    Ok(tables)
}

/// Resolve the chip, connect to it and probe it
pub fn probe(args: &ChipArgs, config: &Config) -> Result<Switchcore<DynMap>> {
    let chip = resolve_chip(args, config)?;
    let map = connect(config)?;

    Ok(Switchcore::probe_chip(chip, map))
}

/// Print the identity of a probed switch core and its devices
pub fn print_identity<M>(switchcore: &Switchcore<M>) {
    let chip = switchcore.chip();

    println!("Family:     {} ({chip})", chip.family());
    match switchcore.identity() {
        Some(identity) if chip.is_known(identity) => println!("Chip:       {identity}"),
        Some(identity) => println!("Chip:       {identity} (unrecognized)"),
        None => println!("Chip:       unknown"),
    }
    println!("Compatible: {}", chip.compatible());
    println!("Devices:");
    for device in switchcore.devices() {
        println!("  {device}");
    }
}

fn table(header: &[(&str, Color)]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .set_header(header.iter().map(|&(name, color)| {
            Cell::new(name).fg(color).add_attribute(Attribute::Bold)
        }));

    table
}

/// Print every pin and the groups it belongs to
pub fn print_pins(config: &SwcoreConfig) {
    let mut table = table(&[
        ("Pin", Color::Red),
        ("Name", Color::Green),
        ("Groups", Color::Cyan),
    ]);

    for pin in config.pins {
        let groups = config.pin_groups(pin.number).collect::<Vec<_>>();
        table.add_row(vec![
            Cell::new(pin.number).fg(Color::Red),
            Cell::new(pin.name).fg(Color::Green),
            Cell::new(groups.join(", ")).fg(Color::Cyan),
        ]);
    }

    println!("{table}");
}

/// Print every group with its mux field and pins
pub fn print_groups(config: &SwcoreConfig) {
    let mut table = table(&[
        ("Group", Color::Cyan),
        ("Field", Color::Yellow),
        ("Pins", Color::Red),
        ("Functions", Color::Magenta),
    ]);
    let functions = config.function_groups();

    for group in config.groups {
        let pins = group.pins.iter().map(ToString::to_string).collect::<Vec<_>>();
        let functions = functions
            .iter()
            .filter(|function| function.groups.contains(&group.name))
            .map(|function| function.name)
            .collect::<Vec<_>>();

        table.add_row(vec![
            Cell::new(group.name).fg(Color::Cyan),
            Cell::new(group.field).fg(Color::Yellow),
            Cell::new(pins.join(", ")).fg(Color::Red),
            Cell::new(functions.join(", ")).fg(Color::Magenta),
        ]);
    }

    println!("{table}");
}

/// Print every function and the groups it can be enabled on
pub fn print_functions(config: &SwcoreConfig) {
    let mut table = table(&[("Function", Color::Magenta), ("Groups", Color::Cyan)]);

    for function in config.function_groups() {
        table.add_row(vec![
            Cell::new(function.name).fg(Color::Magenta),
            Cell::new(function.groups.join(", ")).fg(Color::Cyan),
        ]);
    }

    println!("{table}");
}

/// Print the current setting of every group
pub fn print_status<M: RegisterMap>(pinctrl: &mut Pinctrl<M>) -> Result<()> {
    let mut table = table(&[
        ("Group", Color::Cyan),
        ("Field", Color::Yellow),
        ("Setting", Color::Red),
        ("Function", Color::Magenta),
    ]);

    for selector in 0..pinctrl.group_count() {
        let field = pinctrl.config().groups[selector].field;
        let setting = pinctrl.current_setting(selector)?;
        let function = pinctrl.active_function(selector)?;

        table.add_row(vec![
            Cell::new(pinctrl.group_name(selector)).fg(Color::Cyan),
            Cell::new(field).fg(Color::Yellow),
            Cell::new(format!("{setting:#x}")).fg(Color::Red),
            Cell::new(function.unwrap_or("-")).fg(Color::Magenta),
        ]);
    }

    println!("{table}");

    Ok(())
}

/// Enable `function` on `group` and report the register change
pub fn set_mux<M: RegisterMap>(pinctrl: Pinctrl<M>, function: &str, group: &str) -> Result<()> {
    let device = PinctrlDevice::from(pinctrl);

    let (offset, before) = device.with(|pinctrl| {
        let offset = pinctrl
            .group_selector(group)
            .map(|selector| pinctrl.config().groups[selector].field.offset);

        match offset {
            Some(offset) => pinctrl.map_mut().read(offset).map(|value| (offset, Some(value))),
            None => Ok((0, None)),
        }
    })?;

    device
        .select(function, group)
        .wrap_err_with(|| format!("Failed to mux group '{group}' to function '{function}'"))?;

    let after = device.with(|pinctrl| pinctrl.map_mut().read(offset))?;

    if let Some(before) = before {
        println!("{offset:#06x}: {before:#010x} -> {after:#010x}");
    }

    Ok(())
}
