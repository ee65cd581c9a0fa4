use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use log::debug;
use miette::Result;
use swcore::{
    cli::{
        self, config::Config, print_functions, print_groups, print_identity, print_pins,
        print_status, ChipArgs,
    },
    logging::{initialize_logger, verbosity_filter},
};

#[derive(Debug, Parser)]
#[command(about, max_term_width = 100, propagate_version = true, version)]
struct Cli {
    #[command(subcommand)]
    subcommand: Commands,

    #[command(flatten)]
    chip_args: ChipArgs,

    /// Configuration file to use instead of searching for swcore.toml
    #[arg(long, global = true, env = "SWCORE_CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity, may be repeated
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Identify the switch core and list the devices inside it
    Identify,
    /// List the pins of the switch core's pin controller
    Pins,
    /// List the pin groups and their mux fields
    Groups,
    /// List the pin functions and the groups they can be enabled on
    Functions,
    /// Enable a pin function on a group
    SetMux(SetMuxArgs),
    /// Show the current setting of every group
    Status,
}

#[derive(Debug, Args)]
struct SetMuxArgs {
    /// Function to enable
    function: String,
    /// Group to enable the function on
    group: String,
}

fn main() -> Result<()> {
    miette::set_panic_hook();

    let args = Cli::parse();
    initialize_logger(verbosity_filter(args.verbose, args.quiet));
    debug!("{:#?}", args);

    // Load any user configuration, if present.
    let config = Config::load(args.config.as_deref())?;

    match args.subcommand {
        Commands::Identify => {
            print_identity(&cli::probe(&args.chip_args, &config)?);
            Ok(())
        }
        Commands::Pins => {
            print_pins(cli::tables(&args.chip_args, &config)?);
            Ok(())
        }
        Commands::Groups => {
            print_groups(cli::tables(&args.chip_args, &config)?);
            Ok(())
        }
        Commands::Functions => {
            print_functions(cli::tables(&args.chip_args, &config)?);
            Ok(())
        }
        Commands::SetMux(mux) => {
            let pinctrl = cli::probe(&args.chip_args, &config)?.into_pinctrl()?;
            cli::set_mux(pinctrl, &mux.function, &mux.group)
        }
        Commands::Status => {
            let mut pinctrl = cli::probe(&args.chip_args, &config)?.into_pinctrl()?;
            print_status(&mut pinctrl)
        }
    }
}
