//! Command-line interface definitions.

mod run;
mod status;

use clap::{Parser, Subcommand};

pub use run::execute as run_engine;
pub use status::execute as show_status;

/// arby - cross-exchange cryptocurrency arbitrage engine.
#[derive(Parser, Debug)]
#[command(name = "arby")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the scanner and, outside dry-run, the execution workers.
    Run,

    /// Print a one-shot snapshot of the last running engine's status and exit.
    Status,
}
