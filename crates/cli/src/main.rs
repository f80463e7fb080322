//! `advisor` binary: local host adapter for the build advisor.
//!
//! Characters are read from JSON files, option catalogs from RON, and
//! identity records (history, anchors, pivot, advice) live in a file
//! repository under `ADVISOR_DATA_DIR` or the platform data directory.
//!
//! ```bash
//! advisor suggest --character pc.json --catalog data/catalog.ron --context level_up
//! advisor confirm --character pc.json --archetype warrior
//! advisor inspect --character pc
//! ```

mod commands;
mod context;
mod logging;
mod output;

use anyhow::Result;
use clap::Parser;
use commands::{Confirm, Inspect, Record, Reject, Snapshot, Suggest};
use context::GlobalArgs;

/// Character build advisor
#[derive(Parser)]
#[command(name = "advisor")]
#[command(about = "Ranked, explained build suggestions for a character", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Rank and explain candidate options for a character
    Suggest(Suggest),

    /// Print a character's canonical snapshot and hash
    Snapshot(Snapshot),

    /// Lock the proposed build identity
    Confirm(Confirm),

    /// Decline the proposed build identity
    Reject(Reject),

    /// Append a completed choice to the character's history
    Record(Record),

    /// Show stored identity records
    Inspect(Inspect),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = logging::setup_logging(cli.global.log_file)?;

    match cli.command {
        Command::Suggest(cmd) => cmd.execute(&cli.global).await,
        Command::Snapshot(cmd) => cmd.execute(&cli.global),
        Command::Confirm(cmd) => cmd.execute(&cli.global).await,
        Command::Reject(cmd) => cmd.execute(&cli.global).await,
        Command::Record(cmd) => cmd.execute(&cli.global).await,
        Command::Inspect(cmd) => cmd.execute(&cli.global).await,
    }
}
