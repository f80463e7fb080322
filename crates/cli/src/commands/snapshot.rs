//! `advisor snapshot`: canonical snapshot, hash and diff.

use std::path::PathBuf;

use advisor_core::{CharacterSnapshot, PendingSelections};
use anyhow::Result;
use clap::Parser;
use console::style;

use crate::context::{GlobalArgs, read_character};

/// Print a character's canonical snapshot and hash
#[derive(Parser)]
pub struct Snapshot {
    /// Character state JSON file
    #[arg(short, long, value_name = "FILE")]
    character: PathBuf,

    /// Progression focus included in the snapshot
    #[arg(short, long)]
    focus: Option<String>,

    /// Pending selections included in the snapshot
    #[arg(long, value_name = "ID", value_delimiter = ',')]
    pending: Vec<String>,

    /// Second character file; prints the top-level keys that differ
    #[arg(long, value_name = "FILE")]
    diff: Option<PathBuf>,
}

impl Snapshot {
    pub fn execute(self, global: &GlobalArgs) -> Result<()> {
        let focus = match self.focus {
            Some(focus) => focus,
            None => global.runtime_config()?.default_focus,
        };
        let pending = PendingSelections::new(self.pending);
        let snapshot = CharacterSnapshot::build(&read_character(&self.character)?, &focus, &pending);

        let Some(other) = self.diff else {
            println!("{} {}", style("Hash:").bold().cyan(), snapshot.hash());
            println!("{}", snapshot.serialize());
            return Ok(());
        };

        let other = CharacterSnapshot::build(&read_character(&other)?, &focus, &pending);
        let changed = CharacterSnapshot::diff(&snapshot, &other);
        println!(
            "{} {} -> {}",
            style("Hash:").bold().cyan(),
            snapshot.hash(),
            other.hash()
        );
        if changed.is_empty() {
            println!("{}", style("Snapshots are identical.").dim());
        }
        for key in changed {
            println!("  {} {}", style("~").yellow(), key);
        }
        Ok(())
    }
}
