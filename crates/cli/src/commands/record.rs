//! `advisor record`: append a completed choice to the history log.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use advisor_core::{HistoryEntry, Outcome, Theme};
use anyhow::Result;
use clap::Parser;
use console::style;

use crate::context::{GlobalArgs, read_character};

/// Append a completed choice to the character's history
#[derive(Parser)]
pub struct Record {
    /// Character state JSON file (id and level are taken from it)
    #[arg(short, long, value_name = "FILE")]
    character: PathBuf,

    /// Option id that was offered
    #[arg(short, long)]
    item: String,

    /// Theme of the option
    #[arg(short, long)]
    theme: Option<String>,

    /// What the player did with it (accepted, rejected, ignored)
    #[arg(short, long, default_value = "accepted")]
    outcome: Outcome,
}

impl Record {
    pub async fn execute(self, global: &GlobalArgs) -> Result<()> {
        let state = read_character(&self.character)?;
        let service = global.service(Vec::new())?;

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let entry = HistoryEntry::new(
            self.item,
            self.theme.map(Theme::new),
            state.level,
            self.outcome,
            timestamp,
        );
        let summary = format!("{} ({})", entry.item_id, entry.outcome);

        if let Some(diagnostic) = service.record_choice(&state.id, entry).await {
            anyhow::bail!("Failed to record {summary}: {}", diagnostic.message);
        }
        println!(
            "{} {} for {} at level {}",
            style("Recorded").bold().green(),
            summary,
            state.id,
            state.level
        );
        Ok(())
    }
}
