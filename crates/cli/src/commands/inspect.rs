//! `advisor inspect`: stored history, anchors and pivot.

use advisor_core::CharacterId;
use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use crate::context::GlobalArgs;
use crate::output;

/// Show stored identity records
#[derive(Parser)]
pub struct Inspect {
    /// Character id; lists known characters when omitted
    #[arg(short, long, value_name = "ID")]
    character: Option<String>,

    /// Number of most recent history entries to show
    #[arg(short = 'n', long, default_value = "10")]
    recent: usize,

    /// Print JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

impl Inspect {
    pub async fn execute(self, global: &GlobalArgs) -> Result<()> {
        let Some(character) = self.character else {
            return list_characters(global);
        };
        let character = CharacterId::new(character);
        let service = global.service(Vec::new())?;
        let records = service
            .records(&character)
            .await
            .with_context(|| format!("Failed to load records for {character}"))?;

        if self.json {
            let body = serde_json::json!({
                "character": character,
                "history": records.history,
                "anchors": records.anchors,
                "pivot": records.pivot,
            });
            let text = serde_json::to_string_pretty(&body).context("Failed to serialize records")?;
            println!("{text}");
            return Ok(());
        }

        println!("{} {}", style("Character:").bold().cyan(), character);
        println!();
        println!("{}", style("Identity:").bold().yellow());
        output::print_anchor("primary", &records.anchors.primary);
        output::print_anchor("secondary", &records.anchors.secondary);
        output::print_pivot(&records.pivot);
        println!();

        println!(
            "{} {} entries",
            style("History:").bold().yellow(),
            records.history.len()
        );
        let skip = records.history.len().saturating_sub(self.recent);
        for entry in records.history.iter().skip(skip) {
            let theme = entry
                .theme
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  level {:>2}  {:<24} {:<12} {}",
                entry.level, entry.item_id, theme, entry.outcome
            );
        }
        Ok(())
    }
}

fn list_characters(global: &GlobalArgs) -> Result<()> {
    let config = global.runtime_config()?;
    let repository = global.repository(&config)?;
    let characters = repository
        .list_characters()
        .context("Failed to list characters")?;

    println!(
        "{} {}",
        style("Data directory:").bold().cyan(),
        repository.base_dir().display()
    );
    if characters.is_empty() {
        println!("{}", style("No characters recorded yet.").dim());
    }
    for character in characters {
        println!("  {character}");
    }
    Ok(())
}
