//! `advisor suggest`: ranked, explained suggestions for one character.

use std::path::PathBuf;

use advisor_core::PendingSelections;
use advisor_runtime::SuggestionRequest;
use anyhow::{Context, Result};
use clap::Parser;

use crate::context::{GlobalArgs, read_character};
use crate::output;

/// Rank and explain candidate options
#[derive(Parser)]
pub struct Suggest {
    /// Character state JSON file
    #[arg(short, long, value_name = "FILE")]
    character: PathBuf,

    /// Option catalog RON file (defaults to <content>/catalog.ron)
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// Decision surface the advice is for
    #[arg(long, default_value = "level_up")]
    context: String,

    /// Option kind to consider (feat, talent, power, ...); all when omitted
    #[arg(short, long, default_value = "")]
    domain: String,

    /// Progression focus (balanced, combat, roleplay, optimization, ...)
    #[arg(short, long)]
    focus: Option<String>,

    /// Decision step id; an unchanged step replays its earlier advice
    #[arg(long)]
    step: Option<String>,

    /// Only evaluate these option ids
    #[arg(long = "only", value_name = "ID", value_delimiter = ',')]
    candidates: Vec<String>,

    /// Options already picked during this decision but not yet committed
    #[arg(long, value_name = "ID", value_delimiter = ',')]
    pending: Vec<String>,

    /// Also list options that become available at a later level
    #[arg(long)]
    future: bool,

    /// Print JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

impl Suggest {
    pub async fn execute(self, global: &GlobalArgs) -> Result<()> {
        let state = read_character(&self.character)?;
        let catalog = global.catalog(self.catalog.as_deref())?;
        let service = global.service(catalog)?;

        let mut request = SuggestionRequest::new(self.context, self.domain)
            .with_candidates(self.candidates)
            .with_pending(PendingSelections::new(self.pending));
        request.include_unqualified = self.future;
        if let Some(focus) = self.focus {
            request = request.with_focus(focus);
        }
        if let Some(step) = self.step {
            request = request.with_step(step);
        }

        let response = service.get_suggestions(&state, &request).await;
        tracing::debug!(source = %response.source, count = response.suggestions.len(), "suggest done");

        if self.json {
            let body = serde_json::json!({
                "character": state.id,
                "source": response.source,
                "snapshot_hash": response.snapshot_hash,
                "suggestions": response.presented(),
                "future": response.future.iter().map(advisor_core::AdvisedSuggestion::from).collect::<Vec<_>>(),
                "diagnostics": response.diagnostics,
            });
            let text = serde_json::to_string_pretty(&body).context("Failed to serialize response")?;
            println!("{text}");
        } else {
            output::print_response(state.id.as_str(), &response);
        }
        Ok(())
    }
}
