//! `advisor confirm` / `advisor reject`: answer an anchor proposal.

use std::path::PathBuf;

use advisor_core::{AnchorTransition, Archetype};
use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use crate::context::{GlobalArgs, read_character};

/// Lock the proposed build identity
#[derive(Parser)]
pub struct Confirm {
    /// Character state JSON file
    #[arg(short, long, value_name = "FILE")]
    character: PathBuf,

    /// Archetype to lock; may differ from the proposal
    #[arg(short, long)]
    archetype: String,
}

impl Confirm {
    pub async fn execute(self, global: &GlobalArgs) -> Result<()> {
        let state = read_character(&self.character)?;
        let service = global.service(Vec::new())?;
        let archetype = Archetype::new(&self.archetype);

        let transition = service
            .confirm_anchor(&state, &archetype)
            .await
            .with_context(|| format!("Could not confirm {archetype} for {}", state.id))?;
        print_transition(state.id.as_str(), &transition);
        Ok(())
    }
}

/// Decline the proposed build identity
#[derive(Parser)]
pub struct Reject {
    /// Character state JSON file
    #[arg(short, long, value_name = "FILE")]
    character: PathBuf,
}

impl Reject {
    pub async fn execute(self, global: &GlobalArgs) -> Result<()> {
        let state = read_character(&self.character)?;
        let service = global.service(Vec::new())?;

        let transition = service
            .reject_anchor(&state)
            .await
            .with_context(|| format!("Could not reject the proposal for {}", state.id))?;
        print_transition(state.id.as_str(), &transition);
        Ok(())
    }
}

fn print_transition(character: &str, transition: &AnchorTransition) {
    println!(
        "{} {}: {} -> {} at level {}",
        style("Anchor").bold().green(),
        character,
        transition.from,
        transition.to,
        transition.level
    );
}
