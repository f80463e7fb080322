//! Terminal rendering of advisor results.

use advisor_core::{
    AdvisedSuggestion, AnchorState, ConfidenceBucket, Diagnostic, IdentityAnchor, PivotState,
};
use advisor_runtime::SuggestionResponse;
use console::style;

pub fn print_response(character: &str, response: &SuggestionResponse) {
    println!(
        "{} {}  {} {}  {} {}",
        style("Character:").bold().cyan(),
        character,
        style("Source:").bold().cyan(),
        response.source,
        style("Snapshot:").bold().cyan(),
        response.snapshot_hash
    );
    println!();

    let presented = response.presented();
    if presented.is_empty() {
        println!("{}", style("No suggestions available.").dim());
    }
    for (rank, suggestion) in presented.iter().enumerate() {
        print_suggestion(rank + 1, suggestion);
    }

    if !response.future.is_empty() {
        println!("{}", style("Coming up:").bold().yellow());
        for suggestion in &response.future {
            let levels = suggestion.levels_away.unwrap_or_default();
            println!(
                "  {} {}",
                suggestion.name,
                style(format!("(in {levels} level{})", if levels == 1 { "" } else { "s" })).dim()
            );
        }
        println!();
    }

    print_diagnostics(&response.diagnostics);
}

fn print_suggestion(rank: usize, suggestion: &AdvisedSuggestion) {
    let bucket = match suggestion.bucket {
        ConfidenceBucket::Strong => style(suggestion.bucket.to_string()).green().bold(),
        ConfidenceBucket::Suggested => style(suggestion.bucket.to_string()).cyan(),
        ConfidenceBucket::Possible => style(suggestion.bucket.to_string()).dim(),
    };
    println!("{:>2}. {} [{}]", rank, style(&suggestion.name).bold(), bucket);
    println!("    {}", suggestion.explanation);
    for reason in &suggestion.reasons {
        println!("    {} {}", style("+").green(), reason);
    }
    for reason in &suggestion.cost_reasons {
        println!("    {} {}", style("-").red(), reason);
    }
    println!();
}

pub fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        let subject = diagnostic
            .candidate_id
            .as_deref()
            .map(|id| format!(" ({id})"))
            .unwrap_or_default();
        eprintln!(
            "{} {}{}: {}",
            style("warning:").yellow().bold(),
            diagnostic.kind,
            subject,
            diagnostic.message
        );
    }
}

pub fn print_anchor(label: &str, anchor: &IdentityAnchor) {
    let state = match anchor.state {
        AnchorState::Locked => style(anchor.state.to_string()).green().bold(),
        AnchorState::Proposed => style(anchor.state.to_string()).cyan(),
        AnchorState::Weakening => style(anchor.state.to_string()).yellow(),
        AnchorState::None | AnchorState::Released => style(anchor.state.to_string()).dim(),
    };
    let archetype = anchor
        .archetype
        .as_ref()
        .map(|a| a.label())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "  {:<10} {:<10} {:<14} consistency {:.2}  evidence {}/{}",
        label,
        state,
        archetype,
        anchor.consistency,
        anchor.evidence.matching,
        anchor.evidence.total
    );
}

pub fn print_pivot(pivot: &PivotState) {
    let emerging = pivot
        .emerging_theme
        .as_ref()
        .map(|t| format!("  emerging {t}"))
        .unwrap_or_default();
    println!(
        "  {:<10} {:<10} divergence {:.2}{}",
        "pivot",
        pivot.phase,
        pivot.divergence_score,
        emerging
    );
    for transition in &pivot.transition_history {
        println!(
            "    {} level {}: {} -> {} ({:.2})",
            style("*").dim(),
            transition.level,
            transition.from,
            transition.to,
            transition.divergence
        );
    }
}
