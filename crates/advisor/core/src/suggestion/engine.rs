//! Tier cascade.
//!
//! Rules are checked in strict priority order. Tiers 6, 5 and 4 are
//! first-match. Tier 3 collects every matching signal and sums their
//! weighted bonuses. Tiers 2, 1 and 0 are first-match again.
//!
//! | Tier | Rule |
//! |------|------|
//! | 6 | Prerequisite of an actively pursued goal |
//! | 5 | Prerequisite of a wishlist item, or strong synergy with an owned option |
//! | 4 | Heritage option in the early game (weight decays 4.5 -> 4.0) |
//! | 4 | Builds on an owned prerequisite |
//! | 3 | Archetype / inferred goal / advisor bias / trained skill |
//! | 2 | Uses the single highest attribute |
//! | 1 | Fits a current class |
//! | 0 | Legal |

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::future::{future_suggestion, levels_away};
use super::{ReasonAtom, ReasonCode, Suggestion, Tier, TierWeight, humanize};
use crate::candidate::{CandidateOption, Prerequisite};
use crate::config::EngineConfig;
use crate::error::{Diagnostic, EvaluationError};
use crate::identity::{IdentityAnchor, ThemeAlignment, ThemeTable};
use crate::state::{CharacterState, PendingSelections};

/// Optional inputs to [`SuggestionEngine::evaluate_with`].
#[derive(Clone, Copy, Debug, Default)]
pub struct EvaluateOptions<'a> {
    /// Primary identity anchor; drives the archetype bonus and tier-3 match.
    pub anchor: Option<&'a IdentityAnchor>,
    /// Score unqualified candidates for future availability.
    pub include_unqualified: bool,
}

/// Result of one evaluation pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Qualified candidates, in input order.
    pub suggestions: Vec<Suggestion>,
    /// Unqualified but reachable candidates, in input order.
    pub future: Vec<Suggestion>,
    pub diagnostics: Vec<Diagnostic>,
}

enum Placement {
    Current(Suggestion),
    Future(Suggestion),
}

/// A first-match rule that fired.
struct Rule {
    tier: Tier,
    weight: TierWeight,
    code: ReasonCode,
    source: Option<String>,
    atom: ReasonAtom,
}

/// One matched tier-3 signal.
struct Signal {
    code: ReasonCode,
    bonus: f32,
    source: String,
    atom: ReasonAtom,
}

pub struct SuggestionEngine {
    config: EngineConfig,
    themes: ThemeTable,
}

impl SuggestionEngine {
    pub const ARCHETYPE_WEIGHT: f32 = 0.15;
    pub const INFERRED_GOAL_WEIGHT: f32 = 0.15;
    /// Multiplied by the advisor's conviction.
    pub const ADVISOR_BIAS_WEIGHT: f32 = 0.10;
    pub const TRAINED_SKILL_WEIGHT: f32 = 0.05;

    pub fn new(config: EngineConfig, themes: ThemeTable) -> Self {
        Self { config, themes }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn themes(&self) -> &ThemeTable {
        &self.themes
    }

    /// Evaluates candidates without anchor context or future scoring.
    pub fn evaluate(
        &self,
        candidates: &[CandidateOption],
        state: &CharacterState,
        pending: &PendingSelections,
    ) -> Evaluation {
        self.evaluate_with(candidates, state, pending, &EvaluateOptions::default())
    }

    /// Evaluates every candidate. A failure on one candidate is recorded as a
    /// diagnostic and never affects the others.
    pub fn evaluate_with(
        &self,
        candidates: &[CandidateOption],
        state: &CharacterState,
        pending: &PendingSelections,
        options: &EvaluateOptions<'_>,
    ) -> Evaluation {
        let (state, sanitized) = state.sanitized();
        let mut evaluation = Evaluation {
            diagnostics: sanitized
                .into_iter()
                .map(|d| d.for_character(state.id.clone()))
                .collect(),
            ..Evaluation::default()
        };
        for diagnostic in &evaluation.diagnostics {
            tracing::warn!(character = %state.id, kind = %diagnostic.kind, "{}", diagnostic.message);
        }

        let mut seen: HashSet<&str> = HashSet::with_capacity(candidates.len());
        for candidate in candidates {
            match self.evaluate_candidate(candidate, &state, pending, options, &mut seen) {
                Ok(Some(Placement::Current(suggestion))) => evaluation.suggestions.push(suggestion),
                Ok(Some(Placement::Future(suggestion))) => evaluation.future.push(suggestion),
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(character = %state.id, kind = %err.kind(), "skipping candidate: {err}");
                    evaluation
                        .diagnostics
                        .push(err.to_diagnostic().for_character(state.id.clone()));
                }
            }
        }

        tracing::debug!(
            character = %state.id,
            candidates = candidates.len(),
            suggestions = evaluation.suggestions.len(),
            future = evaluation.future.len(),
            "evaluation complete"
        );
        evaluation
    }

    fn evaluate_candidate<'c>(
        &self,
        candidate: &'c CandidateOption,
        state: &CharacterState,
        pending: &PendingSelections,
        options: &EvaluateOptions<'_>,
        seen: &mut HashSet<&'c str>,
    ) -> Result<Option<Placement>, EvaluationError> {
        if candidate.id.trim().is_empty() {
            return Err(EvaluationError::EmptyCandidateId);
        }
        if !seen.insert(candidate.id.as_str()) {
            return Err(EvaluationError::DuplicateCandidate(candidate.id.clone()));
        }
        if state.owns_or_pending(&candidate.id, pending) {
            tracing::trace!(candidate = %candidate.id, "already owned or selected");
            return Ok(None);
        }

        if !candidate.qualifies(state, pending) {
            if !options.include_unqualified {
                return Ok(None);
            }
            return Ok(levels_away(candidate, state, pending)
                .map(|levels| Placement::Future(future_suggestion(candidate, levels))));
        }

        let suggestion = self.classify(candidate, state, pending, options.anchor);
        if !suggestion.confidence.is_finite() {
            return Err(EvaluationError::NonFinite {
                id: candidate.id.clone(),
                what: "confidence",
            });
        }

        tracing::debug!(
            "  Candidate {}: tier={} weight={} code={} confidence={:.2}",
            suggestion.id,
            suggestion.tier,
            suggestion.tier_weight,
            suggestion.reason_code,
            suggestion.confidence
        );
        Ok(Some(Placement::Current(suggestion)))
    }

    /// Runs the cascade for one qualified candidate.
    pub fn classify(
        &self,
        candidate: &CandidateOption,
        state: &CharacterState,
        pending: &PendingSelections,
        anchor: Option<&IdentityAnchor>,
    ) -> Suggestion {
        let matched_anchor = anchor.filter(|a| {
            a.alignment(candidate.theme.as_ref(), &self.themes) == ThemeAlignment::Match
        });
        let archetype_bonus = matched_anchor.map_or(0.0, |a| {
            (0.1 + 0.1 * a.confidence).min(EngineConfig::MAX_ARCHETYPE_BONUS)
        });
        let signals = self.synergy_signals(candidate, state, matched_anchor);

        let (rule, subpriority_bonus) = match self.first_match_high(candidate, state, pending) {
            Some(rule) => (rule, 0.0),
            None if !signals.is_empty() => Self::synergy_rule(&signals),
            None => (self.first_match_low(candidate, state), 0.0),
        };

        let base = rule.tier.base_confidence() * rule.weight.confidence_multiplier();
        let bonus = (archetype_bonus + subpriority_bonus).min(EngineConfig::MAX_COMBINED_BONUS);
        let confidence = (base + bonus).min(EngineConfig::MAX_CONFIDENCE);

        let mut reasons = vec![rule.atom];
        for signal in signals {
            if signal.code != rule.code {
                reasons.push(signal.atom);
            }
        }
        if rule.tier > Tier::HIGHEST_ATTRIBUTE
            && let Some(atom) = self.highest_attribute(candidate, state).map(|r| r.atom)
        {
            reasons.push(ReasonAtom {
                strength: atom.strength * 0.6,
                ..atom
            });
        }
        reasons.push(ReasonAtom::trace(format!(
            "tier {} weight {} base {base:.3} archetype {archetype_bonus:.3} subpriority {subpriority_bonus:.3}",
            rule.tier, rule.weight
        )));

        Suggestion {
            tier_weight: rule.weight,
            source_id: rule.source,
            confidence,
            reasons,
            ..Suggestion::new(candidate, rule.tier, rule.code)
        }
    }

    /// Tiers 6, 5 and 4, first match wins.
    fn first_match_high(
        &self,
        candidate: &CandidateOption,
        state: &CharacterState,
        pending: &PendingSelections,
    ) -> Option<Rule> {
        self.goal_prerequisite(candidate, state)
            .or_else(|| self.wishlist_prerequisite(candidate, state))
            .or_else(|| self.strong_synergy(candidate, state, pending))
            .or_else(|| self.heritage(candidate, state))
            .or_else(|| self.chain_continuation(candidate, state))
    }

    /// Tiers 2, 1 and 0, first match wins.
    fn first_match_low(&self, candidate: &CandidateOption, state: &CharacterState) -> Rule {
        self.highest_attribute(candidate, state)
            .or_else(|| self.class_theme(candidate, state))
            .unwrap_or_else(|| Rule {
                tier: Tier::FALLBACK,
                weight: TierWeight::of(Tier::FALLBACK),
                code: ReasonCode::Legal,
                source: None,
                atom: ReasonAtom::new(ReasonCode::Legal, "Available to you now.", 0.2),
            })
    }

    fn rule(tier: Tier, code: ReasonCode, source: &str, text: String, strength: f32) -> Rule {
        Rule {
            tier,
            weight: TierWeight::of(tier),
            code,
            source: Some(source.to_string()),
            atom: ReasonAtom::new(code, text, strength),
        }
    }

    fn goal_prerequisite(&self, candidate: &CandidateOption, state: &CharacterState) -> Option<Rule> {
        let goal = state
            .goals
            .iter()
            .find(|g| g.remaining(state).any(|id| *id == candidate.id))?;
        let name = if goal.name.is_empty() { humanize(&goal.id) } else { goal.name.clone() };
        Some(Self::rule(
            Tier::GOAL,
            ReasonCode::GoalPrerequisite,
            &goal.id,
            format!("Required for {name}, which you are working toward."),
            1.0,
        ))
    }

    fn wishlist_prerequisite(&self, candidate: &CandidateOption, state: &CharacterState) -> Option<Rule> {
        let entry = state
            .wishlist
            .iter()
            .find(|w| w.id == candidate.id || w.required_options.contains(&candidate.id))?;
        let name = if entry.name.is_empty() { humanize(&entry.id) } else { entry.name.clone() };
        let text = if entry.id == candidate.id {
            format!("{name} is on your wishlist.")
        } else {
            format!("Unlocks {name} from your wishlist.")
        };
        Some(Self::rule(
            Tier::WISHLIST,
            ReasonCode::WishlistPrerequisite,
            &entry.id,
            text,
            0.9,
        ))
    }

    fn strong_synergy(
        &self,
        candidate: &CandidateOption,
        state: &CharacterState,
        pending: &PendingSelections,
    ) -> Option<Rule> {
        let partner = candidate
            .synergies
            .iter()
            .find(|id| state.owns_or_pending(id, pending))?;
        Some(Self::rule(
            Tier::WISHLIST,
            ReasonCode::StrongSynergy,
            partner,
            format!("Combines strongly with {}.", humanize(partner)),
            0.85,
        ))
    }

    fn heritage(&self, candidate: &CandidateOption, state: &CharacterState) -> Option<Rule> {
        if state.level > self.config.heritage_max_level || state.species_id.is_empty() {
            return None;
        }
        let species = candidate
            .heritage
            .iter()
            .find(|s| s.eq_ignore_ascii_case(&state.species_id))?;
        Some(Rule {
            weight: TierWeight::heritage(state.level, self.config.heritage_half_life_levels),
            ..Self::rule(
                Tier::CONTINUATION,
                ReasonCode::HeritageAligned,
                species,
                format!("Draws on your {} heritage.", humanize(species)),
                0.8,
            )
        })
    }

    fn chain_continuation(&self, candidate: &CandidateOption, state: &CharacterState) -> Option<Rule> {
        let owned = candidate.chained_from(state).next()?;
        Some(Self::rule(
            Tier::CONTINUATION,
            ReasonCode::ChainContinuation,
            owned,
            format!("Builds directly on {}.", humanize(owned)),
            0.8,
        ))
    }

    /// Every tier-3 signal that matches, in fixed order.
    fn synergy_signals(
        &self,
        candidate: &CandidateOption,
        state: &CharacterState,
        matched_anchor: Option<&IdentityAnchor>,
    ) -> Vec<Signal> {
        let mut signals = Vec::new();

        if let Some(archetype) = matched_anchor.and_then(|a| a.archetype.as_ref()) {
            signals.push(Signal {
                code: ReasonCode::ArchetypeMatch,
                bonus: Self::ARCHETYPE_WEIGHT,
                source: archetype.to_string(),
                atom: ReasonAtom::new(
                    ReasonCode::ArchetypeMatch,
                    format!("Fits your {} identity.", archetype.label()),
                    0.7,
                ),
            });
        }

        let inferred = state.inferred_goals.iter().find(|goal| {
            candidate.has_tag(goal)
                || candidate.category.eq_ignore_ascii_case(goal)
                || candidate
                    .theme
                    .as_ref()
                    .is_some_and(|t| t.as_str().eq_ignore_ascii_case(goal))
        });
        if let Some(goal) = inferred {
            signals.push(Signal {
                code: ReasonCode::InferredGoalMatch,
                bonus: Self::INFERRED_GOAL_WEIGHT,
                source: goal.clone(),
                atom: ReasonAtom::new(
                    ReasonCode::InferredGoalMatch,
                    format!("Supports your interest in {}.", humanize(goal)),
                    0.6,
                ),
            });
        }

        if let Some(bias) = state.advisor_bias.as_ref()
            && candidate.theme.as_ref() == Some(&bias.theme)
        {
            signals.push(Signal {
                code: ReasonCode::AdvisorBiasMatch,
                bonus: Self::ADVISOR_BIAS_WEIGHT * bias.conviction,
                source: bias.theme.to_string(),
                atom: ReasonAtom::new(
                    ReasonCode::AdvisorBiasMatch,
                    format!("Matches your advisor's {} leanings.", bias.theme),
                    0.5,
                ),
            });
        }

        let skill = candidate.prerequisites.iter().find_map(|p| match p {
            Prerequisite::Skill { skill } | Prerequisite::Rank { skill, .. }
                if state.is_trained(skill) =>
            {
                Some(skill)
            }
            _ => None,
        });
        let skill = skill.or_else(|| state.trained_skills.iter().find(|s| candidate.has_tag(s)));
        if let Some(skill) = skill {
            signals.push(Signal {
                code: ReasonCode::TrainedSkillMatch,
                bonus: Self::TRAINED_SKILL_WEIGHT,
                source: skill.clone(),
                atom: ReasonAtom::new(
                    ReasonCode::TrainedSkillMatch,
                    format!("Puts your {} training to use.", humanize(skill)),
                    0.4,
                ),
            });
        }

        signals
    }

    /// Tier-3 rule from the matched signals: the highest-weight signal is the
    /// primary reason (first one on ties); the bonus is the capped sum.
    fn synergy_rule(signals: &[Signal]) -> (Rule, f32) {
        let mut primary = &signals[0];
        for signal in &signals[1..] {
            if signal.bonus > primary.bonus {
                primary = signal;
            }
        }
        let bonus = signals
            .iter()
            .map(|s| s.bonus)
            .sum::<f32>()
            .min(EngineConfig::MAX_SUBPRIORITY_BONUS);
        let rule = Rule {
            tier: Tier::SYNERGY,
            weight: TierWeight::of(Tier::SYNERGY),
            code: primary.code,
            source: Some(primary.source.clone()),
            atom: primary.atom.clone(),
        };
        (rule, bonus)
    }

    fn highest_attribute(&self, candidate: &CandidateOption, state: &CharacterState) -> Option<Rule> {
        let highest = state.attributes.highest();
        if !candidate.required_attributes().contains(&highest) {
            return None;
        }
        Some(Self::rule(
            Tier::HIGHEST_ATTRIBUTE,
            ReasonCode::HighestAttribute,
            highest.key(),
            format!("Makes the most of your {highest}."),
            0.5,
        ))
    }

    fn class_theme(&self, candidate: &CandidateOption, state: &CharacterState) -> Option<Rule> {
        let class = state
            .class_ids
            .iter()
            .find(|c| candidate.has_tag(c) || candidate.category.eq_ignore_ascii_case(c))?;
        Some(Self::rule(
            Tier::CLASS_THEME,
            ReasonCode::ClassTheme,
            class,
            format!("Suits your {} training.", humanize(class)),
            0.4,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::OptionKind;
    use crate::identity::{AnchorState, Archetype, Theme};
    use crate::state::{AdvisorBias, Attribute, Attributes, BuildGoal, WishlistEntry};

    fn engine() -> SuggestionEngine {
        SuggestionEngine::new(EngineConfig::default(), ThemeTable::default())
    }

    fn soldier(level: u32) -> CharacterState {
        let mut state = CharacterState::new("pc", level);
        state.species_id = "human".into();
        state.class_ids = vec!["soldier".into()];
        state.attributes = Attributes::new(16, 12, 14, 10, 10, 8);
        state.feats = vec!["power_attack".into()];
        state.trained_skills = vec!["athletics".into()];
        state
    }

    fn feat(id: &str) -> CandidateOption {
        CandidateOption::new(id, humanize(id), OptionKind::Feat)
    }

    fn only(evaluation: &Evaluation) -> &Suggestion {
        assert_eq!(evaluation.suggestions.len(), 1, "{:?}", evaluation.diagnostics);
        &evaluation.suggestions[0]
    }

    fn classify(candidate: CandidateOption, state: &CharacterState) -> Suggestion {
        let evaluation = engine().evaluate(&[candidate], state, &PendingSelections::default());
        only(&evaluation).clone()
    }

    #[test]
    fn goal_prerequisite_is_tier_six() {
        let mut state = soldier(4);
        state.goals.push(BuildGoal {
            id: "elite_trooper".into(),
            name: "Elite Trooper".into(),
            required_options: vec!["armor_mastery".into()],
            ..BuildGoal::default()
        });
        let suggestion = classify(feat("armor_mastery").with_scaling([Attribute::Strength]), &state);
        assert_eq!(suggestion.tier, Tier::GOAL);
        assert_eq!(suggestion.reason_code, ReasonCode::GoalPrerequisite);
        assert_eq!(suggestion.source_id.as_deref(), Some("elite_trooper"));
        assert!((suggestion.confidence - 0.95).abs() < 1e-6);
        assert!(suggestion.reasons[0].text.contains("Elite Trooper"));
    }

    #[test]
    fn goal_confidence_never_exceeds_ceiling_with_archetype_bonus() {
        let mut state = soldier(4);
        state.goals.push(BuildGoal {
            id: "elite_trooper".into(),
            required_options: vec!["armor_mastery".into()],
            ..BuildGoal::default()
        });
        let anchor = IdentityAnchor {
            state: AnchorState::Proposed,
            archetype: Some(Archetype::new("warrior")),
            confidence: 0.0,
            ..IdentityAnchor::default()
        };
        let options = EvaluateOptions {
            anchor: Some(&anchor),
            ..EvaluateOptions::default()
        };
        let candidate = feat("armor_mastery").with_theme("armor");
        let evaluation =
            engine().evaluate_with(&[candidate], &state, &PendingSelections::default(), &options);
        let suggestion = only(&evaluation);
        assert_eq!(suggestion.tier, Tier::GOAL);
        assert_eq!(suggestion.confidence, EngineConfig::MAX_CONFIDENCE);
    }

    #[test]
    fn wishlist_and_synergy_are_tier_five() {
        let mut state = soldier(4);
        state.wishlist.push(WishlistEntry {
            id: "whirlwind".into(),
            name: "Whirlwind".into(),
            required_options: vec!["spring_attack".into()],
        });
        let wish = classify(feat("spring_attack"), &state);
        assert_eq!(wish.tier, Tier::WISHLIST);
        assert_eq!(wish.reason_code, ReasonCode::WishlistPrerequisite);

        let combo = classify(feat("cleave").with_synergies(["power_attack"]), &state);
        assert_eq!(combo.tier, Tier::WISHLIST);
        assert_eq!(combo.reason_code, ReasonCode::StrongSynergy);
        assert!((combo.confidence - 0.85).abs() < 1e-6);
    }

    #[test]
    fn heritage_tier_decays_with_level() {
        let candidate = feat("bonus_feat").with_heritage(["human"]);
        let early = classify(candidate.clone(), &soldier(1));
        assert_eq!(early.tier, Tier::CONTINUATION);
        assert_eq!(early.reason_code, ReasonCode::HeritageAligned);
        assert_eq!(early.tier_weight.hundredths(), 450);
        assert!((early.confidence - 0.7875).abs() < 1e-4);

        let later = classify(candidate.clone(), &soldier(7));
        assert!(later.confidence < early.confidence);

        let past_window = classify(candidate, &soldier(9));
        assert_ne!(past_window.reason_code, ReasonCode::HeritageAligned);
    }

    #[test]
    fn chain_continuation_is_tier_four() {
        let candidate = feat("great_cleave").with_prerequisite(Prerequisite::Option {
            id: "power_attack".into(),
        });
        let suggestion = classify(candidate, &soldier(4));
        assert_eq!(suggestion.tier, Tier::CONTINUATION);
        assert_eq!(suggestion.reason_code, ReasonCode::ChainContinuation);
        assert_eq!(suggestion.source_id.as_deref(), Some("power_attack"));
        assert!(suggestion.reasons[0].text.contains("Power Attack"));
    }

    #[test]
    fn tier_three_sums_signals_with_cap() {
        let mut state = soldier(4);
        state.inferred_goals = vec!["mobility".into()];
        state.advisor_bias = Some(AdvisorBias {
            theme: Theme::new("stealth"),
            conviction: 1.0,
        });
        let candidate = feat("shadow_step")
            .with_theme("stealth")
            .with_tags(["mobility", "athletics"]);

        let suggestion = classify(candidate, &state);
        assert_eq!(suggestion.tier, Tier::SYNERGY);
        // inferred 0.15 wins over bias 0.10 as primary
        assert_eq!(suggestion.reason_code, ReasonCode::InferredGoalMatch);
        // 0.15 + 0.10 + 0.05 = 0.30, capped at 0.25
        assert!((suggestion.confidence - 0.85).abs() < 1e-6);
        let codes: Vec<_> = suggestion.reasons.iter().filter(|r| r.safe).map(|r| r.code).collect();
        assert_eq!(
            codes,
            vec![
                ReasonCode::InferredGoalMatch,
                ReasonCode::AdvisorBiasMatch,
                ReasonCode::TrainedSkillMatch
            ]
        );
    }

    #[test]
    fn low_tiers_fall_through_in_order() {
        let state = soldier(4);
        let strong = classify(feat("mighty_blow").with_scaling([Attribute::Strength]), &state);
        assert_eq!(strong.tier, Tier::HIGHEST_ATTRIBUTE);
        assert_eq!(strong.source_id.as_deref(), Some("str"));

        let mut drill = feat("drill");
        drill.category = "Soldier".into();
        let class = classify(drill, &state);
        assert_eq!(class.tier, Tier::CLASS_THEME);

        let plain = classify(feat("skill_focus"), &state);
        assert_eq!(plain.tier, Tier::FALLBACK);
        assert_eq!(plain.reason_code, ReasonCode::Legal);
        assert!((plain.confidence - 0.30).abs() < 1e-6);
    }

    #[test]
    fn owned_and_unqualified_candidates_are_skipped() {
        let state = soldier(4);
        let candidates = vec![
            feat("power_attack"),
            feat("far_off").with_prerequisite(Prerequisite::Level { min: 6 }),
            feat("pending_pick"),
        ];
        let evaluation =
            engine().evaluate(&candidates, &state, &PendingSelections::new(["pending_pick"]));
        assert!(evaluation.suggestions.is_empty());
        assert!(evaluation.future.is_empty());
    }

    #[test]
    fn future_path_lists_reachable_candidates() {
        let state = soldier(4);
        let candidates = vec![
            feat("far_off").with_prerequisite(Prerequisite::Level { min: 6 }),
            feat("wrong_species").with_prerequisite(Prerequisite::Species { id: "droid".into() }),
        ];
        let options = EvaluateOptions {
            include_unqualified: true,
            ..EvaluateOptions::default()
        };
        let evaluation =
            engine().evaluate_with(&candidates, &state, &PendingSelections::default(), &options);
        assert_eq!(evaluation.future.len(), 1);
        assert_eq!(evaluation.future[0].levels_away, Some(2));
        assert_eq!(evaluation.future[0].tier, Tier::FALLBACK);
    }

    #[test]
    fn bad_candidates_are_isolated() {
        let state = soldier(4);
        let candidates = vec![feat(""), feat("drill"), feat("drill"), feat("skill_focus")];
        let evaluation = engine().evaluate(&candidates, &state, &PendingSelections::default());
        let ids: Vec<_> = evaluation.suggestions.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["drill", "skill_focus"]);
        assert_eq!(evaluation.diagnostics.len(), 2);
        assert!(evaluation.diagnostics.iter().all(|d| d.character_id.is_some()));
    }

    #[test]
    fn invalid_state_is_sanitized_and_reported() {
        let mut state = soldier(0);
        state.feats.push("  ".into());
        let evaluation = engine().evaluate(&[feat("skill_focus")], &state, &PendingSelections::default());
        assert_eq!(evaluation.suggestions.len(), 1);
        assert_eq!(evaluation.diagnostics.len(), 2);
        assert!(
            evaluation
                .diagnostics
                .iter()
                .all(|d| d.kind == crate::error::ErrorKind::InvalidState)
        );
    }

    #[test]
    fn higher_tiers_carry_supporting_reasons() {
        let anchor = IdentityAnchor {
            state: AnchorState::Locked,
            archetype: Some(Archetype::new("warrior")),
            confidence: 1.0,
            ..IdentityAnchor::default()
        };
        let candidate = feat("great_cleave")
            .with_theme("melee")
            .with_scaling([Attribute::Strength])
            .with_prerequisite(Prerequisite::Option {
                id: "power_attack".into(),
            });
        let suggestion = engine().classify(
            &candidate,
            &soldier(4),
            &PendingSelections::default(),
            Some(&anchor),
        );
        let codes: Vec<_> = suggestion.reasons.iter().map(|r| r.code).collect();
        assert_eq!(
            codes,
            vec![
                ReasonCode::ChainContinuation,
                ReasonCode::ArchetypeMatch,
                ReasonCode::HighestAttribute,
                ReasonCode::ScoreTrace
            ]
        );
        // 0.70 + min(0.2, 0.1 + 0.1)
        assert!((suggestion.confidence - 0.90).abs() < 1e-6);
    }
}
