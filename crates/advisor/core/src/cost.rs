//! Opportunity cost: soft warnings about what a choice quietly gives up.
//!
//! Costs are gated hard. The analyzer stays silent until the character is
//! past the early levels, has a locked identity anchor, and shows at least
//! two of three signals of pursuing a long-range goal:
//!
//! 1. **Progress**: owns at least one of the goal's required options
//! 2. **Clustering**: owns two or more of the goal's related options
//! 3. **Attributes**: one of the two highest attributes is typical for the goal
//!
//! Once open, up to three partial costs are summed and capped at
//! [`EngineConfig::MAX_OPPORTUNITY_COST`].

use serde::{Deserialize, Serialize};

use crate::candidate::CandidateOption;
use crate::config::EngineConfig;
use crate::identity::IdentityAnchor;
use crate::state::{BuildGoal, CharacterState};

/// Soft penalty in `[0, 0.3]` plus short human-readable reasons.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OpportunityCost {
    pub cost: f32,
    pub reasons: Vec<String>,
}

impl OpportunityCost {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_silent(&self) -> bool {
        self.cost == 0.0 && self.reasons.is_empty()
    }

    fn add(&mut self, cost: f32, reason: String) {
        self.cost += cost;
        self.reasons.push(reason);
    }
}

/// Goal-intent signals found for one goal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GoalSignals {
    pub progress: bool,
    pub clustering: bool,
    pub attributes: bool,
}

impl GoalSignals {
    pub fn for_goal(goal: &BuildGoal, state: &CharacterState) -> Self {
        let top_two = state.attributes.top(2);
        Self {
            progress: goal.owned_count(state) >= 1,
            clustering: goal
                .related_options
                .iter()
                .filter(|id| state.owns(id))
                .count()
                >= OpportunityCostAnalyzer::CLUSTER_MIN,
            attributes: top_two.iter().any(|a| goal.typical_attributes.contains(a)),
        }
    }

    pub fn count(&self) -> usize {
        [self.progress, self.clustering, self.attributes]
            .into_iter()
            .filter(|s| *s)
            .count()
    }
}

pub struct OpportunityCostAnalyzer {
    min_level: u32,
}

impl OpportunityCostAnalyzer {
    pub const SIGNALS_REQUIRED: usize = 2;
    pub const CLUSTER_MIN: usize = 2;

    pub const GOAL_DELAY_NEAR: f32 = 0.15;
    pub const GOAL_DELAY_FAR: f32 = 0.08;
    /// Remaining prerequisites at or below which a goal counts as near.
    pub const NEAR_GOAL_REMAINING: usize = 2;

    pub const LOWEST_ATTRIBUTE: f32 = 0.10;
    pub const OUTSIDE_TOP_THREE: f32 = 0.06;
    pub const PARTIAL_MISMATCH: f32 = 0.04;

    pub const PATH_LOCKOUT: f32 = 0.10;

    pub fn new(config: &EngineConfig) -> Self {
        Self {
            min_level: config.cost_min_level,
        }
    }

    /// The pursued goal, if the intent gate is open: the goal with the most
    /// signals, first one on ties.
    pub fn pursued_goal<'a>(&self, state: &'a CharacterState) -> Option<&'a BuildGoal> {
        let mut best: Option<(&BuildGoal, usize)> = None;
        for goal in &state.goals {
            let signals = GoalSignals::for_goal(goal, state).count();
            if best.is_none_or(|(_, most)| signals > most) {
                best = Some((goal, signals));
            }
        }
        best.filter(|(_, signals)| *signals >= Self::SIGNALS_REQUIRED)
            .map(|(goal, _)| goal)
    }

    pub fn compute(
        &self,
        candidate: &CandidateOption,
        state: &CharacterState,
        anchor: &IdentityAnchor,
    ) -> OpportunityCost {
        if state.level <= self.min_level || !anchor.is_locked() {
            return OpportunityCost::none();
        }
        let Some(goal) = self.pursued_goal(state) else {
            return OpportunityCost::none();
        };

        let mut cost = OpportunityCost::none();
        self.goal_delay(candidate, state, goal, &mut cost);
        self.attribute_conflict(candidate, state, &mut cost);
        self.path_lockout(candidate, state, &mut cost);
        cost.cost = cost.cost.min(EngineConfig::MAX_OPPORTUNITY_COST);

        tracing::debug!(
            candidate = %candidate.id,
            goal = %goal.id,
            cost = cost.cost,
            reasons = cost.reasons.len(),
            "opportunity cost computed"
        );
        cost
    }

    fn goal_delay(
        &self,
        candidate: &CandidateOption,
        state: &CharacterState,
        goal: &BuildGoal,
        cost: &mut OpportunityCost,
    ) {
        let advances = goal.requires(&candidate.id)
            || goal.related_options.iter().any(|id| *id == candidate.id);
        let remaining = goal.remaining(state).count();
        if advances || remaining == 0 {
            return;
        }
        let goal_name = if goal.name.is_empty() { &goal.id } else { &goal.name };
        if remaining <= Self::NEAR_GOAL_REMAINING {
            cost.add(
                Self::GOAL_DELAY_NEAR,
                format!("it delays {goal_name}, which is only a step or two away"),
            );
        } else {
            cost.add(
                Self::GOAL_DELAY_FAR,
                format!("it does not move you toward {goal_name}"),
            );
        }
    }

    fn attribute_conflict(
        &self,
        candidate: &CandidateOption,
        state: &CharacterState,
        cost: &mut OpportunityCost,
    ) {
        let required = candidate.required_attributes();
        if required.is_empty() {
            return;
        }
        let lowest = state.attributes.lowest();
        let top_three = state.attributes.top(3);
        let outside = required.iter().filter(|a| !top_three.contains(a)).count();

        if required.contains(&lowest) {
            cost.add(
                Self::LOWEST_ATTRIBUTE,
                format!("it leans on your {lowest}, your weakest attribute"),
            );
        } else if outside == required.len() {
            cost.add(
                Self::OUTSIDE_TOP_THREE,
                "it relies on attributes outside your strengths".to_string(),
            );
        } else if outside > 0 {
            cost.add(
                Self::PARTIAL_MISMATCH,
                "it partly relies on a secondary attribute".to_string(),
            );
        }
    }

    fn path_lockout(
        &self,
        candidate: &CandidateOption,
        state: &CharacterState,
        cost: &mut OpportunityCost,
    ) {
        if let Some(owned) = candidate.exclusive_with.iter().find(|id| state.owns(id)) {
            cost.add(
                Self::PATH_LOCKOUT,
                format!("it cannot be combined with {owned}, which you already have"),
            );
        }
    }
}
