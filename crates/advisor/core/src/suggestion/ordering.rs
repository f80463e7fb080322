//! Deterministic display ordering.
//!
//! Tier descending, then confidence descending, then id ascending, then name
//! ascending. Confidence is compared in hundredths so values within `0.01`
//! of each other fall through to the id, and the comparison stays a total
//! order (plain epsilon comparison is not transitive).

use std::cmp::Ordering;

use super::Suggestion;

/// Confidence rounded to hundredths; non-finite values sort last.
fn confidence_key(confidence: f32) -> i64 {
    if confidence.is_finite() {
        (f64::from(confidence) * 100.0).round() as i64
    } else {
        i64::MIN
    }
}

pub fn compare(a: &Suggestion, b: &Suggestion) -> Ordering {
    b.tier
        .cmp(&a.tier)
        .then_with(|| confidence_key(b.confidence).cmp(&confidence_key(a.confidence)))
        .then_with(|| a.id.cmp(&b.id))
        .then_with(|| a.name.cmp(&b.name))
}

pub fn sort_suggestions(suggestions: &mut [Suggestion]) {
    suggestions.sort_by(compare);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::{CandidateOption, OptionKind};
    use crate::suggestion::{ReasonCode, Tier};

    fn suggestion(id: &str, tier: u8, confidence: f32) -> Suggestion {
        Suggestion {
            confidence,
            ..Suggestion::new(
                &CandidateOption::new(id, id.to_uppercase(), OptionKind::Feat),
                Tier::new(tier),
                ReasonCode::Legal,
            )
        }
    }

    fn ids(suggestions: &[Suggestion]) -> Vec<&str> {
        suggestions.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn orders_by_tier_then_confidence_then_id() {
        let mut list = vec![
            suggestion("c", 3, 0.60),
            suggestion("a", 3, 0.70),
            suggestion("b", 6, 0.10),
            suggestion("d", 0, 0.99),
        ];
        sort_suggestions(&mut list);
        assert_eq!(ids(&list), vec!["b", "a", "c", "d"]);
    }

    #[test]
    fn near_equal_confidence_falls_back_to_id() {
        let mut list = vec![suggestion("zeta", 2, 0.6012), suggestion("alpha", 2, 0.5995)];
        sort_suggestions(&mut list);
        assert_eq!(ids(&list), vec!["alpha", "zeta"]);
    }

    #[test]
    fn ordering_is_reproducible_for_any_input_order() {
        let base = vec![
            suggestion("x", 4, 0.7),
            suggestion("y", 4, 0.7),
            suggestion("z", 1, 0.4),
            suggestion("w", 5, 0.85),
        ];
        let mut forward = base.clone();
        let mut backward: Vec<_> = base.into_iter().rev().collect();
        sort_suggestions(&mut forward);
        sort_suggestions(&mut backward);
        assert_eq!(forward, backward);
        assert_eq!(ids(&forward), vec!["w", "x", "y", "z"]);
    }

    #[test]
    fn non_finite_confidence_sorts_last_within_tier() {
        let mut list = vec![suggestion("nan", 2, f32::NAN), suggestion("ok", 2, 0.1)];
        sort_suggestions(&mut list);
        assert_eq!(ids(&list), vec!["ok", "nan"]);
    }
}
