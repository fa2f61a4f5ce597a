//! Flag-set to risk-score aggregation.
//!
//! The base score is the band floor of the worst flag; every additional flag
//! contributes a bounded severity-weighted bonus; the total is capped at 100.
//! The negotiated-price adjustment is applied only through
//! [`adjusted_score`], which every consumer shares.

use serde::Serialize;

use crate::policy::RiskPolicy;
use crate::types::{Flag, RiskLevel};

/// Outcome of aggregating one order's flag set.
#[derive(Clone, Debug, Serialize)]
pub struct RiskAssessment {
    /// Score before the negotiated adjustment. This is what gets persisted.
    pub base_score: u8,
    /// Adjusted score: what the gate compares and the dashboard displays.
    pub score: u8,
    /// Band of the adjusted score.
    pub level: RiskLevel,
    /// Deduplicated flag kinds, in firing order.
    pub reasons: Vec<String>,
}

/// The one place the negotiated-price adjustment happens.
pub fn adjusted_score(base: u8, negotiated: bool, policy: &RiskPolicy) -> u8 {
    if negotiated {
        base.saturating_sub(policy.negotiated_discount)
    } else {
        base
    }
}

/// Aggregates a flag set into an assessment.
///
/// An empty flag set is a zero score at level `None` regardless of the
/// negotiated adjustment.
pub fn assess(flags: &[Flag], negotiated: bool, policy: &RiskPolicy) -> RiskAssessment {
    let Some(worst) = flags.iter().map(|f| f.severity).max() else {
        return RiskAssessment {
            base_score: 0,
            score: 0,
            level: RiskLevel::None,
            reasons: Vec::new(),
        };
    };

    let mut base = u32::from(policy.base_for(worst));
    let mut counted_worst = false;
    for flag in flags {
        // The single worst flag sets the floor; every other flag, including
        // a second flag of the same severity, adds its bonus.
        if !counted_worst && flag.severity == worst {
            counted_worst = true;
            continue;
        }
        base += u32::from(policy.bonus_for(flag.severity));
    }
    let base = base.min(100) as u8;

    let score = adjusted_score(base, negotiated, policy);
    let mut reasons = Vec::new();
    for flag in flags {
        if !reasons.contains(&flag.kind) {
            reasons.push(flag.kind.clone());
        }
    }

    RiskAssessment {
        base_score: base,
        score,
        level: policy.level_for(score),
        reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;

    fn flag(kind: &str, severity: Severity) -> Flag {
        Flag::new(kind, severity, "test")
    }

    #[test]
    fn no_flags_scores_zero() {
        let policy = RiskPolicy::default();
        let a = assess(&[], true, &policy);
        assert_eq!(a.base_score, 0);
        assert_eq!(a.score, 0);
        assert_eq!(a.level, RiskLevel::None);
        assert!(a.reasons.is_empty());
    }

    #[test]
    fn single_flag_lands_on_band_floor() {
        let policy = RiskPolicy::default();
        let a = assess(&[flag("bulk_hoarding", Severity::High)], false, &policy);
        assert_eq!(a.base_score, 60);
        assert_eq!(a.level, RiskLevel::High);
        assert_eq!(a.reasons, vec!["bulk_hoarding".to_string()]);
    }

    #[test]
    fn extra_flags_raise_the_score() {
        let policy = RiskPolicy::default();
        let one = assess(&[flag("bulk_hoarding", Severity::High)], false, &policy);
        let two = assess(
            &[
                flag("bulk_hoarding", Severity::High),
                flag("rapid_ordering", Severity::High),
            ],
            false,
            &policy,
        );
        assert!(two.base_score > one.base_score);
        assert_eq!(two.base_score, 68);
    }

    #[test]
    fn adding_a_flag_never_lowers_the_score() {
        let policy = RiskPolicy::default();
        let mut flags = vec![flag("watchlist_match", Severity::Critical)];
        let mut prev = assess(&flags, false, &policy).base_score;
        for (i, sev) in [Severity::Low, Severity::Medium, Severity::High, Severity::Critical]
            .into_iter()
            .enumerate()
        {
            flags.push(flag(&format!("extra_{i}"), sev));
            let next = assess(&flags, false, &policy).base_score;
            assert!(next >= prev);
            prev = next;
        }
    }

    #[test]
    fn score_caps_at_one_hundred() {
        let policy = RiskPolicy::default();
        let flags: Vec<Flag> = (0..8)
            .map(|i| flag(&format!("crit_{i}"), Severity::Critical))
            .collect();
        let a = assess(&flags, false, &policy);
        assert_eq!(a.base_score, 100);
        assert_eq!(a.level, RiskLevel::Critical);
    }

    #[test]
    fn negotiated_twin_scores_lower() {
        let policy = RiskPolicy::default();
        let flags = [
            flag("bulk_hoarding", Severity::High),
            flag("rapid_ordering", Severity::High),
        ];
        let plain = assess(&flags, false, &policy);
        let negotiated = assess(&flags, true, &policy);
        assert_eq!(negotiated.base_score, plain.base_score);
        assert_eq!(negotiated.score, plain.score - 10);
    }

    #[test]
    fn negotiated_adjustment_never_goes_negative() {
        let policy = RiskPolicy::default();
        assert_eq!(adjusted_score(4, true, &policy), 0);
        assert_eq!(adjusted_score(4, false, &policy), 4);
    }

    #[test]
    fn repeated_flag_kinds_dedupe_in_reasons() {
        let policy = RiskPolicy::default();
        let a = assess(
            &[
                flag("bulk_hoarding", Severity::High),
                flag("bulk_hoarding", Severity::High),
            ],
            false,
            &policy,
        );
        assert_eq!(a.reasons, vec!["bulk_hoarding".to_string()]);
    }
}
