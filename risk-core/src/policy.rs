use serde::{Deserialize, Serialize};

use crate::types::{RiskLevel, Severity};

/// Score floor for a medium-band assessment.
const MEDIUM_MIN: u8 = 35;
/// Score floor for a high-band assessment.
const HIGH_MIN: u8 = 60;
/// Score floor for a critical-band assessment.
const CRITICAL_MIN: u8 = 85;

/// Tunable thresholds for rule evaluation, score aggregation, and the
/// review gate. Every numeric knob in the engine lives here; defaults match
/// production settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RiskPolicy {
    /// A single line item above this many units flags `bulk_hoarding`.
    pub bulk_quantity_threshold: u32,
    /// Order totals above this flag `high_value`.
    pub high_value_threshold: f64,
    /// More than this many orders in the velocity window flags
    /// `rapid_ordering`. The count includes the order being evaluated.
    pub rapid_order_threshold: u32,
    /// Trailing window, in hours, over which order velocity is counted.
    pub velocity_window_hours: i64,
    /// Points subtracted from the base score for negotiated-price orders.
    pub negotiated_discount: u8,
    /// Minimum adjusted risk level at which a flagged order is held for
    /// manual review.
    pub review_threshold: RiskLevel,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self {
            bulk_quantity_threshold: 100,
            high_value_threshold: 15_000.0,
            rapid_order_threshold: 5,
            velocity_window_hours: 24,
            negotiated_discount: 10,
            review_threshold: RiskLevel::Medium,
        }
    }
}

impl RiskPolicy {
    /// Band floor used as the base score for the worst flag severity.
    pub fn base_for(&self, severity: Severity) -> u8 {
        match severity {
            Severity::Low => 10,
            Severity::Medium => MEDIUM_MIN,
            Severity::High => HIGH_MIN,
            Severity::Critical => CRITICAL_MIN,
        }
    }

    /// Bounded per-flag bonus added for each flag beyond the worst one.
    pub fn bonus_for(&self, severity: Severity) -> u8 {
        match severity {
            Severity::Low => 3,
            Severity::Medium => 5,
            Severity::High => 8,
            Severity::Critical => 10,
        }
    }

    /// Maps a 0–100 score onto its categorical band.
    pub fn level_for(&self, score: u8) -> RiskLevel {
        match score {
            0 => RiskLevel::None,
            s if s >= CRITICAL_MIN => RiskLevel::Critical,
            s if s >= HIGH_MIN => RiskLevel::High,
            s if s >= MEDIUM_MIN => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }
}
