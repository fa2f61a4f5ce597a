//! The rule contract.
//!
//! Rules are pure and synchronous: everything they may look at is gathered
//! into a [`RuleContext`] up front (velocity count, watchlist hits), so a
//! rule body is a plain predicate over the order. The engine isolates each
//! rule's failure; one broken rule never blocks checkout or the others.

use risk_core::{Flag, Order, RiskPolicy, WatchlistEntry};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("rule input missing: {0}")]
    MissingInput(&'static str),
    #[error("rule evaluation failed: {0}")]
    Failed(String),
}

/// Everything a rule may inspect for one evaluation.
pub struct RuleContext<'a> {
    pub order: &'a Order,
    /// Purchaser order count in the trailing window, inclusive of this order.
    pub velocity_in_window: u32,
    /// Active watchlist entries matching the purchaser, device, or IP.
    pub watchlist_hits: &'a [WatchlistEntry],
    pub policy: &'a RiskPolicy,
}

pub trait Rule: Send + Sync {
    /// Stable identifier, also used as the flag kind.
    fn name(&self) -> &'static str;

    /// `Ok(None)` means the rule inspected the order and found nothing.
    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Option<Flag>, RuleError>;
}

/// Per-rule outcome reported by the debug re-run.
#[derive(Clone, Debug, Serialize)]
pub struct RuleFinding {
    pub rule: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flag: Option<Flag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
