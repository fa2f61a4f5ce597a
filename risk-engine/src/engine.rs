//! Checkout evaluation and the review gate.

use std::sync::Arc;

use chrono::Duration;
use risk_core::{
    assess, Flag, Order, PurchaserRole, ReviewState, RiskAssessment, RiskPolicy, SecurityInfo,
    WatchlistEntry, WatchlistKind,
};
use serde::Serialize;
use thiserror::Error;

use crate::rule::{Rule, RuleContext, RuleFinding};
use crate::rules::default_rules;
use crate::store::{OrderStore, StoreError, WatchlistStore};
use crate::velocity::VelocityTracker;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The security envelope could not be written for an order that needs
    /// review. The order must be held rather than silently released.
    #[error("order {order_id} held for manual review: {source}")]
    ReviewHold {
        order_id: String,
        #[source]
        source: StoreError,
    },
    #[error("order {0} not found")]
    OrderNotFound(String),
}

/// What one checkout evaluation produced.
#[derive(Debug)]
pub struct Evaluation {
    pub assessment: RiskAssessment,
    pub security: SecurityInfo,
    pub flags: Vec<Flag>,
    pub requires_approval: bool,
    /// Review state after the gate was consulted.
    pub review: ReviewState,
    /// Rules that errored and were skipped this run.
    pub rule_failures: u32,
}

/// Non-persisting per-rule transparency report for the admin debug view.
#[derive(Debug, Serialize)]
pub struct DebugReport {
    pub order_id: String,
    pub findings: Vec<RuleFinding>,
    pub assessment: RiskAssessment,
}

/// Runs the rule set against orders at checkout, aggregates the score, and
/// flips the review gate.
pub struct RiskEngine {
    policy: RiskPolicy,
    rules: Vec<Box<dyn Rule>>,
    orders: Arc<dyn OrderStore>,
    watchlist: Arc<dyn WatchlistStore>,
}

impl RiskEngine {
    pub fn new(
        policy: RiskPolicy,
        orders: Arc<dyn OrderStore>,
        watchlist: Arc<dyn WatchlistStore>,
    ) -> Self {
        Self {
            policy,
            rules: default_rules(),
            orders,
            watchlist,
        }
    }

    pub fn with_rules(mut self, rules: Vec<Box<dyn Rule>>) -> Self {
        self.rules = rules;
        self
    }

    pub fn policy(&self) -> &RiskPolicy {
        &self.policy
    }

    /// Persists the order, evaluates it, writes back the security envelope,
    /// and moves the order to pending review when the gate threshold is met.
    ///
    /// A failed envelope write is fatal only for orders that need review;
    /// a clean order proceeds with a warning.
    pub async fn evaluate_checkout(&self, order: Order) -> Result<Evaluation, EngineError> {
        let order_id = order.order_id.clone();
        self.orders.insert(order.clone()).await?;

        let (flags, rule_failures) = self.run_rules(&order).await?;
        let assessment = assess(&flags, order.is_negotiated(), &self.policy);
        let security = SecurityInfo {
            risk_score: assessment.base_score,
            risk_level: assessment.level,
            risk_reasons: assessment.reasons.clone(),
        };
        let requires_approval =
            !flags.is_empty() && assessment.level >= self.policy.review_threshold;

        if let Err(err) = self
            .orders
            .record_evaluation(&order_id, security.clone(), flags.clone())
            .await
        {
            if requires_approval {
                return Err(EngineError::ReviewHold {
                    order_id,
                    source: err,
                });
            }
            log::warn!("security envelope write failed for clean order {order_id}: {err}");
        }

        let review = if requires_approval {
            match self.orders.mark_pending_review(&order_id).await {
                Ok(state) => state,
                Err(err) => {
                    return Err(EngineError::ReviewHold {
                        order_id,
                        source: err,
                    })
                }
            }
        } else {
            ReviewState::NotRequired
        };

        Ok(Evaluation {
            assessment,
            security,
            flags,
            requires_approval,
            review,
            rule_failures,
        })
    }

    /// Re-runs the rule set against a stored order and reports every rule's
    /// outcome, flag or isolated error. Persists nothing and never touches
    /// the review gate.
    pub async fn debug_order(&self, order_id: &str) -> Result<DebugReport, EngineError> {
        let stored = self
            .orders
            .get(order_id)
            .await?
            .ok_or_else(|| EngineError::OrderNotFound(order_id.to_string()))?;
        let order = stored.order;

        let velocity = self.velocity_for(&order).await?;
        let hits = self.watchlist_hits(&order).await?;
        let ctx = RuleContext {
            order: &order,
            velocity_in_window: velocity,
            watchlist_hits: &hits,
            policy: &self.policy,
        };

        let mut findings = Vec::with_capacity(self.rules.len());
        let mut flags = Vec::new();
        for rule in &self.rules {
            match rule.evaluate(&ctx) {
                Ok(flag) => {
                    if let Some(f) = &flag {
                        flags.push(f.clone());
                    }
                    findings.push(RuleFinding {
                        rule: rule.name(),
                        flag,
                        error: None,
                    });
                }
                Err(err) => findings.push(RuleFinding {
                    rule: rule.name(),
                    flag: None,
                    error: Some(err.to_string()),
                }),
            }
        }

        let assessment = assess(&flags, order.is_negotiated(), &self.policy);
        Ok(DebugReport {
            order_id: order_id.to_string(),
            findings,
            assessment,
        })
    }

    async fn run_rules(&self, order: &Order) -> Result<(Vec<Flag>, u32), EngineError> {
        let velocity = self.velocity_for(order).await?;
        let hits = self.watchlist_hits(order).await?;
        let ctx = RuleContext {
            order,
            velocity_in_window: velocity,
            watchlist_hits: &hits,
            policy: &self.policy,
        };

        let mut flags = Vec::new();
        let mut failures = 0;
        for rule in &self.rules {
            match rule.evaluate(&ctx) {
                Ok(Some(flag)) => flags.push(flag),
                Ok(None) => {}
                // One broken rule never blocks checkout or the other rules.
                Err(err) => {
                    failures += 1;
                    log::warn!(
                        "rule {} failed on order {}: {err}",
                        rule.name(),
                        order.order_id
                    );
                }
            }
        }
        Ok((flags, failures))
    }

    /// Window count inclusive of the order under evaluation.
    async fn velocity_for(&self, order: &Order) -> Result<u32, EngineError> {
        let tracker = VelocityTracker::new(Arc::clone(&self.orders));
        let window = Duration::hours(self.policy.velocity_window_hours);
        let prior = tracker
            .count_in_window(&order.uid, order.ordered_at, window, &order.order_id)
            .await?;
        Ok(prior + 1)
    }

    async fn watchlist_hits(&self, order: &Order) -> Result<Vec<WatchlistEntry>, EngineError> {
        let mut hits = Vec::new();
        let uid_kind = match order.role {
            PurchaserRole::Client => WatchlistKind::User,
            PurchaserRole::Vendor => WatchlistKind::Vendor,
        };
        if let Some(entry) = self.watchlist.lookup(uid_kind, &order.uid).await? {
            hits.push(entry);
        }
        if let Some(device) = &order.device_fingerprint {
            if let Some(entry) = self.watchlist.lookup(WatchlistKind::Device, device).await? {
                hits.push(entry);
            }
        }
        if let Some(ip) = &order.ip_address {
            if let Some(entry) = self.watchlist.lookup(WatchlistKind::Ip, ip).await? {
                hits.push(entry);
            }
        }
        Ok(hits)
    }
}
