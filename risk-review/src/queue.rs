//! Pending-queue projection grouped by purchaser.
//!
//! Recomputed from stored orders on every call; ordering is deterministic
//! so repeated renders of the same data never reshuffle.

use chrono::{DateTime, Utc};
use risk_core::{adjusted_score, RiskLevel, RiskPolicy};
use risk_engine::StoredOrder;
use serde::Serialize;

/// One pending order as shown inside a purchaser group.
#[derive(Clone, Debug, Serialize)]
pub struct PendingOrderSummary {
    pub order_id: String,
    pub order_number: String,
    /// Negotiated-adjusted score, the same number the gate compared.
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub flags: Vec<String>,
    pub total: f64,
    pub ordered_at: DateTime<Utc>,
}

/// All of one purchaser's pending orders, with group-level rollups.
#[derive(Clone, Debug, Serialize)]
pub struct PurchaserGroup {
    pub uid: String,
    /// Worst adjusted score across the group's orders.
    pub max_risk: u8,
    pub highest_level: RiskLevel,
    pub flag_count: usize,
    pub total_value: f64,
    pub latest_order_at: DateTime<Utc>,
    pub orders: Vec<PendingOrderSummary>,
}

/// Groups pending orders by purchaser, worst risk first, ties broken by the
/// most recent order. Orders inside a group are newest first.
pub fn group_pending(pending: &[StoredOrder], policy: &RiskPolicy) -> Vec<PurchaserGroup> {
    let mut groups: Vec<PurchaserGroup> = Vec::new();

    for stored in pending {
        let base = stored.security.as_ref().map(|s| s.risk_score).unwrap_or(0);
        let score = adjusted_score(base, stored.order.is_negotiated(), policy);
        let summary = PendingOrderSummary {
            order_id: stored.order.order_id.clone(),
            order_number: stored.order.order_number.clone(),
            risk_score: score,
            risk_level: policy.level_for(score),
            flags: stored.flags.iter().map(|f| f.kind.clone()).collect(),
            total: stored.order.total,
            ordered_at: stored.order.ordered_at,
        };

        match groups.iter_mut().find(|g| g.uid == stored.order.uid) {
            Some(group) => {
                group.max_risk = group.max_risk.max(summary.risk_score);
                group.highest_level = group.highest_level.max(summary.risk_level);
                group.flag_count += summary.flags.len();
                group.total_value += summary.total;
                group.latest_order_at = group.latest_order_at.max(summary.ordered_at);
                group.orders.push(summary);
            }
            None => groups.push(PurchaserGroup {
                uid: stored.order.uid.clone(),
                max_risk: summary.risk_score,
                highest_level: summary.risk_level,
                flag_count: summary.flags.len(),
                total_value: summary.total,
                latest_order_at: summary.ordered_at,
                orders: vec![summary],
            }),
        }
    }

    for group in &mut groups {
        group.orders.sort_by(|a, b| b.ordered_at.cmp(&a.ordered_at));
    }
    groups.sort_by(|a, b| {
        b.max_risk
            .cmp(&a.max_risk)
            .then(b.latest_order_at.cmp(&a.latest_order_at))
    });
    groups
}
