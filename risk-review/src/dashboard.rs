//! Fraud-dashboard rollups.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use risk_core::ReviewState;
use risk_engine::StoredOrder;
use serde::Serialize;

/// Window for the recent-suspicious and rapid-order counts.
const RECENT_WINDOW_HOURS: i64 = 24;
/// Window for the suspicious-IP count.
const IP_WINDOW_DAYS: i64 = 7;
/// An IP placing more orders than this in the window is suspicious.
const IP_ORDER_THRESHOLD: usize = 10;
/// A purchaser placing more orders than this in 24 h is a rapid orderer.
const RAPID_USER_THRESHOLD: usize = 3;

#[derive(Clone, Debug, Serialize)]
pub struct DashboardSummary {
    /// Flagged orders placed in the last 24 h.
    pub recent_suspicious: usize,
    /// Orders currently awaiting a decision.
    pub total_pending: usize,
    /// Distinct IPs with more than 10 orders in 7 d.
    pub suspicious_ip_count: usize,
    /// Distinct purchasers with more than 3 orders in 24 h.
    pub rapid_order_users: usize,
}

pub fn dashboard_summary(orders: &[StoredOrder], now: DateTime<Utc>) -> DashboardSummary {
    let recent_cutoff = now - Duration::hours(RECENT_WINDOW_HOURS);
    let ip_cutoff = now - Duration::days(IP_WINDOW_DAYS);

    let recent_suspicious = orders
        .iter()
        .filter(|s| s.order.ordered_at >= recent_cutoff && !s.flags.is_empty())
        .count();

    let total_pending = orders
        .iter()
        .filter(|s| s.review == ReviewState::Pending)
        .count();

    let mut per_ip: HashMap<&str, usize> = HashMap::new();
    for stored in orders {
        if stored.order.ordered_at < ip_cutoff {
            continue;
        }
        if let Some(ip) = stored.order.ip_address.as_deref() {
            *per_ip.entry(ip).or_default() += 1;
        }
    }
    let suspicious_ip_count = per_ip.values().filter(|&&n| n > IP_ORDER_THRESHOLD).count();

    let mut per_user: HashMap<&str, usize> = HashMap::new();
    for stored in orders {
        if stored.order.ordered_at >= recent_cutoff {
            *per_user.entry(stored.order.uid.as_str()).or_default() += 1;
        }
    }
    let rapid_order_users = per_user
        .values()
        .filter(|&&n| n > RAPID_USER_THRESHOLD)
        .count();

    DashboardSummary {
        recent_suspicious,
        total_pending,
        suspicious_ip_count,
        rapid_order_users,
    }
}
