//! Rolling order-velocity counts per purchaser.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::store::{OrderStore, StoreError};

/// Counts a purchaser's orders inside a trailing window.
///
/// The count is derived from stored orders at query time, never cached, so
/// it reflects every order regardless of its eventual review outcome. A
/// purchaser with no history counts zero.
pub struct VelocityTracker {
    orders: Arc<dyn OrderStore>,
}

impl VelocityTracker {
    pub fn new(orders: Arc<dyn OrderStore>) -> Self {
        Self { orders }
    }

    /// Orders by `uid` with `ordered_at` in `[now - window, now]`, excluding
    /// `exclude_order_id` (the order under evaluation, already persisted).
    pub async fn count_in_window(
        &self,
        uid: &str,
        now: DateTime<Utc>,
        window: Duration,
        exclude_order_id: &str,
    ) -> Result<u32, StoreError> {
        let cutoff = now - window;
        let history = self.orders.history_for(uid).await?;
        let count = history
            .iter()
            .filter(|s| s.order.order_id != exclude_order_id)
            .filter(|s| s.order.ordered_at >= cutoff && s.order.ordered_at <= now)
            .count();
        Ok(count as u32)
    }
}
