//! The idempotent review service.
//!
//! A decision moves a pending order to its terminal state exactly once and
//! records who decided, when, and why. Replays and conflicting decisions
//! return the preserved original record instead of mutating anything.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use risk_core::{ReviewRecord, ReviewState};
use risk_engine::{OrderStore, ReviewTransition};
use serde::Serialize;

use crate::error::ReviewError;
use crate::ops::{AccountAction, ReviewAction};

/// Side effects a decision fans out to collaborating systems.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReviewEvent {
    OrderApproved {
        order_id: String,
        uid: String,
    },
    /// A rejection also asks fulfillment to restore the reserved stock.
    OrderRejected {
        order_id: String,
        uid: String,
        reason: String,
    },
    AccountBanned {
        uid: String,
        by: String,
        reason: String,
    },
    ReverificationRequired {
        uid: String,
        by: String,
    },
}

/// Delivery contract for review side effects. Delivery itself lives with
/// the collaborator; failures here never roll back the decision.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, event: ReviewEvent);
}

/// Default sink: structured log lines only.
pub struct LogNotificationSink;

#[async_trait]
impl NotificationSink for LogNotificationSink {
    async fn notify(&self, event: ReviewEvent) {
        match serde_json::to_string(&event) {
            Ok(json) => log::info!("review event: {json}"),
            Err(err) => log::warn!("unserializable review event: {err}"),
        }
    }
}

/// Outcome of applying a [`ReviewAction`].
#[derive(Clone, Debug)]
pub enum ReviewOutcome {
    /// The decision took effect.
    Applied { state: ReviewState },
    /// The order was already decided; the original audit record is returned
    /// untouched, whoever decided first.
    AlreadyFinalized {
        state: ReviewState,
        record: ReviewRecord,
    },
    /// The order never entered review; the action is a no-op.
    NotRequired { state: ReviewState },
    NotFound,
}

pub struct ReviewService {
    orders: Arc<dyn OrderStore>,
    notifications: Arc<dyn NotificationSink>,
}

impl ReviewService {
    pub fn new(orders: Arc<dyn OrderStore>, notifications: Arc<dyn NotificationSink>) -> Self {
        Self {
            orders,
            notifications,
        }
    }

    /// Applies a terminal decision to one order.
    pub async fn review(
        &self,
        order_id: &str,
        action: &ReviewAction,
        admin_uid: &str,
        now: DateTime<Utc>,
    ) -> Result<ReviewOutcome, ReviewError> {
        let state = match action {
            ReviewAction::Approve { .. } => ReviewState::Approved,
            ReviewAction::Reject { .. } => ReviewState::Rejected,
        };
        let record = ReviewRecord {
            reviewed_by: admin_uid.to_string(),
            reviewed_at: now,
            reason: action.reason().to_string(),
            notes: action.notes().map(str::to_string),
        };

        let transition = self.orders.decide_review(order_id, state, record).await?;
        match transition {
            ReviewTransition::Applied => {
                self.emit_decision(order_id, action).await?;
                Ok(ReviewOutcome::Applied { state })
            }
            ReviewTransition::AlreadyDecided(state, record) => {
                Ok(ReviewOutcome::AlreadyFinalized { state, record })
            }
            ReviewTransition::NotPending(state) => Ok(ReviewOutcome::NotRequired { state }),
            ReviewTransition::NotFound => Ok(ReviewOutcome::NotFound),
        }
    }

    /// Account actions stand alone; they never touch order review state.
    pub async fn account_action(&self, action: &AccountAction, admin_uid: &str) {
        let event = match action {
            AccountAction::Ban { uid, reason } => ReviewEvent::AccountBanned {
                uid: uid.clone(),
                by: admin_uid.to_string(),
                reason: reason.clone(),
            },
            AccountAction::RequireReverification { uid } => ReviewEvent::ReverificationRequired {
                uid: uid.clone(),
                by: admin_uid.to_string(),
            },
        };
        self.notifications.notify(event).await;
    }

    async fn emit_decision(
        &self,
        order_id: &str,
        action: &ReviewAction,
    ) -> Result<(), ReviewError> {
        let uid = match self.orders.get(order_id).await? {
            Some(stored) => stored.order.uid,
            None => return Ok(()),
        };
        let event = match action {
            ReviewAction::Approve { .. } => ReviewEvent::OrderApproved {
                order_id: order_id.to_string(),
                uid,
            },
            ReviewAction::Reject { reason, .. } => ReviewEvent::OrderRejected {
                order_id: order_id.to_string(),
                uid,
                reason: reason.clone(),
            },
        };
        self.notifications.notify(event).await;
        Ok(())
    }
}
