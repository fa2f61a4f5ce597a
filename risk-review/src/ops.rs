//! Wire shapes for admin actions.
//!
//! Actions arrive as tagged JSON so an unknown action name fails to parse
//! instead of silently doing nothing.

use serde::{Deserialize, Serialize};

/// A terminal decision on one pending order.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "action", content = "params", rename_all = "snake_case")]
pub enum ReviewAction {
    Approve {
        reason: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        notes: Option<String>,
    },
    Reject {
        reason: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        notes: Option<String>,
    },
}

impl ReviewAction {
    pub fn reason(&self) -> &str {
        match self {
            ReviewAction::Approve { reason, .. } | ReviewAction::Reject { reason, .. } => reason,
        }
    }

    pub fn notes(&self) -> Option<&str> {
        match self {
            ReviewAction::Approve { notes, .. } | ReviewAction::Reject { notes, .. } => {
                notes.as_deref()
            }
        }
    }
}

/// An account-level action, independent of any order transition.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AccountAction {
    Ban { uid: String, reason: String },
    RequireReverification { uid: String },
}
