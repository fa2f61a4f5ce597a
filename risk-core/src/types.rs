use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Severity and risk level
// ---------------------------------------------------------------------------

/// Severity of a single suspicious-pattern flag.
///
/// Ordered: `Low < Medium < High < Critical`, so the worst flag in a set is
/// simply the maximum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// Categorical bucket derived from the adjusted risk score.
///
/// `None` is reserved for a score of exactly zero (no flags fired).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl Default for RiskLevel {
    fn default() -> Self {
        RiskLevel::None
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::None => write!(f, "none"),
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
            RiskLevel::Critical => write!(f, "critical"),
        }
    }
}

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

/// A discrete suspicious-pattern finding attached to an order by one rule.
///
/// Flags are immutable once attached; a re-evaluation produces a whole new
/// flag set rather than mutating history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Flag {
    /// Rule name that produced the flag, e.g. `bulk_hoarding`.
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: Severity,
    pub description: String,
}

impl Flag {
    pub fn new(kind: impl Into<String>, severity: Severity, description: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            severity,
            description: description.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// Who placed the order. Vendors buy from each other on the marketplace,
/// so both roles pass through the same risk evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaserRole {
    Client,
    Vendor,
}

/// One line item of an order, snapshotted at checkout.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: f64,
}

/// Negotiated-pricing envelope. Presence of a successful negotiation lowers
/// the perceived risk of the order (see [`crate::scoring::adjusted_score`]).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Negotiated {
    pub is_negotiated: bool,
    /// Discount relative to list price, as a percentage, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta_pct: Option<f64>,
}

/// An order as seen by the risk engine at checkout time.
///
/// The engine owns only the security envelope written back for it; the rest
/// of the order is an external entity referenced by id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub order_number: String,
    /// Purchaser uid.
    pub uid: String,
    pub role: PurchaserRole,
    pub total: f64,
    pub items: Vec<OrderItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negotiated: Option<Negotiated>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_fingerprint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    pub ordered_at: DateTime<Utc>,
}

impl Order {
    /// Total units across all line items.
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Largest single line-item quantity, 0 for an empty order.
    pub fn max_line_quantity(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).max().unwrap_or(0)
    }

    pub fn is_negotiated(&self) -> bool {
        self.negotiated.as_ref().map(|n| n.is_negotiated).unwrap_or(false)
    }
}

/// Security envelope recomputed at every checkout evaluation.
///
/// `risk_score` is the base (pre-adjustment) score; consumers obtain the
/// displayed/gated score through the single shared adjustment function so
/// the dashboard and the gate can never disagree.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityInfo {
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub risk_reasons: Vec<String>,
}

// ---------------------------------------------------------------------------
// Review
// ---------------------------------------------------------------------------

/// Review-gate state of one order.
///
/// `Pending` is entered exactly once, at checkout time; `Approved` and
/// `Rejected` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewState {
    NotRequired,
    Pending,
    Approved,
    Rejected,
}

impl ReviewState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReviewState::Approved | ReviewState::Rejected)
    }
}

/// Audit record of a terminal review decision.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub reviewed_by: String,
    pub reviewed_at: DateTime<Utc>,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Watchlist
// ---------------------------------------------------------------------------

/// Identity kinds an admin can put on the watchlist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchlistKind {
    User,
    Vendor,
    Device,
    Ip,
}

/// One admin-curated known-risky identity, unique on (kind, value).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WatchlistEntry {
    #[serde(rename = "type")]
    pub kind: WatchlistKind,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub added_by: String,
    pub added_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Cases
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    Open,
    Investigating,
    Resolved,
    Closed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseEntityKind {
    User,
    Vendor,
    Device,
    Ip,
    Order,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CaseEntity {
    #[serde(rename = "type")]
    pub kind: CaseEntityKind,
    pub value: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CaseNote {
    pub at: DateTime<Utc>,
    pub by: String,
    pub text: String,
}

/// An investigation aggregating related flagged signals under one record.
///
/// Cases are created by admins when multiple signals are judged related,
/// and are never deleted automatically.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Case {
    pub case_id: String,
    pub title: String,
    pub status: CaseStatus,
    pub priority: Severity,
    pub entities: Vec<CaseEntity>,
    pub orders: Vec<String>,
    pub notes: Vec<CaseNote>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
