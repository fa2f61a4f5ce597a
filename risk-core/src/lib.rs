//! Domain model for the order risk evaluation engine.
//!
//! This crate is pure: types, the tunable risk policy, and the flag-to-score
//! aggregation. Nothing here touches storage or a clock; callers pass
//! timestamps in, which keeps every function deterministic and directly
//! testable.

pub mod policy;
pub mod scoring;
pub mod types;

pub use policy::RiskPolicy;
pub use scoring::{adjusted_score, assess, RiskAssessment};
pub use types::{
    Case, CaseEntity, CaseEntityKind, CaseNote, CaseStatus, Flag, Negotiated, Order, OrderItem,
    PurchaserRole, ReviewRecord, ReviewState, RiskLevel, SecurityInfo, Severity, WatchlistEntry,
    WatchlistKind,
};
