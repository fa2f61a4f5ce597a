//! Admin-facing review workflow over the risk engine's stores.
//!
//! Decisions arrive as tagged [`ops::ReviewAction`] values, are applied
//! idempotently by the [`workflow::ReviewService`], and fan out side effects
//! through a notification sink. The queue and dashboard modules are pure
//! projections over stored orders, safe to recompute on every request.

pub mod cases;
pub mod dashboard;
pub mod error;
pub mod ops;
pub mod queue;
pub mod workflow;

pub use cases::CaseBook;
pub use dashboard::{dashboard_summary, DashboardSummary};
pub use error::ReviewError;
pub use ops::{AccountAction, ReviewAction};
pub use queue::{group_pending, PendingOrderSummary, PurchaserGroup};
pub use workflow::{LogNotificationSink, NotificationSink, ReviewEvent, ReviewOutcome, ReviewService};
