//! Checkout-time risk evaluation.
//!
//! An [`engine::RiskEngine`] runs the registered [`rule::Rule`] set against
//! an order, aggregates flags into a score via `risk_core`, persists the
//! security envelope, and flips the review gate for orders that cross the
//! policy threshold. Storage is behind async trait contracts so the
//! in-memory stores here can be swapped for a real database.

pub mod engine;
pub mod rule;
pub mod rules;
pub mod store;
pub mod velocity;

pub use engine::{DebugReport, EngineError, Evaluation, RiskEngine};
pub use rule::{Rule, RuleContext, RuleError, RuleFinding};
pub use store::{
    InMemoryOrderStore, InMemoryWatchlistStore, OrderStore, ReviewTransition, StoreError,
    StoredOrder, WatchlistStore,
};
pub use velocity::VelocityTracker;
