//! The registered heuristic rule set, one file per rule.
//!
//! Negotiated pricing is deliberately not a rule: it feeds the score
//! *reduction* in `risk_core::adjusted_score`, never a flag.

mod bulk_hoarding;
mod high_value;
mod rapid_ordering;
mod watchlist_match;

pub use bulk_hoarding::BulkHoarding;
pub use high_value::HighValue;
pub use rapid_ordering::RapidOrdering;
pub use watchlist_match::WatchlistMatch;

use crate::rule::Rule;

/// The production rule set, in registration order.
pub fn default_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(BulkHoarding),
        Box::new(RapidOrdering),
        Box::new(WatchlistMatch),
        Box::new(HighValue),
    ]
}
