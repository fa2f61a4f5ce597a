use risk_core::{Flag, Severity};

use crate::rule::{Rule, RuleContext, RuleError};

/// Flags orders whose purchaser, device fingerprint, or IP is on the
/// admin-curated watchlist. Any hit is critical on its own.
pub struct WatchlistMatch;

impl Rule for WatchlistMatch {
    fn name(&self) -> &'static str {
        "watchlist_match"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Option<Flag>, RuleError> {
        let Some(hit) = ctx.watchlist_hits.first() else {
            return Ok(None);
        };
        let label = match hit.kind {
            risk_core::WatchlistKind::User => "user",
            risk_core::WatchlistKind::Vendor => "vendor",
            risk_core::WatchlistKind::Device => "device",
            risk_core::WatchlistKind::Ip => "ip",
        };
        Ok(Some(Flag::new(
            self.name(),
            Severity::Critical,
            format!("{label} {} is on the watchlist", hit.value),
        )))
    }
}
