use risk_core::{Flag, Severity};

use crate::rule::{Rule, RuleContext, RuleError};

/// Flags any single line item whose quantity exceeds the policy threshold.
/// Hoarding scarce stock crowds out other purchasers, so this is judged per
/// line, not on the order total.
pub struct BulkHoarding;

impl Rule for BulkHoarding {
    fn name(&self) -> &'static str {
        "bulk_hoarding"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Option<Flag>, RuleError> {
        let threshold = ctx.policy.bulk_quantity_threshold;
        let worst = ctx
            .order
            .items
            .iter()
            .filter(|i| i.quantity > threshold)
            .max_by_key(|i| i.quantity);
        Ok(worst.map(|item| {
            Flag::new(
                self.name(),
                Severity::High,
                format!(
                    "{} units of {} in a single line (threshold {})",
                    item.quantity, item.name, threshold
                ),
            )
        }))
    }
}
