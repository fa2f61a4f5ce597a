use risk_core::{Flag, Severity};

use crate::rule::{Rule, RuleContext, RuleError};

/// Flags purchasers placing more orders in the trailing window than the
/// policy allows. The window count is inclusive of the order under
/// evaluation, so with a threshold of 5 the sixth order fires and the
/// fifth does not.
pub struct RapidOrdering;

impl Rule for RapidOrdering {
    fn name(&self) -> &'static str {
        "rapid_ordering"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Option<Flag>, RuleError> {
        let threshold = ctx.policy.rapid_order_threshold;
        if ctx.velocity_in_window > threshold {
            Ok(Some(Flag::new(
                self.name(),
                Severity::High,
                format!(
                    "{} orders in {} h (threshold {})",
                    ctx.velocity_in_window, ctx.policy.velocity_window_hours, threshold
                ),
            )))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use risk_core::{Order, PurchaserRole, RiskPolicy};

    fn order() -> Order {
        Order {
            order_id: "o1".into(),
            order_number: "ORD-o1".into(),
            uid: "u1".into(),
            role: PurchaserRole::Client,
            total: 20.0,
            items: vec![],
            negotiated: None,
            device_fingerprint: None,
            ip_address: None,
            ordered_at: Utc::now(),
        }
    }

    #[test]
    fn fires_strictly_above_threshold() {
        let policy = RiskPolicy::default();
        let order = order();

        let at_threshold = RuleContext {
            order: &order,
            velocity_in_window: 5,
            watchlist_hits: &[],
            policy: &policy,
        };
        assert!(RapidOrdering.evaluate(&at_threshold).unwrap().is_none());

        let over = RuleContext {
            order: &order,
            velocity_in_window: 6,
            watchlist_hits: &[],
            policy: &policy,
        };
        let flag = RapidOrdering.evaluate(&over).unwrap().unwrap();
        assert_eq!(flag.severity, Severity::High);
    }
}
