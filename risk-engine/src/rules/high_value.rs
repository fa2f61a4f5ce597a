use risk_core::{Flag, Severity};

use crate::rule::{Rule, RuleContext, RuleError};

/// Flags orders whose total exceeds the policy's high-value threshold.
/// Worth a look on its own but not a strong fraud signal, so medium.
pub struct HighValue;

impl Rule for HighValue {
    fn name(&self) -> &'static str {
        "high_value"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Option<Flag>, RuleError> {
        if ctx.order.total > ctx.policy.high_value_threshold {
            Ok(Some(Flag::new(
                self.name(),
                Severity::Medium,
                format!(
                    "order total {:.2} exceeds {:.0}",
                    ctx.order.total, ctx.policy.high_value_threshold
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

    fn order_with_total(total: f64) -> Order {
        Order {
            order_id: "o1".into(),
            order_number: "ORD-o1".into(),
            uid: "u1".into(),
            role: PurchaserRole::Vendor,
            total,
            items: vec![],
            negotiated: None,
            device_fingerprint: None,
            ip_address: None,
            ordered_at: Utc::now(),
        }
    }

    #[test]
    fn fires_above_threshold() {
        let policy = RiskPolicy::default();

        let big = order_with_total(20_000.0);
        let ctx = RuleContext {
            order: &big,
            velocity_in_window: 1,
            watchlist_hits: &[],
            policy: &policy,
        };
        let flag = HighValue.evaluate(&ctx).unwrap().unwrap();
        assert_eq!(flag.severity, Severity::Medium);

        let exactly = order_with_total(15_000.0);
        let ctx = RuleContext {
            order: &exactly,
            velocity_in_window: 1,
            watchlist_hits: &[],
            policy: &policy,
        };
        assert!(HighValue.evaluate(&ctx).unwrap().is_none());
    }
}
