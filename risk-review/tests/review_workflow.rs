use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use risk_core::{
    Flag, Negotiated, Order, OrderItem, PurchaserRole, ReviewState, RiskLevel, RiskPolicy,
    SecurityInfo, Severity,
};
use risk_engine::{InMemoryOrderStore, OrderStore, StoredOrder};
use risk_review::{
    dashboard_summary, group_pending, NotificationSink, ReviewAction, ReviewEvent, ReviewOutcome,
    ReviewService,
};

#[derive(Default)]
struct CapturingSink {
    events: Mutex<Vec<ReviewEvent>>,
}

#[async_trait]
impl NotificationSink for CapturingSink {
    async fn notify(&self, event: ReviewEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl CapturingSink {
    fn events(&self) -> Vec<ReviewEvent> {
        self.events.lock().unwrap().clone()
    }
}

fn order(id: &str, uid: &str, at: DateTime<Utc>) -> Order {
    Order {
        order_id: id.into(),
        order_number: format!("ORD-{id}"),
        uid: uid.into(),
        role: PurchaserRole::Client,
        total: 120.0,
        items: vec![OrderItem {
            product_id: "p1".into(),
            name: "Irrigation Kit".into(),
            quantity: 2,
            unit_price: 60.0,
        }],
        negotiated: None,
        device_fingerprint: None,
        ip_address: None,
        ordered_at: at,
    }
}

async fn pending_order(store: &InMemoryOrderStore, id: &str, uid: &str, at: DateTime<Utc>) {
    store.insert(order(id, uid, at)).await.unwrap();
    store
        .record_evaluation(
            id,
            SecurityInfo {
                risk_score: 60,
                risk_level: RiskLevel::High,
                risk_reasons: vec!["bulk_hoarding".into()],
            },
            vec![Flag::new("bulk_hoarding", Severity::High, "over threshold")],
        )
        .await
        .unwrap();
    store.mark_pending_review(id).await.unwrap();
}

fn service(store: Arc<InMemoryOrderStore>, sink: Arc<CapturingSink>) -> ReviewService {
    ReviewService::new(store as Arc<dyn OrderStore>, sink as Arc<dyn NotificationSink>)
}

#[tokio::test]
async fn approving_twice_preserves_the_first_reviewer() {
    let store = Arc::new(InMemoryOrderStore::new());
    let sink = Arc::new(CapturingSink::default());
    pending_order(&store, "o1", "u1", Utc::now()).await;
    let service = service(Arc::clone(&store), Arc::clone(&sink));

    let approve = ReviewAction::Approve {
        reason: "verified with purchaser".into(),
        notes: None,
    };
    let first = service.review("o1", &approve, "admin1", Utc::now()).await.unwrap();
    assert!(matches!(
        first,
        ReviewOutcome::Applied {
            state: ReviewState::Approved
        }
    ));

    // A later conflicting decision changes nothing and reports the original.
    let reject = ReviewAction::Reject {
        reason: "changed my mind".into(),
        notes: None,
    };
    let second = service.review("o1", &reject, "admin2", Utc::now()).await.unwrap();
    match second {
        ReviewOutcome::AlreadyFinalized { state, record } => {
            assert_eq!(state, ReviewState::Approved);
            assert_eq!(record.reviewed_by, "admin1");
            assert_eq!(record.reason, "verified with purchaser");
        }
        other => panic!("expected AlreadyFinalized, got {other:?}"),
    }

    let stored = store.get("o1").await.unwrap().unwrap();
    assert_eq!(stored.review, ReviewState::Approved);
    assert_eq!(stored.decision.unwrap().reviewed_by, "admin1");

    // Only the applied decision emitted an event.
    assert_eq!(sink.events().len(), 1);
}

#[tokio::test]
async fn rejection_notifies_the_purchaser() {
    let store = Arc::new(InMemoryOrderStore::new());
    let sink = Arc::new(CapturingSink::default());
    pending_order(&store, "o1", "u7", Utc::now()).await;
    let service = service(Arc::clone(&store), Arc::clone(&sink));

    let reject = ReviewAction::Reject {
        reason: "stock manipulation".into(),
        notes: Some("third strike".into()),
    };
    service.review("o1", &reject, "admin1", Utc::now()).await.unwrap();

    let events = sink.events();
    assert_eq!(events.len(), 1);
    match &events[0] {
        ReviewEvent::OrderRejected { order_id, uid, reason } => {
            assert_eq!(order_id, "o1");
            assert_eq!(uid, "u7");
            assert_eq!(reason, "stock manipulation");
        }
        other => panic!("expected OrderRejected, got {other:?}"),
    }

    let stored = store.get("o1").await.unwrap().unwrap();
    let decision = stored.decision.unwrap();
    assert_eq!(decision.notes.as_deref(), Some("third strike"));
}

#[tokio::test]
async fn unreviewed_and_missing_orders_are_noops() {
    let store = Arc::new(InMemoryOrderStore::new());
    let sink = Arc::new(CapturingSink::default());
    store.insert(order("clean", "u1", Utc::now())).await.unwrap();
    let service = service(Arc::clone(&store), Arc::clone(&sink));

    let approve = ReviewAction::Approve {
        reason: "n/a".into(),
        notes: None,
    };
    let on_clean = service.review("clean", &approve, "admin1", Utc::now()).await.unwrap();
    assert!(matches!(
        on_clean,
        ReviewOutcome::NotRequired {
            state: ReviewState::NotRequired
        }
    ));

    let on_missing = service.review("ghost", &approve, "admin1", Utc::now()).await.unwrap();
    assert!(matches!(on_missing, ReviewOutcome::NotFound));

    assert!(sink.events().is_empty());
    let stored = store.get("clean").await.unwrap().unwrap();
    assert_eq!(stored.review, ReviewState::NotRequired);
}

#[tokio::test]
async fn account_actions_leave_orders_untouched() {
    let store = Arc::new(InMemoryOrderStore::new());
    let sink = Arc::new(CapturingSink::default());
    pending_order(&store, "o1", "u9", Utc::now()).await;
    let service = service(Arc::clone(&store), Arc::clone(&sink));

    service
        .account_action(
            &risk_review::AccountAction::Ban {
                uid: "u9".into(),
                reason: "fraud ring".into(),
            },
            "admin1",
        )
        .await;
    service
        .account_action(
            &risk_review::AccountAction::RequireReverification { uid: "u9".into() },
            "admin1",
        )
        .await;

    let events = sink.events();
    assert!(matches!(events[0], ReviewEvent::AccountBanned { .. }));
    assert!(matches!(events[1], ReviewEvent::ReverificationRequired { .. }));

    // The pending order is still waiting on its own decision.
    let stored = store.get("o1").await.unwrap().unwrap();
    assert_eq!(stored.review, ReviewState::Pending);
}

fn stored(
    id: &str,
    uid: &str,
    base_score: u8,
    negotiated: bool,
    at: DateTime<Utc>,
) -> StoredOrder {
    let mut order = order(id, uid, at);
    if negotiated {
        order.negotiated = Some(Negotiated {
            is_negotiated: true,
            delta_pct: None,
        });
    }
    let policy = RiskPolicy::default();
    StoredOrder {
        order,
        security: Some(SecurityInfo {
            risk_score: base_score,
            risk_level: policy.level_for(base_score),
            risk_reasons: vec!["bulk_hoarding".into()],
        }),
        flags: vec![Flag::new("bulk_hoarding", Severity::High, "over threshold")],
        review: ReviewState::Pending,
        decision: None,
    }
}

#[test]
fn queue_groups_by_purchaser_worst_first() {
    let policy = RiskPolicy::default();
    let now = Utc::now();

    let pending = vec![
        stored("a1", "alice", 60, false, now - Duration::hours(3)),
        stored("a2", "alice", 85, false, now - Duration::hours(2)),
        stored("b1", "bob", 60, false, now - Duration::hours(1)),
        // Carol's base matches Bob's but her negotiated order scores lower.
        stored("c1", "carol", 60, true, now),
    ];

    let groups = group_pending(&pending, &policy);
    assert_eq!(groups.len(), 3);

    assert_eq!(groups[0].uid, "alice");
    assert_eq!(groups[0].max_risk, 85);
    assert_eq!(groups[0].highest_level, RiskLevel::Critical);
    assert_eq!(groups[0].flag_count, 2);
    // Newest first inside the group.
    assert_eq!(groups[0].orders[0].order_id, "a2");

    assert_eq!(groups[1].uid, "bob");
    assert_eq!(groups[1].max_risk, 60);

    // The queue consumes the same adjusted score the gate did.
    assert_eq!(groups[2].uid, "carol");
    assert_eq!(groups[2].max_risk, 50);
    assert_eq!(groups[2].orders[0].risk_level, RiskLevel::Medium);
}

#[test]
fn queue_tie_breaks_on_most_recent_order() {
    let policy = RiskPolicy::default();
    let now = Utc::now();

    let pending = vec![
        stored("a1", "alice", 60, false, now - Duration::hours(5)),
        stored("b1", "bob", 60, false, now - Duration::hours(1)),
    ];

    let groups = group_pending(&pending, &policy);
    assert_eq!(groups[0].uid, "bob");
    assert_eq!(groups[1].uid, "alice");
}

#[test]
fn dashboard_counts_windows_and_thresholds() {
    let now = Utc::now();
    let mut orders = Vec::new();

    // Two flagged in the last day, one older flagged order.
    orders.push(stored("f1", "alice", 60, false, now - Duration::hours(2)));
    orders.push(stored("f2", "bob", 85, false, now - Duration::hours(20)));
    orders.push(stored("f3", "carol", 60, false, now - Duration::days(3)));

    // One IP with eleven orders this week.
    for i in 0..11 {
        let mut s = stored(&format!("ip{i}"), &format!("u{i}"), 0, false, now - Duration::days(2));
        s.order.ip_address = Some("10.0.0.9".into());
        s.flags.clear();
        s.review = ReviewState::NotRequired;
        orders.push(s);
    }

    // One purchaser with four orders today.
    for i in 0..4 {
        let mut s = stored(&format!("r{i}"), "dave", 0, false, now - Duration::hours(i));
        s.flags.clear();
        s.review = ReviewState::NotRequired;
        orders.push(s);
    }

    let summary = dashboard_summary(&orders, now);
    assert_eq!(summary.recent_suspicious, 2);
    assert_eq!(summary.total_pending, 3);
    assert_eq!(summary.suspicious_ip_count, 1);
    assert_eq!(summary.rapid_order_users, 1);
}
