//! Storage contracts and in-memory implementations.
//!
//! The engine talks to orders and the watchlist only through these traits.
//! The in-memory stores guard state with a `std::sync::Mutex`; a poisoned
//! lock is recovered with a warning since every critical section leaves the
//! maps structurally valid.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use risk_core::{
    Flag, Order, ReviewRecord, ReviewState, SecurityInfo, WatchlistEntry, WatchlistKind,
};
use thiserror::Error;

/// Every failure mode of a store has a named variant.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("order {0} not found")]
    OrderNotFound(String),
    #[error("order {0} already exists")]
    DuplicateOrder(String),
    #[error("watchlist entry ({kind:?}, {value}) already exists")]
    DuplicateWatchlistEntry { kind: WatchlistKind, value: String },
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

/// An order together with everything the risk engine has recorded about it.
#[derive(Clone, Debug)]
pub struct StoredOrder {
    pub order: Order,
    /// Present once the order has been evaluated at least once.
    pub security: Option<SecurityInfo>,
    pub flags: Vec<Flag>,
    pub review: ReviewState,
    /// Terminal decision audit record, if one has been made.
    pub decision: Option<ReviewRecord>,
}

impl StoredOrder {
    fn new(order: Order) -> Self {
        Self {
            order,
            security: None,
            flags: Vec::new(),
            review: ReviewState::NotRequired,
            decision: None,
        }
    }
}

/// Result of attempting a terminal review decision.
#[derive(Clone, Debug)]
pub enum ReviewTransition {
    /// The decision was recorded.
    Applied,
    /// A decision already exists; the original record is preserved and
    /// returned untouched.
    AlreadyDecided(ReviewState, ReviewRecord),
    /// The order never entered review.
    NotPending(ReviewState),
    NotFound,
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, order: Order) -> Result<(), StoreError>;

    async fn get(&self, order_id: &str) -> Result<Option<StoredOrder>, StoreError>;

    /// All stored orders for one purchaser, any review state.
    async fn history_for(&self, uid: &str) -> Result<Vec<StoredOrder>, StoreError>;

    /// Overwrites the order's security envelope and flag set.
    async fn record_evaluation(
        &self,
        order_id: &str,
        security: SecurityInfo,
        flags: Vec<Flag>,
    ) -> Result<(), StoreError>;

    /// Moves the order into `Pending` if and only if it is `NotRequired`.
    /// Returns the review state after the call; an order already pending or
    /// decided is left alone.
    async fn mark_pending_review(&self, order_id: &str) -> Result<ReviewState, StoreError>;

    /// Records a terminal decision. First decision wins; the check and the
    /// write happen under one lock.
    async fn decide_review(
        &self,
        order_id: &str,
        state: ReviewState,
        record: ReviewRecord,
    ) -> Result<ReviewTransition, StoreError>;

    async fn pending_orders(&self) -> Result<Vec<StoredOrder>, StoreError>;

    async fn all_orders(&self) -> Result<Vec<StoredOrder>, StoreError>;
}

#[async_trait]
pub trait WatchlistStore: Send + Sync {
    async fn lookup(
        &self,
        kind: WatchlistKind,
        value: &str,
    ) -> Result<Option<WatchlistEntry>, StoreError>;

    async fn insert(&self, entry: WatchlistEntry) -> Result<(), StoreError>;

    async fn remove(&self, kind: WatchlistKind, value: &str) -> Result<bool, StoreError>;

    async fn entries(&self) -> Result<Vec<WatchlistEntry>, StoreError>;
}

fn recover<'a, T>(lock: &'a Mutex<T>, what: &str) -> MutexGuard<'a, T> {
    match lock.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("{what} lock poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

/// Map-backed order store for tests and the fixture-replay binary.
#[derive(Default)]
pub struct InMemoryOrderStore {
    orders: Mutex<HashMap<String, StoredOrder>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: Order) -> Result<(), StoreError> {
        let mut orders = recover(&self.orders, "order store");
        if orders.contains_key(&order.order_id) {
            return Err(StoreError::DuplicateOrder(order.order_id));
        }
        orders.insert(order.order_id.clone(), StoredOrder::new(order));
        Ok(())
    }

    async fn get(&self, order_id: &str) -> Result<Option<StoredOrder>, StoreError> {
        Ok(recover(&self.orders, "order store").get(order_id).cloned())
    }

    async fn history_for(&self, uid: &str) -> Result<Vec<StoredOrder>, StoreError> {
        Ok(recover(&self.orders, "order store")
            .values()
            .filter(|s| s.order.uid == uid)
            .cloned()
            .collect())
    }

    async fn record_evaluation(
        &self,
        order_id: &str,
        security: SecurityInfo,
        flags: Vec<Flag>,
    ) -> Result<(), StoreError> {
        let mut orders = recover(&self.orders, "order store");
        let stored = orders
            .get_mut(order_id)
            .ok_or_else(|| StoreError::OrderNotFound(order_id.to_string()))?;
        stored.security = Some(security);
        stored.flags = flags;
        Ok(())
    }

    async fn mark_pending_review(&self, order_id: &str) -> Result<ReviewState, StoreError> {
        let mut orders = recover(&self.orders, "order store");
        let stored = orders
            .get_mut(order_id)
            .ok_or_else(|| StoreError::OrderNotFound(order_id.to_string()))?;
        if stored.review == ReviewState::NotRequired {
            stored.review = ReviewState::Pending;
        }
        Ok(stored.review)
    }

    async fn decide_review(
        &self,
        order_id: &str,
        state: ReviewState,
        record: ReviewRecord,
    ) -> Result<ReviewTransition, StoreError> {
        debug_assert!(state.is_terminal());
        let mut orders = recover(&self.orders, "order store");
        let Some(stored) = orders.get_mut(order_id) else {
            return Ok(ReviewTransition::NotFound);
        };
        match stored.review {
            ReviewState::Pending => {
                stored.review = state;
                stored.decision = Some(record);
                Ok(ReviewTransition::Applied)
            }
            s if s.is_terminal() => match stored.decision.clone() {
                Some(original) => Ok(ReviewTransition::AlreadyDecided(s, original)),
                // A terminal state always carries its audit record; a missing
                // one means the backing data is corrupt.
                None => Err(StoreError::Unavailable(format!(
                    "order {order_id} decided without an audit record"
                ))),
            },
            s => Ok(ReviewTransition::NotPending(s)),
        }
    }

    async fn pending_orders(&self) -> Result<Vec<StoredOrder>, StoreError> {
        Ok(recover(&self.orders, "order store")
            .values()
            .filter(|s| s.review == ReviewState::Pending)
            .cloned()
            .collect())
    }

    async fn all_orders(&self) -> Result<Vec<StoredOrder>, StoreError> {
        Ok(recover(&self.orders, "order store").values().cloned().collect())
    }
}

/// Map-backed watchlist keyed on (kind, value).
#[derive(Default)]
pub struct InMemoryWatchlistStore {
    entries: Mutex<HashMap<(WatchlistKind, String), WatchlistEntry>>,
}

impl InMemoryWatchlistStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(entries: impl IntoIterator<Item = WatchlistEntry>) -> Self {
        let store = Self::default();
        {
            let mut map = recover(&store.entries, "watchlist");
            for entry in entries {
                map.insert((entry.kind, entry.value.clone()), entry);
            }
        }
        store
    }
}

#[async_trait]
impl WatchlistStore for InMemoryWatchlistStore {
    async fn lookup(
        &self,
        kind: WatchlistKind,
        value: &str,
    ) -> Result<Option<WatchlistEntry>, StoreError> {
        Ok(recover(&self.entries, "watchlist")
            .get(&(kind, value.to_string()))
            .cloned())
    }

    async fn insert(&self, entry: WatchlistEntry) -> Result<(), StoreError> {
        let mut entries = recover(&self.entries, "watchlist");
        let key = (entry.kind, entry.value.clone());
        if entries.contains_key(&key) {
            return Err(StoreError::DuplicateWatchlistEntry {
                kind: entry.kind,
                value: entry.value,
            });
        }
        entries.insert(key, entry);
        Ok(())
    }

    async fn remove(&self, kind: WatchlistKind, value: &str) -> Result<bool, StoreError> {
        Ok(recover(&self.entries, "watchlist")
            .remove(&(kind, value.to_string()))
            .is_some())
    }

    async fn entries(&self) -> Result<Vec<WatchlistEntry>, StoreError> {
        Ok(recover(&self.entries, "watchlist").values().cloned().collect())
    }
}
