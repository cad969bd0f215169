//! Per-job alert cool-down state.
//!
//! The store remembers when each job last alerted. A job with a live entry
//! is in cool-down until `cooldown` has elapsed. Entries are dropped when a
//! job reaches a terminal state so the next failure episode always alerts.

use async_trait::async_trait;
use dashmap::DashMap;
use std::time::Duration;

/// Cool-down state shared by all concurrent dispatches
///
/// Implementations must make each call atomic per key without serializing
/// unrelated keys. The dispatcher serializes its own calls per job, so
/// `allow` and the following `record`/`clear` are not interleaved within one
/// process. A distributed cache can back this trait when several host
/// instances have to share cool-downs.
#[async_trait]
pub trait ThrottleStore: Send + Sync {
    /// Whether an alert for `entity_id` may be sent at `now_ms`
    async fn allow(&self, entity_id: i64, now_ms: i64) -> bool;

    /// Marks `entity_id` as alerted at `now_ms`
    async fn record(&self, entity_id: i64, now_ms: i64);

    /// Forgets `entity_id`, ending its cool-down
    async fn clear(&self, entity_id: i64);
}

/// Process-local store backed by a sharded concurrent map
pub struct InMemoryThrottleStore {
    cooldown_ms: i64,
    last_alert: DashMap<i64, i64>,
}

impl InMemoryThrottleStore {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown_ms: i64::try_from(cooldown.as_millis()).unwrap_or(i64::MAX),
            last_alert: DashMap::new(),
        }
    }

    /// Last recorded alert time, if the job is tracked
    pub fn last_alert(&self, entity_id: i64) -> Option<i64> {
        self.last_alert.get(&entity_id).map(|entry| *entry)
    }

    pub fn len(&self) -> usize {
        self.last_alert.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_alert.is_empty()
    }

    fn is_allowed(&self, last_ms: i64, now_ms: i64) -> bool {
        let elapsed = now_ms.saturating_sub(last_ms);
        // elapsed == 0 lets the alert that created the entry through
        elapsed == 0 || elapsed >= self.cooldown_ms
    }
}

#[async_trait]
impl ThrottleStore for InMemoryThrottleStore {
    async fn allow(&self, entity_id: i64, now_ms: i64) -> bool {
        match self.last_alert.get(&entity_id) {
            Some(last) => self.is_allowed(*last, now_ms),
            None => true,
        }
    }

    async fn record(&self, entity_id: i64, now_ms: i64) {
        self.last_alert.insert(entity_id, now_ms);
    }

    async fn clear(&self, entity_id: i64) {
        self.last_alert.remove(&entity_id);
    }
}
