use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Identifies one memoized call: the operation name plus its parameters, in call order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub operation: &'static str,
    pub params: Vec<String>,
}

impl CacheKey {
    pub fn new<I, S>(operation: &'static str, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            operation,
            params: params.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    stored_at: DateTime<Utc>,
    payload: Value,
}

type Slot = Arc<tokio::sync::Mutex<Option<CacheEntry>>>;

/// In-process memo cache with a fixed freshness window.
///
/// Each key owns an async slot; concurrent `get_or_insert_with` calls for the same key wait on
/// the slot, so only one of them fetches.
#[derive(Debug)]
pub struct MemoCache {
    ttl: chrono::Duration,
    slots: Mutex<HashMap<CacheKey, Slot>>,
}

impl MemoCache {
    pub fn new(ttl: Duration) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::hours(1));
        Self {
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn slot(&self, key: &CacheKey) -> Slot {
        let mut slots = self.slots.lock();
        slots.entry(key.clone()).or_default().clone()
    }

    fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(entry.stored_at) < self.ttl
    }

    /// Returns the stored payload if it is still fresh at `now`.
    pub async fn get(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<Value> {
        let slot = self.slots.lock().get(key).cloned()?;
        let guard = slot.lock().await;
        guard
            .as_ref()
            .filter(|e| self.is_fresh(e, now))
            .map(|e| e.payload.clone())
    }

    /// Stores `payload`, replacing any previous value for `key`.
    pub async fn put(&self, key: CacheKey, payload: Value, now: DateTime<Utc>) {
        let slot = self.slot(&key);
        let mut guard = slot.lock().await;
        *guard = Some(CacheEntry {
            stored_at: now,
            payload,
        });
    }

    /// Drops every entry in one step. Fetches already in flight finish into detached slots and
    /// are not observed afterwards.
    pub fn invalidate_all(&self) {
        let dropped = std::mem::take(&mut *self.slots.lock());
        tracing::info!(entries = dropped.len(), "memo cache invalidated");
    }

    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the fresh cached value for `key`, or runs `fetch`, stores and returns its result.
    ///
    /// A cached payload that no longer deserializes as `T` is treated as a miss.
    pub async fn get_or_insert_with<T, F, Fut>(
        &self,
        key: CacheKey,
        now: DateTime<Utc>,
        fetch: F,
    ) -> anyhow::Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let slot = self.slot(&key);
        let mut guard = slot.lock().await;

        if let Some(entry) = guard.as_ref().filter(|e| self.is_fresh(e, now)) {
            match serde_json::from_value::<T>(entry.payload.clone()) {
                Ok(hit) => {
                    tracing::debug!(operation = key.operation, params = ?key.params, "cache hit");
                    return Ok(hit);
                }
                Err(err) => {
                    tracing::warn!(operation = key.operation, error = %err, "cached payload has unexpected shape; refetching");
                }
            }
        }

        let value = fetch().await;
        let payload = serde_json::to_value(&value)?;
        *guard = Some(CacheEntry {
            stored_at: now,
            payload,
        });
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap()
    }

    fn key(p: &str) -> CacheKey {
        CacheKey::new("weather", [p])
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let cache = MemoCache::new(Duration::from_secs(3600));
        cache.put(key("Asia"), json!([1, 2]), t0()).await;

        let fresh = t0() + chrono::Duration::minutes(59);
        assert_eq!(cache.get(&key("Asia"), fresh).await, Some(json!([1, 2])));

        let stale = t0() + chrono::Duration::minutes(60);
        assert_eq!(cache.get(&key("Asia"), stale).await, None);
    }

    #[tokio::test]
    async fn put_replaces_single_value_per_key() {
        let cache = MemoCache::new(Duration::from_secs(3600));
        cache.put(key("Asia"), json!(1), t0()).await;
        cache.put(key("Asia"), json!(2), t0()).await;
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&key("Asia"), t0()).await, Some(json!(2)));
    }

    #[tokio::test]
    async fn keys_distinguish_operation_and_params() {
        let cache = MemoCache::new(Duration::from_secs(3600));
        cache.put(CacheKey::new("weather", ["Asia"]), json!("w"), t0()).await;
        cache
            .put(CacheKey::new("crop_health", ["Asia"]), json!("c"), t0())
            .await;
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&key("Europe"), t0()).await, None);
    }

    #[tokio::test]
    async fn invalidate_all_clears_everything() {
        let cache = MemoCache::new(Duration::from_secs(3600));
        cache.put(key("Asia"), json!(1), t0()).await;
        cache.put(key("Europe"), json!(2), t0()).await;
        cache.invalidate_all();
        assert!(cache.is_empty());
        assert_eq!(cache.get(&key("Asia"), t0()).await, None);
    }

    #[tokio::test]
    async fn get_or_insert_with_fetches_once_while_fresh() {
        let cache = MemoCache::new(Duration::from_secs(3600));
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        for _ in 0..3 {
            let v: Vec<u32> = cache
                .get_or_insert_with(key("Asia"), t0(), move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    vec![7, 8, 9]
                })
                .await
                .unwrap();
            assert_eq!(v, vec![7, 8, 9]);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let later = t0() + chrono::Duration::hours(2);
        let _: Vec<u32> = cache
            .get_or_insert_with(key("Asia"), later, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                vec![1]
            })
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn shape_mismatch_is_treated_as_miss() {
        let cache = MemoCache::new(Duration::from_secs(3600));
        cache.put(key("Asia"), json!("not a number"), t0()).await;
        let v: u32 = cache
            .get_or_insert_with(key("Asia"), t0(), || async { 5 })
            .await
            .unwrap();
        assert_eq!(v, 5);
    }
}
