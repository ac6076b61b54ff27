//! In-process `Cache` adapter.
//!
//! Entries expire lazily: a read past the deadline removes the entry and
//! reports a miss. Time comes from an injected [`Clock`] so expiry is
//! testable without sleeping.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::{Clock, DefaultClock};

use crate::domain::ports::{Cache, CacheError, CacheTtl};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    /// `None` when the deadline overflows the calendar.
    expires_at: Option<DateTime<Utc>>,
}

/// Mutex-guarded map with per-entry deadlines.
pub struct InMemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new(Arc::new(DefaultClock))
    }
}

impl InMemoryCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = self.clock.utc();
        let mut entries = self.lock();
        let Some(entry) = entries.get(key) else {
            return Ok(None);
        };
        if entry.expires_at.is_some_and(|deadline| deadline <= now) {
            entries.remove(key);
            return Ok(None);
        }
        Ok(Some(entry.value.clone()))
    }

    async fn set(&self, key: &str, value: String, ttl: CacheTtl) -> Result<(), CacheError> {
        let lifetime = TimeDelta::from_std(ttl.as_duration()).unwrap_or(TimeDelta::MAX);
        let expires_at = self.clock.utc().checked_add_signed(lifetime);
        self.lock()
            .insert(key.to_owned(), Entry { value, expires_at });
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{get_json, set_json};
    use crate::test_support::{MutableClock, fixed_now};
    use rstest::{fixture, rstest};

    #[fixture]
    fn clock() -> Arc<MutableClock> {
        Arc::new(MutableClock::new(fixed_now()))
    }

    #[rstest]
    #[tokio::test]
    async fn entries_live_until_their_deadline(clock: Arc<MutableClock>) {
        let cache = InMemoryCache::new(clock.clone());
        cache
            .set("k", "v".into(), CacheTtl::Minute)
            .await
            .expect("set");
        clock.advance_seconds(59);
        assert_eq!(cache.get("k").await.expect("get").as_deref(), Some("v"));
        clock.advance_seconds(1);
        assert_eq!(cache.get("k").await.expect("get"), None);
    }

    #[rstest]
    #[tokio::test]
    async fn set_replaces_and_remove_drops(clock: Arc<MutableClock>) {
        let cache = InMemoryCache::new(clock);
        cache.set("k", "one".into(), CacheTtl::Hour).await.expect("set");
        cache.set("k", "two".into(), CacheTtl::Hour).await.expect("set");
        assert_eq!(cache.get("k").await.expect("get").as_deref(), Some("two"));
        cache.remove("k").await.expect("remove");
        cache.remove("absent").await.expect("remove");
        assert_eq!(cache.get("k").await.expect("get"), None);
    }

    #[rstest]
    #[tokio::test]
    async fn json_helpers_round_trip_through_the_adapter(clock: Arc<MutableClock>) {
        let cache = InMemoryCache::new(clock);
        set_json(&cache, "ids", &vec![1, 2, 3], CacheTtl::Minutes10)
            .await
            .expect("set");
        assert_eq!(get_json::<Vec<i32>>(&cache, "ids").await, Some(vec![1, 2, 3]));
        cache.set("bad", "{".into(), CacheTtl::Minute).await.expect("set");
        assert_eq!(get_json::<Vec<i32>>(&cache, "bad").await, None);
    }
}
