//! Port for a string-valued key/value cache with expiry.
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::define_port_error;

define_port_error! {
    /// Errors surfaced by cache adapters.
    pub enum CacheError {
        /// Cache backend is unavailable.
        Backend { message: String } => "cache backend failure: {message}",
        /// A value could not be encoded for storage.
        Serialization { message: String } => "cache serialisation failed: {message}",
    }
}

/// Predefined expiry windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheTtl {
    Minute,
    Minutes10,
    Minutes30,
    Hour,
    Hours4,
    Days1,
    Days3,
    Days7,
    Days30,
}

impl CacheTtl {
    /// Window length in seconds.
    pub const fn as_secs(self) -> u64 {
        const MINUTE: u64 = 60;
        const HOUR: u64 = 60 * MINUTE;
        const DAY: u64 = 24 * HOUR;
        match self {
            Self::Minute => MINUTE,
            Self::Minutes10 => 10 * MINUTE,
            Self::Minutes30 => 30 * MINUTE,
            Self::Hour => HOUR,
            Self::Hours4 => 4 * HOUR,
            Self::Days1 => DAY,
            Self::Days3 => 3 * DAY,
            Self::Days7 => 7 * DAY,
            Self::Days30 => 30 * DAY,
        }
    }

    /// Window length as a [`Duration`].
    pub const fn as_duration(self) -> Duration {
        Duration::from_secs(self.as_secs())
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Cache: Send + Sync {
    /// Read a live entry.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `value` under `key` for `ttl`.
    async fn set(&self, key: &str, value: String, ttl: CacheTtl) -> Result<(), CacheError>;

    /// Drop `key` if present.
    async fn remove(&self, key: &str) -> Result<(), CacheError>;
}

/// Read `key` and decode it as JSON.
///
/// Missing entries, backend failures and undecodable values all read as a
/// miss.
pub async fn get_json<T: DeserializeOwned>(cache: &dyn Cache, key: &str) -> Option<T> {
    let raw = match cache.get(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(error) => {
            debug!(%error, key, "cache read failed");
            return None;
        }
    };
    info!(key, "cache hit");
    serde_json::from_str(&raw)
        .inspect_err(|error| debug!(%error, key, "discarding undecodable cache entry"))
        .ok()
}

/// Encode `value` as JSON and store it under `key`.
///
/// # Errors
/// Returns [`CacheError::Serialization`] when encoding fails, or the
/// backend's error.
pub async fn set_json<T: Serialize + Sync>(
    cache: &dyn Cache,
    key: &str,
    value: &T,
    ttl: CacheTtl,
) -> Result<(), CacheError> {
    let encoded =
        serde_json::to_string(value).map_err(|err| CacheError::serialization(err.to_string()))?;
    cache.set(key, encoded, ttl).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;
    use rstest::rstest;

    #[rstest]
    #[case(CacheTtl::Minute, 60)]
    #[case(CacheTtl::Minutes10, 600)]
    #[case(CacheTtl::Hours4, 14_400)]
    #[case(CacheTtl::Days30, 2_592_000)]
    fn ttl_windows(#[case] ttl: CacheTtl, #[case] seconds: u64) {
        assert_eq!(ttl.as_secs(), seconds);
        assert_eq!(ttl.as_duration(), Duration::from_secs(seconds));
    }

    #[tokio::test]
    async fn get_json_decodes_hits() {
        let mut cache = MockCache::new();
        cache
            .expect_get()
            .with(eq("numbers"))
            .return_once(|_| Ok(Some("[1,2,3]".to_owned())));
        let value: Option<Vec<u8>> = get_json(&cache, "numbers").await;
        assert_eq!(value, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn get_json_treats_garbage_as_a_miss() {
        let mut cache = MockCache::new();
        cache
            .expect_get()
            .return_once(|_| Ok(Some("{not json".to_owned())));
        assert_eq!(get_json::<Vec<u8>>(&cache, "numbers").await, None);
    }

    #[tokio::test]
    async fn get_json_treats_backend_errors_as_a_miss() {
        let mut cache = MockCache::new();
        cache
            .expect_get()
            .return_once(|_| Err(CacheError::backend("down")));
        assert_eq!(get_json::<Vec<u8>>(&cache, "numbers").await, None);
    }

    #[tokio::test]
    async fn set_json_encodes_and_forwards_ttl() {
        let mut cache = MockCache::new();
        cache
            .expect_set()
            .with(eq("numbers"), eq("[4,5]".to_owned()), eq(CacheTtl::Hour))
            .return_once(|_, _, _| Ok(()));
        set_json(&cache, "numbers", &vec![4_u8, 5], CacheTtl::Hour)
            .await
            .expect("stored");
    }
}
