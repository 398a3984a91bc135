use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::{collections::HashMap, future::Future, time::Duration};
use tokio::sync::Mutex;
use tokio::time::Instant;

// Upper bound on the wait between two fetch attempts.
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

// Staleness and retry policy for a query cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryCacheConfig {
    // How long a cached value stays fresh. `None` keeps values fresh until invalidated.
    pub stale_time: Option<Duration>,
    // Extra attempts after the first failed fetch.
    pub retry: u32,
    // Wait before the first retry; doubles per attempt up to `MAX_RETRY_DELAY`.
    pub retry_delay: Duration,
}

impl Default for QueryCacheConfig {
    fn default() -> Self {
        Self {
            stale_time: None,
            retry: 0,
            retry_delay: Duration::from_secs(1),
        }
    }
}

impl QueryCacheConfig {
    // Delay before retry number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.retry_delay
            .checked_mul(factor)
            .map_or(MAX_RETRY_DELAY, |delay| delay.min(MAX_RETRY_DELAY))
    }
}

struct CacheEntry {
    value: Value,
    fetched_at: Instant,
}

// Session-scoped cache of decoded query results, keyed by caller-chosen strings.
// Owned by whoever builds it and passed by reference to consuming code.
pub struct QueryCache {
    config: QueryCacheConfig,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl QueryCache {
    pub fn new(config: QueryCacheConfig) -> Self {
        Self {
            config,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> QueryCacheConfig {
        self.config
    }

    // Returns the fresh cached value for `key`, or runs `fetcher` (retrying up to
    // `config.retry` extra times) and caches the result.
    pub async fn fetch<T, E, F, Fut>(&self, key: &str, mut fetcher: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: std::fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(cached) = self.fresh_value(key).await {
            match serde_json::from_value::<T>(cached) {
                Ok(value) => return Ok(value),
                Err(error) => {
                    tracing::debug!(key, %error, "cached value has a different shape, refetching");
                }
            }
        }

        // The lock is not held while the fetcher runs.
        let mut attempt = 0;
        let value = loop {
            match fetcher().await {
                Ok(value) => break value,
                Err(error) if attempt < self.config.retry => {
                    attempt += 1;
                    let delay = self.config.backoff(attempt);
                    tracing::debug!(key, attempt, ?delay, %error, "query failed, retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(error) => return Err(error),
            }
        };

        match serde_json::to_value(&value) {
            Ok(json) => {
                let mut entries = self.entries.lock().await;
                entries.insert(
                    key.to_string(),
                    CacheEntry {
                        value: json,
                        fetched_at: Instant::now(),
                    },
                );
            }
            Err(error) => tracing::warn!(key, %error, "query result not cacheable"),
        }

        Ok(value)
    }

    pub async fn invalidate(&self, key: &str) -> bool {
        let mut entries = self.entries.lock().await;
        entries.remove(key).is_some()
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn fresh_value(&self, key: &str) -> Option<Value> {
        let entries = self.entries.lock().await;
        let entry = entries.get(key)?;
        let fresh = match self.config.stale_time {
            Some(stale_time) => entry.fetched_at.elapsed() < stale_time,
            None => true,
        };
        fresh.then(|| entry.value.clone())
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(QueryCacheConfig::default())
    }
}
