use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::models::UserId;

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cache miss: {0}")]
    CacheMiss(String),
}

/// Read cache for match listings
///
/// L1 is an in-process `moka` cache. L2 is Redis, shared across instances, and optional:
/// without it the cache degrades to L1 only.
///
/// Every invalidation bumps a generation counter. Readers that fill the cache after a store
/// read pass the generation they saw before the read, so a listing read before a concurrent
/// match never outlives that match's invalidation in this process.
pub struct CacheManager {
    redis: Option<Arc<tokio::sync::Mutex<ConnectionManager>>>,
    l1_cache: moka::future::Cache<String, Vec<u8>>,
    ttl_secs: u64,
    generation: AtomicU64,
}

impl CacheManager {
    /// Create a cache manager backed by Redis
    pub async fn new(redis_url: &str, l1_size: u64, ttl_secs: u64) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = ConnectionManager::new(client).await?;

        Ok(Self {
            redis: Some(Arc::new(tokio::sync::Mutex::new(redis))),
            l1_cache: Self::build_l1(l1_size, ttl_secs),
            ttl_secs,
            generation: AtomicU64::new(0),
        })
    }

    /// Create a cache manager with no Redis tier
    pub fn local_only(l1_size: u64, ttl_secs: u64) -> Self {
        Self {
            redis: None,
            l1_cache: Self::build_l1(l1_size, ttl_secs),
            ttl_secs,
            generation: AtomicU64::new(0),
        }
    }

    fn build_l1(l1_size: u64, ttl_secs: u64) -> moka::future::Cache<String, Vec<u8>> {
        moka::future::CacheBuilder::new(l1_size)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build()
    }

    /// Get a value from cache (L1 first, then L2)
    pub async fn get<T>(&self, key: &str) -> Result<T, CacheError>
    where
        T: for<'de> Deserialize<'de>,
    {
        if let Some(bytes) = self.l1_cache.get(key).await {
            tracing::trace!("L1 cache hit: {}", key);
            return Ok(serde_json::from_slice(&bytes)?);
        }

        if let Some(redis) = &self.redis {
            let mut conn = redis.lock().await;
            let value: Option<String> = redis::cmd("GET")
                .arg(key)
                .query_async(&mut *conn)
                .await?;
            drop(conn);

            if let Some(json) = value {
                tracing::trace!("L2 cache hit: {}", key);

                // Populate L1 cache
                self.l1_cache
                    .insert(key.to_string(), json.as_bytes().to_vec())
                    .await;

                return Ok(serde_json::from_str(&json)?);
            }
        }

        tracing::trace!("Cache miss: {}", key);
        Err(CacheError::CacheMiss(key.to_string()))
    }

    /// Set a value in cache (both tiers)
    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let json = serde_json::to_string(value)?;

        self.l1_cache
            .insert(key.to_string(), json.as_bytes().to_vec())
            .await;

        if let Some(redis) = &self.redis {
            let mut conn = redis.lock().await;
            redis::cmd("SETEX")
                .arg(key)
                .arg(self.ttl_secs)
                .arg(json)
                .query_async::<()>(&mut *conn)
                .await?;
        }

        tracing::trace!("Cache set: {}", key);
        Ok(())
    }

    /// Current invalidation generation; read it before loading the value to cache
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Set a value unless an invalidation ran since `seen` was read
    ///
    /// Returns whether the value was kept. An invalidation racing with the write removes it
    /// again, so the cache never holds a value older than the last invalidation.
    pub async fn set_if_unchanged<T>(
        &self,
        key: &str,
        value: &T,
        seen: u64,
    ) -> Result<bool, CacheError>
    where
        T: Serialize,
    {
        if self.generation() != seen {
            tracing::trace!("Skipping stale cache fill: {}", key);
            return Ok(false);
        }

        self.set(key, value).await?;

        if self.generation() != seen {
            self.delete(key).await?;
            return Ok(false);
        }
        Ok(true)
    }

    /// Delete a value from both tiers
    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.l1_cache.invalidate(key).await;

        if let Some(redis) = &self.redis {
            let mut conn = redis.lock().await;
            redis::cmd("DEL")
                .arg(key)
                .query_async::<()>(&mut *conn)
                .await?;
        }
        Ok(())
    }

    /// Drop cached match listings of both users of a new match
    pub async fn invalidate_matches(&self, x: UserId, y: UserId) -> Result<(), CacheError> {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.delete(&CacheKey::matches(x)).await?;
        self.delete(&CacheKey::matches(y)).await
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build a cache key for a user's match listing
    pub fn matches(user_id: UserId) -> String {
        format!("matches:{}", user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "Requires Redis"]
    async fn test_cache_set_get() {
        let cache = CacheManager::new("redis://127.0.0.1:6379", 1000, 60)
            .await
            .expect("Failed to create cache");

        let key = "test_key";
        let value = "test_value";

        cache.set(key, &value).await.unwrap();
        let result: String = cache.get(key).await.unwrap();
        assert_eq!(result, value);

        cache.delete(key).await.unwrap();
        assert!(cache.get::<String>(key).await.is_err());
    }

    #[tokio::test]
    async fn test_local_only_round_trip_and_invalidate() {
        let cache = CacheManager::local_only(100, 60);

        cache.set(&CacheKey::matches(1), &vec![10_i64, 11]).await.unwrap();
        cache.set(&CacheKey::matches(2), &vec![10_i64]).await.unwrap();
        let cached: Vec<i64> = cache.get(&CacheKey::matches(1)).await.unwrap();
        assert_eq!(cached, vec![10, 11]);

        cache.invalidate_matches(2, 1).await.unwrap();
        assert!(matches!(
            cache.get::<Vec<i64>>(&CacheKey::matches(1)).await,
            Err(CacheError::CacheMiss(_))
        ));
        assert!(cache.get::<Vec<i64>>(&CacheKey::matches(2)).await.is_err());
    }

    #[tokio::test]
    async fn test_fill_after_invalidation_is_dropped() {
        let cache = CacheManager::local_only(100, 60);
        let key = CacheKey::matches(1);

        let seen = cache.generation();
        // A match forms between the store read and the cache fill
        cache.invalidate_matches(1, 2).await.unwrap();

        let empty: Vec<i64> = Vec::new();
        assert!(!cache.set_if_unchanged(&key, &empty, seen).await.unwrap());
        assert!(cache.get::<Vec<i64>>(&key).await.is_err());

        let seen = cache.generation();
        assert!(cache.set_if_unchanged(&key, &vec![7_i64], seen).await.unwrap());
        let cached: Vec<i64> = cache.get(&key).await.unwrap();
        assert_eq!(cached, vec![7]);
    }

    #[test]
    fn test_cache_key_builder() {
        assert_eq!(CacheKey::matches(42), "matches:42");
    }
}
