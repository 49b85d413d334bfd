//! Redis caching service.
//!
//! Provides a type-safe caching layer with:
//! - Automatic serialization/deserialization via serde
//! - Configurable TTL
//! - Generation counters for invalidating families of keys
//! - Connection pooling via ConnectionManager
//!
//! Cache failures never fail a request: reads degrade to a miss and write
//! errors are returned for the caller to log.

use anyhow::{Context, Result};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

/// Redis cache client with connection pooling.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
    default_ttl: Duration,
}

impl RedisCache {
    /// Create a new Redis cache connection.
    pub async fn new(redis_url: &str, default_ttl_seconds: u64) -> Result<Self> {
        let client = redis::Client::open(redis_url).context("Failed to create Redis client")?;

        let conn = ConnectionManager::new(client)
            .await
            .context("Failed to connect to Redis")?;

        tracing::info!("Redis cache connected");

        Ok(Self {
            conn,
            default_ttl: Duration::from_secs(default_ttl_seconds),
        })
    }

    /// Get a value from cache.
    #[instrument(skip(self), fields(cache_hit))]
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut conn = self.conn.clone();

        let hit = match conn.get::<_, Option<String>>(key).await {
            Ok(Some(data)) => match serde_json::from_str(&data) {
                Ok(value) => {
                    debug!(key = key, "Cache hit");
                    Some(value)
                }
                Err(e) => {
                    warn!(key = key, error = %e, "Failed to deserialize cached value");
                    None
                }
            },
            Ok(None) => {
                debug!(key = key, "Cache miss");
                None
            }
            Err(e) => {
                error!(key = key, error = %e, "Redis get error");
                None
            }
        };

        tracing::Span::current().record("cache_hit", hit.is_some());
        hit
    }

    /// Set a value in cache with default TTL.
    #[instrument(skip(self, value))]
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let mut conn = self.conn.clone();

        let data = serde_json::to_string(value).context("Failed to serialize value for cache")?;

        conn.set_ex::<_, _, ()>(key, data, self.default_ttl.as_secs())
            .await
            .context("Failed to set cache value")?;

        debug!(key = key, ttl_secs = self.default_ttl.as_secs(), "Cached value");
        Ok(())
    }

    /// Current value of a counter key; an unset counter reads as 0.
    #[instrument(skip(self))]
    pub async fn counter(&self, key: &str) -> Result<u64> {
        let mut conn = self.conn.clone();
        let value: Option<u64> = conn.get(key).await.context("Failed to read cache counter")?;
        Ok(value.unwrap_or(0))
    }

    /// Atomically increment a counter key and return the new value.
    #[instrument(skip(self))]
    pub async fn bump(&self, key: &str) -> Result<u64> {
        let mut conn = self.conn.clone();
        let value: u64 = conn.incr(key, 1u64).await.context("Failed to bump cache counter")?;

        debug!(key = key, value = value, "Cache counter bumped");
        Ok(value)
    }

    /// Check if Redis is healthy.
    pub async fn health_check(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .context("Redis health check failed")?;
        Ok(())
    }
}

/// Cache key builders for consistent key formats.
pub mod keys {
    use uuid::Uuid;

    /// Owner's list generation; bumped on every project write
    pub fn project_list_generation(owner_id: &str) -> String {
        format!("projects:owner:{}:generation", owner_id)
    }

    /// One page of an owner's project list within a generation. Pages of an
    /// older generation are never read again and age out with their TTL.
    pub fn project_list(owner_id: &str, generation: u64, page: u32, per_page: u32) -> String {
        format!(
            "projects:owner:{}:gen:{}:page:{}:{}",
            owner_id, generation, page, per_page
        )
    }

    /// Analysis result for a file, keyed by model and content digest
    pub fn analysis(model: &str, digest: Uuid) -> String {
        format!("ai:analysis:{}:{}", model, digest)
    }

}
