//! Redis cache manager implementation

use super::{CacheService, CacheStats};
use async_trait::async_trait;
use postie_core::config::CacheConfig;
use postie_errors::{PostieError, PostieResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument};

/// Redis cache manager with a shared connection manager and metrics
pub struct RedisCacheManager {
    /// Multiplexed connection, reconnects on its own
    connection: redis::aio::ConnectionManager,
    /// Cache statistics
    stats: Arc<RwLock<CacheStats>>,
    /// Key prefix for this instance
    key_prefix: String,
}

impl RedisCacheManager {
    /// Create a new Redis cache manager
    pub async fn new(config: &CacheConfig) -> PostieResult<Self> {
        info!("Creating Redis cache manager with URL: {}", config.redis_url);

        let client = redis::Client::open(config.redis_url.clone())
            .map_err(|e| PostieError::cache_error(e.to_string()))?;

        let mut connection = client
            .get_connection_manager()
            .await
            .map_err(|e| PostieError::cache_error(e.to_string()))?;

        // Test connection
        let _: String = redis::cmd("PING")
            .query_async(&mut connection)
            .await
            .map_err(|e| PostieError::cache_error(e.to_string()))?;

        info!("Redis cache manager created successfully");

        Ok(Self {
            connection,
            stats: Arc::new(RwLock::new(CacheStats::default())),
            key_prefix: config.key_prefix.clone().unwrap_or_default(),
        })
    }

    /// Build full cache key with prefix
    fn build_key(&self, key: &str) -> String {
        full_key(&self.key_prefix, key)
    }

    async fn record<F: FnOnce(&mut CacheStats)>(&self, update: F) {
        let mut stats = self.stats.write().await;
        update(&mut stats);
    }

    async fn fail(&self, op: &str, key: &str, e: redis::RedisError) -> PostieError {
        error!("Cache {} failed for key {}: {}", op, key, e);
        self.record(|s| s.errors += 1).await;
        PostieError::cache_error(e.to_string())
    }
}

fn full_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}:{key}")
    }
}

/// PSETEX takes milliseconds; sub-millisecond TTLs round up to 1ms
fn ttl_millis(ttl: Duration) -> PostieResult<u64> {
    u64::try_from(ttl.as_millis())
        .map(|millis| millis.max(1))
        .map_err(|_| PostieError::cache_error(format!("TTL {ttl:?} is out of range")))
}

#[async_trait]
impl CacheService for RedisCacheManager {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> PostieResult<Option<Vec<u8>>> {
        let full_key = self.build_key(key);
        debug!("Cache GET: {}", full_key);

        let mut conn = self.connection.clone();
        let result: Option<Vec<u8>> = match redis::cmd("GET")
            .arg(&full_key)
            .query_async(&mut conn)
            .await
        {
            Ok(value) => value,
            Err(e) => return Err(self.fail("GET", &full_key, e).await),
        };

        match result {
            Some(value) => {
                debug!("Cache HIT: {}", full_key);
                self.record(|s| s.hits += 1).await;
                Ok(Some(value))
            }
            None => {
                debug!("Cache MISS: {}", full_key);
                self.record(|s| s.misses += 1).await;
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, value))]
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> PostieResult<()> {
        let full_key = self.build_key(key);
        if ttl.is_zero() {
            self.record(|s| s.errors += 1).await;
            return Err(PostieError::cache_error(format!(
                "TTL must be greater than 0 for key {full_key}"
            )));
        }

        let millis = match ttl_millis(ttl) {
            Ok(millis) => millis,
            Err(e) => {
                self.record(|s| s.errors += 1).await;
                return Err(e);
            }
        };

        debug!("Cache SET: {} with TTL: {:?}", full_key, ttl);

        let mut conn = self.connection.clone();
        let result: Result<(), redis::RedisError> = redis::cmd("PSETEX")
            .arg(&full_key)
            .arg(millis)
            .arg(value)
            .query_async(&mut conn)
            .await;
        if let Err(e) = result {
            return Err(self.fail("SET", &full_key, e).await);
        }

        debug!("Cache SET success: {}", full_key);
        self.record(|s| s.sets += 1).await;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> PostieResult<bool> {
        let full_key = self.build_key(key);
        debug!("Cache DELETE: {}", full_key);

        let mut conn = self.connection.clone();
        let result: i32 = match redis::cmd("DEL")
            .arg(&full_key)
            .query_async(&mut conn)
            .await
        {
            Ok(count) => count,
            Err(e) => return Err(self.fail("DELETE", &full_key, e).await),
        };

        let deleted = result > 0;
        if deleted {
            debug!("Cache DELETE success: {}", full_key);
            self.record(|s| s.deletes += 1).await;
        } else {
            debug!("Cache DELETE key not found: {}", full_key);
        }

        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn exists(&self, key: &str) -> PostieResult<bool> {
        let full_key = self.build_key(key);
        debug!("Cache EXISTS: {}", full_key);

        let mut conn = self.connection.clone();
        match redis::cmd("EXISTS")
            .arg(&full_key)
            .query_async::<i32>(&mut conn)
            .await
        {
            Ok(count) => Ok(count > 0),
            Err(e) => Err(self.fail("EXISTS", &full_key, e).await),
        }
    }

    async fn get_stats(&self) -> CacheStats {
        self.stats.read().await.clone()
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> PostieResult<bool> {
        debug!("Cache health check");

        let mut conn = self.connection.clone();
        match redis::cmd("PING").query_async::<String>(&mut conn).await {
            Ok(reply) => Ok(reply == "PONG"),
            Err(e) => Err(self.fail("PING", "-", e).await),
        }
    }
}

impl Clone for RedisCacheManager {
    fn clone(&self) -> Self {
        Self {
            connection: self.connection.clone(),
            stats: Arc::clone(&self.stats),
            key_prefix: self.key_prefix.clone(),
        }
    }
}
