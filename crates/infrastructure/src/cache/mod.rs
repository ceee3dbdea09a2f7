//! 带TTL的键值缓存
//!
//! 消息状态记录保存在这里。提供两个后端：
//! - `InMemoryCacheManager`：进程内缓存，适用于单实例部署与测试
//! - `RedisCacheManager`：基于Redis的共享缓存

pub mod factory;
pub mod manager;
pub mod memory;

use async_trait::async_trait;
pub use factory::*;
pub use manager::*;
pub use memory::*;

use postie_errors::{PostieError, PostieResult};

/// Cache statistics and metrics
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub deletes: u64,
    pub errors: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn miss_rate(&self) -> f64 {
        1.0 - self.hit_rate()
    }

    pub fn error_rate(&self) -> f64 {
        let total_ops = self.hits + self.misses + self.sets + self.deletes;
        if total_ops == 0 {
            0.0
        } else {
            self.errors as f64 / total_ops as f64
        }
    }
}

/// Cache service trait for dependency injection
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Get a value from cache as raw bytes
    async fn get(&self, key: &str) -> PostieResult<Option<Vec<u8>>>;

    /// Set a value in cache with TTL
    async fn set(&self, key: &str, value: &[u8], ttl: std::time::Duration) -> PostieResult<()>;

    /// Delete a value from cache, returns whether the key existed
    async fn delete(&self, key: &str) -> PostieResult<bool>;

    /// Check if a key exists in cache
    async fn exists(&self, key: &str) -> PostieResult<bool>;

    /// Get cache statistics
    async fn get_stats(&self) -> CacheStats;

    /// Health check for cache service
    async fn health_check(&self) -> PostieResult<bool>;
}

/// Extension trait for convenient type-safe caching
#[async_trait]
pub trait CacheServiceExt: Send + Sync {
    /// Get a typed value from cache
    async fn get_typed<T>(&self, key: &str) -> PostieResult<Option<T>>
    where
        T: serde::de::DeserializeOwned + Send + Sync;

    /// Set a typed value in cache with TTL
    async fn set_typed<T>(
        &self,
        key: &str,
        value: &T,
        ttl: std::time::Duration,
    ) -> PostieResult<()>
    where
        T: serde::Serialize + Send + Sync;
}

#[async_trait]
impl<T: CacheService + ?Sized> CacheServiceExt for T {
    async fn get_typed<U>(&self, key: &str) -> PostieResult<Option<U>>
    where
        U: serde::de::DeserializeOwned + Send + Sync,
    {
        match self.get(key).await? {
            Some(bytes) => {
                let value = serde_json::from_slice(&bytes)
                    .map_err(|e| PostieError::Serialization(e.to_string()))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn set_typed<U>(
        &self,
        key: &str,
        value: &U,
        ttl: std::time::Duration,
    ) -> PostieResult<()>
    where
        U: serde::Serialize + Send + Sync,
    {
        let bytes =
            serde_json::to_vec(value).map_err(|e| PostieError::Serialization(e.to_string()))?;
        self.set(key, &bytes, ttl).await
    }
}
