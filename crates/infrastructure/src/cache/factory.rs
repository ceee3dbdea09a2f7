//! Cache factory for selecting the configured backend

use std::sync::Arc;
use std::time::Duration;

use postie_core::config::CacheConfig;
use postie_errors::{PostieError, PostieResult};
use tracing::info;

use super::{CacheService, InMemoryCacheManager, RedisCacheManager};

/// 按配置创建缓存服务
pub async fn create_cache_service(config: &CacheConfig) -> PostieResult<Arc<dyn CacheService>> {
    match config.backend.as_str() {
        "memory" => {
            let cache = Arc::new(InMemoryCacheManager::new());
            if config.purge_interval_seconds > 0 {
                cache.start_purge_task(Duration::from_secs(config.purge_interval_seconds));
            }
            info!(
                "Using in-memory cache (purge interval: {}s)",
                config.purge_interval_seconds
            );
            Ok(cache as Arc<dyn CacheService>)
        }
        "redis" => {
            let cache = RedisCacheManager::new(config).await?;
            info!("Using Redis cache at {}", config.redis_url);
            Ok(Arc::new(cache) as Arc<dyn CacheService>)
        }
        other => Err(PostieError::config_error(format!("Unknown cache backend: {other}"))),
    }
}
