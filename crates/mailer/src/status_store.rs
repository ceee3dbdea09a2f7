use std::sync::Arc;
use std::time::Duration;

use postie_core::config::MessageStatusCacheConfig;
use postie_core::{MessageStatus, Status};
use postie_errors::PostieResult;
use postie_infrastructure::cache::{CacheService, CacheServiceExt};
use tracing::debug;

/// 消息状态存储
///
/// 记录以 `key_prefix + message_id` 为键写入缓存，TTL由当前状态决定。
/// 每次写入先删除旧值，确保新的TTL从写入时刻开始计算。
#[derive(Clone)]
pub struct MessageStatusStore {
    cache: Arc<dyn CacheService>,
    config: MessageStatusCacheConfig,
}

impl MessageStatusStore {
    pub fn new(cache: Arc<dyn CacheService>, config: MessageStatusCacheConfig) -> Self {
        Self { cache, config }
    }

    pub fn cache_key(&self, message_id: &str) -> String {
        format!("{}{}", self.config.key_prefix, message_id)
    }

    pub fn ttl_for(&self, status: Status) -> Duration {
        self.config.ttl(status)
    }

    /// 写入状态记录，覆盖同一消息的旧记录
    pub async fn store(&self, status: &MessageStatus) -> PostieResult<()> {
        let key = self.cache_key(&status.message_id);
        let ttl = self.ttl_for(status.status);

        self.cache.delete(&key).await?;
        self.cache.set_typed(&key, status, ttl).await?;

        debug!(
            "Stored message status {} as {} (ttl {:?})",
            status.message_id, status.status, ttl
        );
        Ok(())
    }

    /// 读取状态记录，过期或不存在时返回 `None`
    pub async fn fetch(&self, message_id: &str) -> PostieResult<Option<MessageStatus>> {
        self.cache.get_typed(&self.cache_key(message_id)).await
    }

    pub fn cache(&self) -> &Arc<dyn CacheService> {
        &self.cache
    }
}
