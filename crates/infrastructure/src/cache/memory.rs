//! In-memory cache manager implementation

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use postie_errors::{PostieError, PostieResult};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::{CacheService, CacheStats};

#[derive(Clone)]
struct CacheEntry {
    value: Vec<u8>,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// 进程内缓存，每个条目单独过期
///
/// 过期条目对 `get`/`exists` 不可见，并在访问时或 `purge_expired` 中被移除。
pub struct InMemoryCacheManager {
    entries: RwLock<HashMap<String, CacheEntry>>,
    stats: RwLock<CacheStats>,
}

impl InMemoryCacheManager {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            stats: RwLock::new(CacheStats::default()),
        }
    }

    /// Remove all expired entries, returns the number removed
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Number of live entries
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries.values().filter(|e| !e.is_expired(now)).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Keys of all live entries, sorted
    pub async fn keys(&self) -> Vec<String> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        let mut keys: Vec<String> = entries
            .iter()
            .filter(|(_, e)| !e.is_expired(now))
            .map(|(k, _)| k.clone())
            .collect();
        keys.sort();
        keys
    }

    /// 剩余存活时间，键不存在或已过期时返回 `None`
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|e| !e.is_expired(now))
            .map(|e| e.expires_at.saturating_duration_since(now))
    }

    /// 启动后台清理任务，管理器被释放后任务自动结束
    pub fn start_purge_task(self: &Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(self);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // 第一次tick立即返回
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(cache) = weak.upgrade() else {
                    break;
                };
                let purged = cache.purge_expired().await;
                if purged > 0 {
                    debug!("Purged {} expired cache entries", purged);
                }
            }
        })
    }

    async fn record<F: FnOnce(&mut CacheStats)>(&self, update: F) {
        let mut stats = self.stats.write().await;
        update(&mut stats);
    }
}

impl Default for InMemoryCacheManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for InMemoryCacheManager {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> PostieResult<Option<Vec<u8>>> {
        let now = Instant::now();
        let lookup = {
            let entries = self.entries.read().await;
            entries
                .get(key)
                .map(|entry| (!entry.is_expired(now)).then(|| entry.value.clone()))
        };

        match lookup {
            Some(Some(value)) => {
                debug!("Cache HIT: {}", key);
                self.record(|s| s.hits += 1).await;
                Ok(Some(value))
            }
            Some(None) => {
                debug!("Cache EXPIRED: {}", key);
                let mut entries = self.entries.write().await;
                if entries.get(key).is_some_and(|e| e.is_expired(Instant::now())) {
                    entries.remove(key);
                }
                drop(entries);
                self.record(|s| s.misses += 1).await;
                Ok(None)
            }
            None => {
                debug!("Cache MISS: {}", key);
                self.record(|s| s.misses += 1).await;
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, value))]
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> PostieResult<()> {
        if ttl.is_zero() {
            self.record(|s| s.errors += 1).await;
            return Err(PostieError::cache_error(format!(
                "TTL must be greater than 0 for key {key}"
            )));
        }

        let Some(expires_at) = Instant::now().checked_add(ttl) else {
            self.record(|s| s.errors += 1).await;
            return Err(PostieError::cache_error(format!(
                "TTL {ttl:?} is out of range for key {key}"
            )));
        };

        debug!("Cache SET: {} with TTL: {:?}", key, ttl);

        let entry = CacheEntry {
            value: value.to_vec(),
            expires_at,
        };
        self.entries.write().await.insert(key.to_string(), entry);
        self.record(|s| s.sets += 1).await;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> PostieResult<bool> {
        debug!("Cache DELETE: {}", key);

        let now = Instant::now();
        let removed = self.entries.write().await.remove(key);
        let deleted = removed.is_some_and(|e| !e.is_expired(now));

        if deleted {
            self.record(|s| s.deletes += 1).await;
        } else {
            debug!("Cache DELETE key not found: {}", key);
        }

        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn exists(&self, key: &str) -> PostieResult<bool> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        Ok(entries.get(key).is_some_and(|e| !e.is_expired(now)))
    }

    async fn get_stats(&self) -> CacheStats {
        self.stats.read().await.clone()
    }

    async fn health_check(&self) -> PostieResult<bool> {
        Ok(true)
    }
}
