use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::Status;

/// 状态TTL上限：30天
pub const MAX_STATUS_TTL_SECONDS: u64 = 30 * 24 * 3600;

/// 消息状态缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageStatusCacheConfig {
    /// 缓存键前缀，完整键为 `key_prefix + message_id`
    pub key_prefix: String,
    pub ttl: StatusTtlConfig,
}

/// 按状态区分的TTL（秒）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusTtlConfig {
    pub pending_seconds: u64,
    pub sent_seconds: u64,
    pub failed_seconds: u64,
}

impl Default for MessageStatusCacheConfig {
    fn default() -> Self {
        Self {
            key_prefix: "message_status_".to_string(),
            ttl: StatusTtlConfig::default(),
        }
    }
}

impl Default for StatusTtlConfig {
    fn default() -> Self {
        Self {
            pending_seconds: 3600, // 1 hour
            sent_seconds: 86400,   // 1 day
            failed_seconds: 86400, // 1 day
        }
    }
}

impl MessageStatusCacheConfig {
    /// 获取指定状态的TTL
    pub fn ttl(&self, status: Status) -> Duration {
        let seconds = match status {
            Status::Pending => self.ttl.pending_seconds,
            Status::Sent => self.ttl.sent_seconds,
            Status::Failed => self.ttl.failed_seconds,
        };
        Duration::from_secs(seconds)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.key_prefix.is_empty() {
            return Err(anyhow::anyhow!("消息状态缓存键前缀不能为空"));
        }

        for (status, seconds) in [
            (Status::Pending, self.ttl.pending_seconds),
            (Status::Sent, self.ttl.sent_seconds),
            (Status::Failed, self.ttl.failed_seconds),
        ] {
            if seconds == 0 {
                return Err(anyhow::anyhow!("{}状态TTL必须大于0", status));
            }
            if seconds > MAX_STATUS_TTL_SECONDS {
                return Err(anyhow::anyhow!(
                    "{}状态TTL不能超过{}秒: {}",
                    status,
                    MAX_STATUS_TTL_SECONDS,
                    seconds
                ));
            }
        }

        Ok(())
    }
}
