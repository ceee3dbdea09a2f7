use serde::{Deserialize, Serialize};

/// 缓存后端配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// 后端类型: "memory" 或 "redis"
    pub backend: String,
    /// Redis连接地址
    pub redis_url: String,
    /// 实例级键前缀（仅Redis）
    pub key_prefix: Option<String>,
    /// 内存后端清理过期条目的间隔（秒），0表示不启动后台清理
    pub purge_interval_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            redis_url: "redis://localhost:6379".to_string(),
            key_prefix: Some("postie".to_string()),
            purge_interval_seconds: 60,
        }
    }
}

impl CacheConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        match self.backend.as_str() {
            "memory" => Ok(()),
            "redis" => {
                if self.redis_url.is_empty() {
                    return Err(anyhow::anyhow!("Redis URL不能为空"));
                }

                if !self.redis_url.starts_with("redis://")
                    && !self.redis_url.starts_with("rediss://")
                {
                    return Err(anyhow::anyhow!(
                        "Redis URL必须以redis://或rediss://开头"
                    ));
                }

                Ok(())
            }
            other => Err(anyhow::anyhow!(
                "无效的缓存后端: {}，支持的后端: [\"memory\", \"redis\"]",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.backend, "memory");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cache_config_validation() {
        let mut config = CacheConfig {
            backend: "redis".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        config.redis_url = "http://localhost:6379".to_string();
        assert!(config.validate().is_err());

        config.redis_url = String::new();
        assert!(config.validate().is_err());

        config.backend = "memcached".to_string();
        assert!(config.validate().is_err());
    }
}
