use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub const SUPPORTED_DRIVERS: [&str; 4] = ["log", "memory", "http", "mock"];

/// 邮件服务配置：别名 -> 驱动
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailerConfig {
    /// 未指定别名时使用的服务
    pub default_service: Option<String>,
    pub services: HashMap<String, MailerServiceConfig>,
}

/// 单个邮件服务实例配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailerServiceConfig {
    /// 驱动类型: "log", "memory", "http", "mock"
    pub driver: String,
    /// 驱动专属参数
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_json::Value>,
}

impl MailerServiceConfig {
    pub fn new(driver: impl Into<String>) -> Self {
        Self {
            driver: driver.into(),
            options: None,
        }
    }

    pub fn with_options(mut self, options: serde_json::Value) -> Self {
        self.options = Some(options);
        self
    }

    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.options
            .as_ref()
            .and_then(|o| o.get(key))
            .and_then(|v| v.as_str())
    }

    pub fn option_bool(&self, key: &str) -> Option<bool> {
        self.options
            .as_ref()
            .and_then(|o| o.get(key))
            .and_then(|v| v.as_bool())
    }

    pub fn option_u64(&self, key: &str) -> Option<u64> {
        self.options
            .as_ref()
            .and_then(|o| o.get(key))
            .and_then(|v| v.as_u64())
    }
}

impl Default for MailerConfig {
    fn default() -> Self {
        let mut services = HashMap::new();
        services.insert("default".to_string(), MailerServiceConfig::new("log"));
        services.insert("template".to_string(), MailerServiceConfig::new("log"));

        Self {
            default_service: Some("default".to_string()),
            services,
        }
    }
}

impl MailerConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        for (alias, service) in &self.services {
            if alias.trim().is_empty() {
                return Err(anyhow::anyhow!("邮件服务别名不能为空"));
            }

            if !SUPPORTED_DRIVERS.contains(&service.driver.as_str()) {
                return Err(anyhow::anyhow!(
                    "邮件服务 '{}' 使用了无效的驱动: {}，支持的驱动: {:?}",
                    alias,
                    service.driver,
                    SUPPORTED_DRIVERS
                ));
            }

            if service.driver == "http" && service.option_str("endpoint").is_none() {
                return Err(anyhow::anyhow!("HTTP邮件服务 '{}' 缺少endpoint配置", alias));
            }
        }

        if let Some(ref default_service) = self.default_service {
            if !self.services.contains_key(default_service) {
                return Err(anyhow::anyhow!("默认邮件服务 '{}' 未配置", default_service));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mailer_config() {
        let config = MailerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_service.as_deref(), Some("default"));
        assert_eq!(config.services["template"].driver, "log");
    }

    #[test]
    fn test_invalid_driver() {
        let mut config = MailerConfig::default();
        config
            .services
            .insert("smtp".to_string(), MailerServiceConfig::new("smtp"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_http_requires_endpoint() {
        let mut config = MailerConfig::default();
        config
            .services
            .insert("webhook".to_string(), MailerServiceConfig::new("http"));
        assert!(config.validate().is_err());

        config.services.insert(
            "webhook".to_string(),
            MailerServiceConfig::new("http")
                .with_options(serde_json::json!({ "endpoint": "http://localhost/send" })),
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_default_service() {
        let mut config = MailerConfig::default();
        config.default_service = Some("missing".to_string());
        assert!(config.validate().is_err());

        config.default_service = None;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_option_accessors() {
        let service = MailerServiceConfig::new("mock").with_options(serde_json::json!({
            "should_succeed": false,
            "latency_ms": 25
        }));
        assert_eq!(service.option_bool("should_succeed"), Some(false));
        assert_eq!(service.option_u64("latency_ms"), Some(25));
        assert_eq!(service.option_str("endpoint"), None);
    }
}
