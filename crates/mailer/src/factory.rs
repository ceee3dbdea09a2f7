use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use postie_core::config::{MailerConfig, MailerServiceConfig};
use postie_core::{Mailer, MailerRegistry};
use postie_errors::{PostieError, PostieResult};
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::mailers::{HttpMailer, LogMailer, MemoryMailer, MockMailer};

/// 模板邮件使用的服务别名
pub const TEMPLATE: &str = "template";

const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 10;

/// Factory for creating mailers based on configuration
pub struct MailerFactory {
    config: MailerConfig,
    registry: Arc<RwLock<HashMap<String, Arc<dyn Mailer>>>>,
}

impl MailerFactory {
    /// Create a new mailer factory from configuration
    pub fn new(config: MailerConfig) -> Self {
        Self {
            config,
            registry: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Initialize mailers based on configuration
    pub async fn initialize(&self) -> PostieResult<()> {
        info!("Initializing {} mailers", self.config.services.len());

        let mut registry = self.registry.write().await;

        for (alias, service_config) in &self.config.services {
            info!("Creating mailer '{}' with driver '{}'", alias, service_config.driver);

            let mailer = Self::create_mailer(alias, service_config).map_err(|e| {
                PostieError::config_error(format!("Failed to create mailer '{alias}': {e}"))
            })?;

            registry.insert(alias.to_string(), mailer);
        }

        // Validate that default mailer exists
        if let Some(ref default_service) = self.config.default_service {
            if !registry.contains_key(default_service) {
                return Err(PostieError::config_error(format!(
                    "Default mailer '{default_service}' not found"
                )));
            }
        }

        info!("All mailers initialized successfully");
        Ok(())
    }

    /// Create a single mailer based on its configuration
    fn create_mailer(alias: &str, config: &MailerServiceConfig) -> PostieResult<Arc<dyn Mailer>> {
        match config.driver.as_str() {
            "log" => Ok(Arc::new(LogMailer::new(alias))),
            "memory" => Ok(Arc::new(MemoryMailer::new(alias))),
            "http" => {
                let endpoint = config.option_str("endpoint").ok_or_else(|| {
                    PostieError::config_error(format!("HTTP mailer '{alias}' requires an endpoint"))
                })?;
                let timeout = Duration::from_secs(
                    config
                        .option_u64("timeout_seconds")
                        .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECONDS),
                );
                let headers: HashMap<String, String> = config
                    .options
                    .as_ref()
                    .and_then(|o| o.get("headers"))
                    .map(|h| serde_json::from_value(h.clone()))
                    .transpose()
                    .map_err(|e| {
                        PostieError::config_error(format!("Invalid headers for '{alias}': {e}"))
                    })?
                    .unwrap_or_default();

                info!("Created HTTP mailer: {} -> {}", alias, endpoint);
                Ok(Arc::new(
                    HttpMailer::new(alias, endpoint, timeout).with_headers(headers),
                ))
            }
            "mock" => {
                let should_succeed = config.option_bool("should_succeed").unwrap_or(true);
                let latency_ms = config.option_u64("latency_ms").unwrap_or(0);

                info!(
                    "Created Mock mailer: {} (success={}, latency={}ms)",
                    alias, should_succeed, latency_ms
                );
                Ok(Arc::new(MockMailer::new(alias, should_succeed, latency_ms)))
            }
            driver => Err(PostieError::config_error(format!(
                "Unknown mailer driver: {driver}"
            ))),
        }
    }

    /// 按别名解析邮件服务
    ///
    /// `None` 使用默认服务；别名为空或未注册时返回 `MailerNotRegistered`。
    pub async fn create(&self, alias: Option<&str>) -> PostieResult<Arc<dyn Mailer>> {
        let resolved = match alias {
            Some(alias) => Some(alias),
            None => self.config.default_service.as_deref(),
        };

        let alias = match resolved {
            Some(alias) if !alias.trim().is_empty() => alias,
            _ => {
                warn!("No mailer alias given and no default mailer configured");
                return Err(PostieError::mailer_not_registered(alias.unwrap_or("<default>")));
            }
        };

        self.get_mailer(alias)
            .await
            .ok_or_else(|| PostieError::mailer_not_registered(alias))
    }

    /// Get a mailer by alias
    pub async fn get_mailer(&self, alias: &str) -> Option<Arc<dyn Mailer>> {
        let registry = self.registry.read().await;
        registry.get(alias).cloned()
    }

    /// Get the default mailer
    pub async fn get_default_mailer(&self) -> Option<Arc<dyn Mailer>> {
        match self.config.default_service {
            Some(ref default_service) => self.get_mailer(default_service).await,
            None => {
                warn!("No default mailer configured");
                None
            }
        }
    }

    /// Get mailer configuration
    pub fn get_config(&self) -> &MailerConfig {
        &self.config
    }
}

#[async_trait]
impl MailerRegistry for MailerFactory {
    async fn register(&self, alias: String, mailer: Arc<dyn Mailer>) -> PostieResult<()> {
        if alias.trim().is_empty() {
            return Err(PostieError::config_error("Mailer alias cannot be empty"));
        }

        let mut registry = self.registry.write().await;
        if registry.insert(alias.clone(), mailer).is_some() {
            info!("Mailer '{}' replaced", alias);
        }
        Ok(())
    }

    async fn get(&self, alias: &str) -> Option<Arc<dyn Mailer>> {
        self.get_mailer(alias).await
    }

    async fn list_mailers(&self) -> Vec<String> {
        let registry = self.registry.read().await;
        let mut aliases: Vec<String> = registry.keys().cloned().collect();
        aliases.sort();
        aliases
    }

    async fn unregister(&self, alias: &str) -> PostieResult<bool> {
        let mut registry = self.registry.write().await;
        Ok(registry.remove(alias).is_some())
    }

    async fn contains(&self, alias: &str) -> bool {
        let registry = self.registry.read().await;
        registry.contains_key(alias)
    }

    async fn count(&self) -> usize {
        let registry = self.registry.read().await;
        registry.len()
    }

    async fn health_check_all(&self) -> PostieResult<HashMap<String, bool>> {
        let registry = self.registry.read().await;
        let mut results = HashMap::new();

        for (alias, mailer) in registry.iter() {
            let is_healthy = match mailer.health_check().await {
                Ok(healthy) => healthy,
                Err(e) => {
                    error!("Health check failed for mailer '{}': {}", alias, e);
                    false
                }
            };
            results.insert(alias.clone(), is_healthy);
        }

        Ok(results)
    }
}
