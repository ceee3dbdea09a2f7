use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use postie_core::{AppConfig, ExceptionReporter, MailerRegistry};
use postie_infrastructure::{create_cache_service, TracingExceptionReporter};
use postie_mailer::{EmailService, MailerFactory, MessageStatusStore};
use tracing::info;

/// 主应用程序
///
/// 按配置组装缓存、异常上报、邮件服务工厂与发送服务。
pub struct Application {
    config: AppConfig,
    email_service: EmailService,
}

impl Application {
    /// 创建新的应用实例
    pub async fn new(config: AppConfig) -> Result<Self> {
        let reporter: Arc<dyn ExceptionReporter> = Arc::new(TracingExceptionReporter::new());
        Self::with_reporter(config, reporter).await
    }

    /// 使用自定义异常上报器创建应用实例
    pub async fn with_reporter(
        config: AppConfig,
        reporter: Arc<dyn ExceptionReporter>,
    ) -> Result<Self> {
        config.validate().context("配置验证失败")?;

        info!("初始化应用程序，缓存后端: {}", config.cache.backend);

        let cache = create_cache_service(&config.cache)
            .await
            .context("创建缓存服务失败")?;

        let factory = Arc::new(MailerFactory::new(config.mailer.clone()));
        factory.initialize().await.context("初始化邮件服务失败")?;

        let statuses = MessageStatusStore::new(cache, config.message_status_cache.clone());
        let email_service = EmailService::new(factory, reporter, statuses);

        info!(
            "应用程序初始化完成，已注册 {} 个邮件服务",
            email_service.factory().count().await
        );

        Ok(Self {
            config,
            email_service,
        })
    }

    pub fn email_service(&self) -> &EmailService {
        &self.email_service
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// 所有已注册邮件服务的健康状态，按别名排序
    pub async fn mailer_health(&self) -> Result<BTreeMap<String, bool>> {
        let health = self
            .email_service
            .factory()
            .health_check_all()
            .await
            .context("邮件服务健康检查失败")?;
        Ok(health.into_iter().collect())
    }
}
