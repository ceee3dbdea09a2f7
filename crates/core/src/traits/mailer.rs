//! 邮件服务接口定义
//!
//! 此模块定义了消息分发的核心抽象：
//! - `Mailer`：实际发送消息的组件，只有一个 `send` 能力
//! - `MailerRegistry`：按别名管理所有可用的邮件服务实例
//!
//! ## 使用示例
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use postie_core::traits::{Mailer, MailerRegistry};
//! use postie_core::models::MailRequest;
//! use postie_errors::PostieResult;
//!
//! pub struct SesMailer;
//!
//! #[async_trait]
//! impl Mailer for SesMailer {
//!     async fn send(&self, request: &MailRequest) -> PostieResult<()> {
//!         // 调用外部服务
//!         Ok(())
//!     }
//!
//!     fn name(&self) -> &str {
//!         "ses"
//!     }
//!
//!     fn driver(&self) -> &str {
//!         "ses"
//!     }
//! }
//!
//! async fn setup(registry: &dyn MailerRegistry) -> PostieResult<()> {
//!     registry.register("ses".to_string(), Arc::new(SesMailer)).await?;
//!     Ok(())
//! }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use postie_errors::PostieResult;

use crate::models::MailRequest;

/// 邮件服务trait
///
/// 实现者只负责把消息交给下游，不关心状态记录与异常上报。
#[async_trait]
pub trait Mailer: Send + Sync {
    /// 发送消息
    async fn send(&self, request: &MailRequest) -> PostieResult<()>;

    /// 注册时使用的名称
    fn name(&self) -> &str;

    /// 驱动类型，例如 `log`、`http`
    fn driver(&self) -> &str;

    /// 健康检查
    async fn health_check(&self) -> PostieResult<bool> {
        Ok(true)
    }
}

/// 邮件服务注册表trait - 别名到邮件服务的映射
#[async_trait]
pub trait MailerRegistry: Send + Sync {
    /// 注册邮件服务，同名时覆盖
    async fn register(&self, alias: String, mailer: Arc<dyn Mailer>) -> PostieResult<()>;

    /// 按别名获取邮件服务
    async fn get(&self, alias: &str) -> Option<Arc<dyn Mailer>>;

    /// 获取所有别名
    async fn list_mailers(&self) -> Vec<String>;

    /// 移除邮件服务
    async fn unregister(&self, alias: &str) -> PostieResult<bool>;

    /// 检查别名是否存在
    async fn contains(&self, alias: &str) -> bool;

    /// 获取邮件服务数量
    async fn count(&self) -> usize;

    /// 健康检查所有邮件服务
    async fn health_check_all(&self) -> PostieResult<HashMap<String, bool>>;
}
