//! 配置管理
//!
//! 配置按以下顺序加载：默认值 -> TOML配置文件 -> `POSTIE_` 前缀的环境变量。
//!
//! ```toml
//! [mailer]
//! default_service = "default"
//!
//! [mailer.services.template]
//! driver = "http"
//! options = { endpoint = "http://mail-gateway/send" }
//!
//! [message_status_cache.ttl]
//! pending_seconds = 3600
//! ```

pub mod models;

pub use models::*;
