pub mod app_config;
pub mod cache;
pub mod mailer;
pub mod message_status;
pub mod observability;

// Re-export main types for easier imports
pub use app_config::AppConfig;
pub use cache::CacheConfig;
pub use mailer::{MailerConfig, MailerServiceConfig, SUPPORTED_DRIVERS};
pub use message_status::{MessageStatusCacheConfig, StatusTtlConfig, MAX_STATUS_TTL_SECONDS};
pub use observability::ObservabilityConfig;
