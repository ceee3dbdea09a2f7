pub mod factory;
pub mod mailers;
pub mod service;
pub mod status_store;

pub use factory::{MailerFactory, TEMPLATE};
pub use mailers::{HttpMailer, LogMailer, MemoryMailer, MockMailer};
pub use service::EmailService;
pub use status_store::MessageStatusStore;
