pub mod config;
pub mod logging;
pub mod models;
pub mod traits;

pub use config::*;
pub use models::{
    EmailSendRequest, MailRequest, MessageStatus, Status, TemplateEmailSendRequest,
    DEFAULT_CHANNEL,
};
pub use traits::{ExceptionReporter, Mailer, MailerRegistry};

pub use postie_errors::{PostieError, PostieResult};
