pub mod message_status;
pub mod request;

pub use message_status::{MessageStatus, Status};
pub use request::{EmailSendRequest, MailRequest, TemplateEmailSendRequest, DEFAULT_CHANNEL};
