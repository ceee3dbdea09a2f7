pub mod exception_reporter;
pub mod mailer;

pub use exception_reporter::*;
pub use mailer::*;
