use std::collections::HashMap;

use postie_errors::{PostieError, PostieResult};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CHANNEL: &str = "email";

fn default_channel() -> String {
    DEFAULT_CHANNEL.to_string()
}

/// 模板邮件发送请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateEmailSendRequest {
    #[serde(default = "default_channel")]
    pub channel: String,
    pub recipients: Vec<String>,
    /// 模板名称
    pub template: String,
    /// 模板变量
    #[serde(default)]
    pub variables: HashMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

impl TemplateEmailSendRequest {
    pub fn new(template: impl Into<String>, recipients: Vec<String>) -> Self {
        Self {
            channel: default_channel(),
            recipients,
            template: template.into(),
            variables: HashMap::new(),
            locale: None,
        }
    }

    pub fn with_variable(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.variables.insert(key.into(), value);
        self
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }
}

/// 普通邮件发送请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailSendRequest {
    #[serde(default = "default_channel")]
    pub channel: String,
    pub recipients: Vec<String>,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub html: bool,
}

impl EmailSendRequest {
    pub fn new(subject: impl Into<String>, body: impl Into<String>, recipients: Vec<String>) -> Self {
        Self {
            channel: default_channel(),
            recipients,
            subject: subject.into(),
            body: body.into(),
            html: false,
        }
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }
}

/// 邮件服务统一接收的请求类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MailRequest {
    Template(TemplateEmailSendRequest),
    Plain(EmailSendRequest),
}

impl MailRequest {
    pub fn channel(&self) -> &str {
        match self {
            MailRequest::Template(request) => &request.channel,
            MailRequest::Plain(request) => &request.channel,
        }
    }

    pub fn recipients(&self) -> &[String] {
        match self {
            MailRequest::Template(request) => &request.recipients,
            MailRequest::Plain(request) => &request.recipients,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            MailRequest::Template(_) => "template",
            MailRequest::Plain(_) => "plain",
        }
    }

    /// 校验请求，在创建状态记录之前调用
    pub fn validate(&self) -> PostieResult<()> {
        if self.channel().trim().is_empty() {
            return Err(PostieError::invalid_request("channel不能为空"));
        }

        let recipients = self.recipients();
        if recipients.is_empty() {
            return Err(PostieError::invalid_request("至少需要一个收件人"));
        }
        if recipients.iter().any(|r| r.trim().is_empty()) {
            return Err(PostieError::invalid_request("收件人地址不能为空"));
        }

        match self {
            MailRequest::Template(request) if request.template.trim().is_empty() => {
                Err(PostieError::invalid_request("模板名称不能为空"))
            }
            MailRequest::Plain(request) if request.subject.trim().is_empty() => {
                Err(PostieError::invalid_request("邮件主题不能为空"))
            }
            _ => Ok(()),
        }
    }
}

impl From<TemplateEmailSendRequest> for MailRequest {
    fn from(request: TemplateEmailSendRequest) -> Self {
        MailRequest::Template(request)
    }
}

impl From<EmailSendRequest> for MailRequest {
    fn from(request: EmailSendRequest) -> Self {
        MailRequest::Plain(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_channel() {
        let request = TemplateEmailSendRequest::new("welcome", vec!["a@example.com".to_string()]);
        assert_eq!(request.channel, "email");

        let request: EmailSendRequest = serde_json::from_value(serde_json::json!({
            "recipients": ["a@example.com"],
            "subject": "hi",
            "body": "hello"
        }))
        .unwrap();
        assert_eq!(request.channel, "email");
        assert!(!request.html);
    }

    #[test]
    fn test_validate() {
        let ok: MailRequest =
            TemplateEmailSendRequest::new("welcome", vec!["a@example.com".to_string()]).into();
        assert!(ok.validate().is_ok());

        let no_recipients: MailRequest = TemplateEmailSendRequest::new("welcome", vec![]).into();
        assert!(matches!(
            no_recipients.validate(),
            Err(PostieError::InvalidRequest(_))
        ));

        let blank_template: MailRequest =
            TemplateEmailSendRequest::new("  ", vec!["a@example.com".to_string()]).into();
        assert!(blank_template.validate().is_err());

        let blank_subject: MailRequest =
            EmailSendRequest::new("", "body", vec!["a@example.com".to_string()]).into();
        assert!(blank_subject.validate().is_err());

        let blank_recipient: MailRequest =
            EmailSendRequest::new("s", "b", vec!["a@example.com".to_string(), " ".to_string()])
                .into();
        assert!(blank_recipient.validate().is_err());
    }

    #[test]
    fn test_mail_request_accessors() {
        let request: MailRequest =
            EmailSendRequest::new("s", "b", vec!["a@example.com".to_string()])
                .with_channel("newsletter")
                .into();
        assert_eq!(request.channel(), "newsletter");
        assert_eq!(request.kind(), "plain");
        assert_eq!(request.recipients().len(), 1);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["kind"], "plain");
    }
}
