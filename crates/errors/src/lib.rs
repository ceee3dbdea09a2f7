use thiserror::Error;

#[cfg(test)]
mod tests;

#[derive(Debug, Error)]
pub enum PostieError {
    #[error("邮件服务未注册: {alias}")]
    MailerNotRegistered { alias: String },
    #[error("消息状态未找到: {message_id}")]
    MessageStatusNotFound { message_id: String },
    #[error("消息投递失败: {0}")]
    Delivery(String),
    #[error("缓存错误: {0}")]
    Cache(String),
    #[error("序列化错误: {0}")]
    Serialization(String),
    #[error("配置错误: {0}")]
    Configuration(String),
    #[error("网络错误: {0}")]
    Network(String),
    #[error("无效的发送请求: {0}")]
    InvalidRequest(String),
    #[error("内部错误: {0}")]
    Internal(String),
}

pub type PostieResult<T> = Result<T, PostieError>;

impl PostieError {
    pub fn mailer_not_registered<S: Into<String>>(alias: S) -> Self {
        Self::MailerNotRegistered {
            alias: alias.into(),
        }
    }
    pub fn status_not_found<S: Into<String>>(message_id: S) -> Self {
        Self::MessageStatusNotFound {
            message_id: message_id.into(),
        }
    }
    pub fn delivery_error<S: Into<String>>(msg: S) -> Self {
        Self::Delivery(msg.into())
    }
    pub fn cache_error<S: Into<String>>(msg: S) -> Self {
        Self::Cache(msg.into())
    }
    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
    pub fn invalid_request<S: Into<String>>(msg: S) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// 对外暴露的稳定错误码
    pub fn error_code(&self) -> &'static str {
        match self {
            PostieError::MailerNotRegistered { .. } => "INTERNAL_MAILER_SERVICE_NOT_REGISTERED",
            PostieError::MessageStatusNotFound { .. } => "MESSAGE_STATUS_NOT_FOUND",
            PostieError::Delivery(_) => "MESSAGE_DELIVERY_FAILED",
            PostieError::Cache(_) => "INTERNAL_CACHE_ERROR",
            PostieError::Serialization(_) => "INTERNAL_SERIALIZATION_ERROR",
            PostieError::Configuration(_) => "INTERNAL_CONFIGURATION_ERROR",
            PostieError::Network(_) => "NETWORK_ERROR",
            PostieError::InvalidRequest(_) => "INVALID_REQUEST",
            PostieError::Internal(_) => "INTERNAL_ERROR",
        }
    }
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PostieError::Internal(_)
                | PostieError::Configuration(_)
                | PostieError::MailerNotRegistered { .. }
        )
    }
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PostieError::Delivery(_) | PostieError::Cache(_) | PostieError::Network(_)
        )
    }
    pub fn user_message(&self) -> &str {
        match self {
            PostieError::MessageStatusNotFound { .. } => "消息状态不存在或已过期",
            PostieError::InvalidRequest(_) => "发送请求参数有误",
            PostieError::Delivery(_) | PostieError::Network(_) => "消息发送失败，请稍后重试",
            _ => "系统繁忙，请稍后重试",
        }
    }
}

impl From<serde_json::Error> for PostieError {
    fn from(err: serde_json::Error) -> Self {
        PostieError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for PostieError {
    fn from(err: anyhow::Error) -> Self {
        PostieError::Internal(err.to_string())
    }
}
