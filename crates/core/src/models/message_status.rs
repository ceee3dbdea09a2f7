use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use postie_errors::PostieError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 消息发送状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// 已创建，等待邮件服务处理
    Pending,
    /// 邮件服务已接收消息
    Sent,
    /// 邮件服务返回错误
    Failed,
}

impl Status {
    /// 状态的字符串值，同时用作TTL配置的查找键
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Sent => "sent",
            Status::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Sent | Status::Failed)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = PostieError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Status::Pending),
            "sent" => Ok(Status::Sent),
            "failed" => Ok(Status::Failed),
            other => Err(PostieError::Serialization(format!("未知的消息状态: {other}"))),
        }
    }
}

/// 消息状态记录
///
/// 每次发送都会生成一条记录，按状态写入缓存并设置TTL。
/// 记录是临时的：过期后即无法再查询。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageStatus {
    /// 消息唯一标识（UUID v4）
    pub message_id: String,
    /// 发送渠道
    pub channel: String,
    /// 当前状态
    pub status: Status,
    /// 最近一次状态变更时间
    pub status_updated_at: DateTime<Utc>,
    /// 失败原因，仅在 `Failed` 时存在
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl MessageStatus {
    /// 为指定渠道创建一条新的 `Pending` 记录
    pub fn pending(channel: impl Into<String>) -> Self {
        Self {
            message_id: Uuid::new_v4().to_string(),
            channel: channel.into(),
            status: Status::Pending,
            status_updated_at: Utc::now(),
            error_message: None,
        }
    }

    pub fn mark_sent(&mut self) {
        self.status = Status::Sent;
        self.error_message = None;
        self.status_updated_at = Utc::now();
    }

    pub fn mark_failed(&mut self, error_message: impl Into<String>) {
        self.status = Status::Failed;
        self.error_message = Some(error_message.into());
        self.status_updated_at = Utc::now();
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
