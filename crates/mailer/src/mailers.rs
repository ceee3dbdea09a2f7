use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use postie_core::{MailRequest, Mailer};
use postie_errors::{PostieError, PostieResult};
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// 日志邮件服务：只把消息写入日志
pub struct LogMailer {
    name: String,
}

impl LogMailer {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, request: &MailRequest) -> PostieResult<()> {
        match request {
            MailRequest::Template(r) => info!(
                mailer = %self.name,
                channel = %r.channel,
                template = %r.template,
                recipients = ?r.recipients,
                "模板邮件: {} 个变量",
                r.variables.len()
            ),
            MailRequest::Plain(r) => info!(
                mailer = %self.name,
                channel = %r.channel,
                subject = %r.subject,
                recipients = ?r.recipients,
                "普通邮件: {} 字节",
                r.body.len()
            ),
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn driver(&self) -> &str {
        "log"
    }
}

/// 内存邮件服务：保存所有已发送的请求，便于检查
pub struct MemoryMailer {
    name: String,
    sent: Mutex<Vec<MailRequest>>,
}

impl MemoryMailer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// 已发送请求的快照
    pub fn sent(&self) -> Vec<MailRequest> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn clear(&self) {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, request: &MailRequest) -> PostieResult<()> {
        debug!("Memory mailer '{}' stored {} request", self.name, request.kind());
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn driver(&self) -> &str {
        "memory"
    }
}

/// HTTP邮件服务：把请求以JSON形式POST到下游网关
pub struct HttpMailer {
    name: String,
    endpoint: String,
    timeout: Duration,
    headers: HashMap<String, String>,
    client: reqwest::Client,
}

impl HttpMailer {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            timeout,
            headers: HashMap::new(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, request: &MailRequest) -> PostieResult<()> {
        info!(
            "HTTP邮件服务 '{}' 发送 {} 请求: POST {}",
            self.name,
            request.kind(),
            self.endpoint
        );

        let mut request_builder = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(request);

        for (key, value) in &self.headers {
            request_builder = request_builder.header(key, value);
        }

        let response = request_builder
            .send()
            .await
            .map_err(|e| PostieError::Network(format!("请求 {} 失败: {e}", self.endpoint)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("读取响应体失败: {e}"));
        warn!(
            "HTTP邮件服务 '{}' 返回错误状态: {}",
            self.name,
            status.as_u16()
        );
        Err(PostieError::delivery_error(format!(
            "HTTP {}: {}",
            status.as_u16(),
            body
        )))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn driver(&self) -> &str {
        "http"
    }
}

/// 可配置结果与延迟的邮件服务
pub struct MockMailer {
    name: String,
    should_succeed: bool,
    latency_ms: u64,
    calls: AtomicUsize,
}

impl MockMailer {
    pub fn new(name: impl Into<String>, should_succeed: bool, latency_ms: u64) -> Self {
        Self {
            name: name.into(),
            should_succeed,
            latency_ms,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send(&self, _request: &MailRequest) -> PostieResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.latency_ms > 0 {
            sleep(Duration::from_millis(self.latency_ms)).await;
        }

        if self.should_succeed {
            Ok(())
        } else {
            Err(PostieError::delivery_error(format!(
                "Mock mailer {} rejected the message",
                self.name
            )))
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn driver(&self) -> &str {
        "mock"
    }
}
