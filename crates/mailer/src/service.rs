use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use postie_core::{
    EmailSendRequest, ExceptionReporter, MailRequest, MessageStatus, TemplateEmailSendRequest,
};
use postie_errors::{PostieError, PostieResult};
use tracing::{debug, info, instrument, warn};

use crate::factory::{MailerFactory, TEMPLATE};
use crate::status_store::MessageStatusStore;

/// 邮件发送服务
///
/// 一次发送的顺序：
/// 1. 按别名解析邮件服务，失败直接返回错误，不写入任何状态
/// 2. 校验请求
/// 3. 创建 `Pending` 状态并写入缓存
/// 4. 调用邮件服务
/// 5. 成功写入 `Sent`；失败（包括panic）先上报异常，再写入带原因的 `Failed`
///
/// 邮件服务的失败不会作为错误返回，调用方通过状态判断结果；
/// 缓存写入失败则直接返回错误。
pub struct EmailService {
    factory: Arc<MailerFactory>,
    reporter: Arc<dyn ExceptionReporter>,
    statuses: MessageStatusStore,
}

impl EmailService {
    pub fn new(
        factory: Arc<MailerFactory>,
        reporter: Arc<dyn ExceptionReporter>,
        statuses: MessageStatusStore,
    ) -> Self {
        Self {
            factory,
            reporter,
            statuses,
        }
    }

    /// 通过 `template` 服务发送模板邮件
    pub async fn send_template_email(
        &self,
        request: TemplateEmailSendRequest,
    ) -> PostieResult<MessageStatus> {
        self.dispatch(Some(TEMPLATE), request.into()).await
    }

    /// 通过指定服务发送普通邮件，`None` 使用默认服务
    pub async fn send_email(
        &self,
        request: EmailSendRequest,
        alias: Option<&str>,
    ) -> PostieResult<MessageStatus> {
        self.dispatch(alias, request.into()).await
    }

    #[instrument(skip(self, request), fields(kind = request.kind(), channel = request.channel()))]
    pub async fn dispatch(
        &self,
        alias: Option<&str>,
        request: MailRequest,
    ) -> PostieResult<MessageStatus> {
        let mailer = self.factory.create(alias).await?;
        request.validate()?;

        let mut status = MessageStatus::pending(request.channel());
        self.statuses.store(&status).await?;
        debug!(
            "Message {} pending on mailer '{}'",
            status.message_id,
            mailer.name()
        );

        let started = Instant::now();
        let outcome = match AssertUnwindSafe(mailer.send(&request)).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => Err(PostieError::Internal(format!(
                "邮件服务 '{}' 发生panic: {}",
                mailer.name(),
                panic_message(panic.as_ref())
            ))),
        };
        metrics::histogram!("postie_dispatch_duration_seconds", "mailer" => mailer.name().to_string())
            .record(started.elapsed().as_secs_f64());

        match outcome {
            Ok(()) => {
                status.mark_sent();
                info!(
                    "Message {} sent via '{}' ({})",
                    status.message_id,
                    mailer.name(),
                    mailer.driver()
                );
            }
            Err(err) => {
                self.reporter.report(&err);
                warn!(
                    "Message {} failed via '{}': {}",
                    status.message_id,
                    mailer.name(),
                    err
                );
                status.mark_failed(err.to_string());
            }
        }

        self.statuses.store(&status).await?;
        metrics::counter!("postie_messages_total", "status" => status.status.as_str())
            .increment(1);

        Ok(status)
    }

    /// 查询消息状态，记录不存在或已过期时返回 `MessageStatusNotFound`
    pub async fn message_status(&self, message_id: &str) -> PostieResult<MessageStatus> {
        self.statuses
            .fetch(message_id)
            .await?
            .ok_or_else(|| PostieError::status_not_found(message_id))
    }

    pub fn factory(&self) -> &Arc<MailerFactory> {
        &self.factory
    }

    pub fn statuses(&self) -> &MessageStatusStore {
        &self.statuses
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");

        let boxed: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "bang");

        let boxed: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic");
    }
}
