use postie_errors::PostieError;

/// 异常上报trait
///
/// 发送失败时由 `EmailService` 调用，上报后流程继续，失败被记录在状态中。
pub trait ExceptionReporter: Send + Sync {
    fn report(&self, error: &PostieError);
}
