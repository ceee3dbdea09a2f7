use postie_core::traits::ExceptionReporter;
use postie_errors::PostieError;
use tracing::error;

/// 通过tracing上报异常，并按错误码计数
#[derive(Debug, Default, Clone)]
pub struct TracingExceptionReporter;

impl TracingExceptionReporter {
    pub fn new() -> Self {
        Self
    }
}

impl ExceptionReporter for TracingExceptionReporter {
    fn report(&self, err: &PostieError) {
        let code = err.error_code();
        error!(
            error_code = code,
            retryable = err.is_retryable(),
            "上报异常: {err}"
        );
        metrics::counter!("postie_exceptions_reported_total", "code" => code).increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_does_not_panic_without_recorder() {
        let reporter = TracingExceptionReporter::new();
        reporter.report(&PostieError::delivery_error("smtp timeout"));
        reporter.report(&PostieError::mailer_not_registered("template"));
    }
}
