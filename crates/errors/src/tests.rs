#[cfg(test)]
mod error_tests {
    use crate::*;

    #[test]
    fn test_postie_error_display() {
        let not_registered = PostieError::mailer_not_registered("template");
        assert_eq!(not_registered.to_string(), "邮件服务未注册: template");

        let not_found = PostieError::status_not_found("abc");
        assert_eq!(not_found.to_string(), "消息状态未找到: abc");

        let delivery = PostieError::Delivery("smtp timeout".to_string());
        assert_eq!(delivery.to_string(), "消息投递失败: smtp timeout");

        let cache = PostieError::Cache("connection refused".to_string());
        assert_eq!(cache.to_string(), "缓存错误: connection refused");

        let config = PostieError::Configuration("Missing required field".to_string());
        assert_eq!(config.to_string(), "配置错误: Missing required field");

        let invalid = PostieError::InvalidRequest("no recipients".to_string());
        assert_eq!(invalid.to_string(), "无效的发送请求: no recipients");
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            PostieError::mailer_not_registered("x").error_code(),
            "INTERNAL_MAILER_SERVICE_NOT_REGISTERED"
        );
        assert_eq!(
            PostieError::delivery_error("x").error_code(),
            "MESSAGE_DELIVERY_FAILED"
        );
        assert_eq!(
            PostieError::invalid_request("x").error_code(),
            "INVALID_REQUEST"
        );
    }

    #[test]
    fn test_error_classification() {
        assert!(PostieError::Network("reset".to_string()).is_retryable());
        assert!(PostieError::delivery_error("bounce").is_retryable());
        assert!(!PostieError::invalid_request("bad").is_retryable());

        assert!(PostieError::config_error("bad").is_fatal());
        assert!(PostieError::mailer_not_registered("x").is_fatal());
        assert!(!PostieError::cache_error("x").is_fatal());
    }

    #[test]
    fn test_error_conversions() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: PostieError = json_err.into();
        assert!(matches!(err, PostieError::Serialization(_)));

        let err: PostieError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, PostieError::Internal(ref m) if m == "boom"));
    }

    #[test]
    fn test_user_message() {
        assert_eq!(
            PostieError::status_not_found("a").user_message(),
            "消息状态不存在或已过期"
        );
        assert_eq!(
            PostieError::Internal("x".to_string()).user_message(),
            "系统繁忙，请稍后重试"
        );
    }
}
