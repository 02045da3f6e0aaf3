//! Tests for error classification

#[cfg(test)]
mod tests {
    use super::super::error::*;

    #[test]
    fn test_status_retry_classification() {
        let throttled = DashboardError::Status {
            status: 429,
            message: "slow down".into(),
        };
        let unavailable = DashboardError::Status {
            status: 503,
            message: String::new(),
        };
        let not_found = DashboardError::Status {
            status: 404,
            message: String::new(),
        };

        assert!(throttled.is_retryable());
        assert!(unavailable.is_retryable());
        assert!(!not_found.is_retryable());
    }

    #[test]
    fn test_non_transport_errors_are_final() {
        assert!(!DashboardError::NoMarkets.is_retryable());
        assert!(!DashboardError::Parse("bad".into()).is_retryable());
        assert!(!DashboardError::Llm("refused".into()).is_retryable());
    }

    #[test]
    fn test_error_messages() {
        let err = DashboardError::Status {
            status: 500,
            message: "boom".into(),
        };
        assert_eq!(err.to_string(), "API error (500): boom");
        assert_eq!(DashboardError::NoMarkets.to_string(), "No markets fetched");
    }

    #[test]
    fn test_json_error_conversion() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: DashboardError = parse.unwrap_err().into();
        assert!(matches!(err, DashboardError::Json(_)));
    }
}
