use thiserror::Error;

/// Errors returned by relay operations.
///
/// Every variant maps onto exactly one HTTP status via [`RelayError::status`],
/// so transports never have to classify failures themselves.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The NOWPayments API key is not configured.
    #[error("{0} not set on server")]
    Configuration(&'static str),

    /// Missing or malformed client input.
    #[error("validation error: {0}")]
    Validation(String),

    /// The processor answered with a non-2xx status.
    #[error("upstream returned {status}")]
    Upstream {
        status: u16,
        body: serde_json::Value,
    },

    /// The estimate call failed, so no withdrawal was attempted. `cause` is
    /// stripped in production.
    #[error("could not estimate payout amount")]
    EstimateFailed { cause: Option<String> },

    /// The processor could not be reached.
    #[error("payment service unavailable: {0}")]
    Unavailable(String),

    /// The processor did not answer within the configured bound.
    #[error("upstream request timed out")]
    Timeout,

    /// Any other local fault. `detail` is stripped in production.
    #[error("internal error")]
    Internal { detail: Option<String> },
}

impl RelayError {
    pub fn validation(msg: impl Into<String>) -> Self {
        RelayError::Validation(msg.into())
    }

    pub fn missing_field(field: &str) -> Self {
        RelayError::Validation(format!("Missing required field: {field}"))
    }

    pub fn estimate_failed(cause: impl Into<String>) -> Self {
        RelayError::EstimateFailed {
            cause: Some(cause.into()),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        RelayError::Internal {
            detail: Some(detail.into()),
        }
    }

    /// HTTP status code the error is reported with.
    pub fn status(&self) -> u16 {
        match self {
            RelayError::Configuration(_) => 500,
            RelayError::Validation(_) => 400,
            RelayError::Upstream { status, .. } => *status,
            RelayError::EstimateFailed { .. } => 400,
            RelayError::Unavailable(_) => 503,
            RelayError::Timeout => 408,
            RelayError::Internal { .. } => 500,
        }
    }

    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::Configuration(_) => "configuration",
            RelayError::Validation(_) => "validation",
            RelayError::Upstream { .. } => "upstream",
            RelayError::EstimateFailed { .. } => "estimate",
            RelayError::Unavailable(_) => "unavailable",
            RelayError::Timeout => "timeout",
            RelayError::Internal { .. } => "internal",
        }
    }

    /// JSON body sent back to the caller.
    pub fn body(&self) -> serde_json::Value {
        match self {
            RelayError::Configuration(var) => serde_json::json!({
                "error": format!("{var} not set on server"),
            }),
            RelayError::Validation(msg) => serde_json::json!({
                "error": msg,
            }),
            RelayError::Upstream { body, .. } => serde_json::json!({
                "error": "NowPayments API error",
                "details": body,
            }),
            RelayError::EstimateFailed { cause } => match cause {
                Some(cause) => serde_json::json!({
                    "error": "Could not estimate payout amount",
                    "details": cause,
                }),
                None => serde_json::json!({
                    "error": "Could not estimate payout amount",
                }),
            },
            RelayError::Unavailable(_) => serde_json::json!({
                "error": "Payment service unavailable",
                "details": "Unable to reach NowPayments, please try again later",
            }),
            RelayError::Timeout => serde_json::json!({
                "error": "Request timeout",
                "details": "NowPayments did not respond in time",
            }),
            RelayError::Internal { detail } => match detail {
                Some(detail) => serde_json::json!({
                    "error": "Server error",
                    "details": detail,
                }),
                None => serde_json::json!({
                    "error": "Server error",
                }),
            },
        }
    }

    /// Drop internal diagnostic detail and estimate causes; used in
    /// production mode.
    pub fn redacted(self) -> Self {
        match self {
            RelayError::Internal { .. } => RelayError::Internal { detail: None },
            RelayError::EstimateFailed { .. } => RelayError::EstimateFailed { cause: None },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(RelayError::Configuration("NOWPAYMENTS_API_KEY").status(), 500);
        assert_eq!(RelayError::missing_field("order_id").status(), 400);
        assert_eq!(RelayError::estimate_failed("x").status(), 400);
        assert_eq!(RelayError::Unavailable("refused".into()).status(), 503);
        assert_eq!(RelayError::Timeout.status(), 408);
        assert_eq!(RelayError::internal("boom").status(), 500);
        let upstream = RelayError::Upstream {
            status: 422,
            body: serde_json::json!({"message": "bad currency"}),
        };
        assert_eq!(upstream.status(), 422);
    }

    #[test]
    fn test_upstream_body_is_wrapped() {
        let err = RelayError::Upstream {
            status: 400,
            body: serde_json::json!({"code": "INVALID_REQUEST_PARAMS"}),
        };
        let body = err.body();
        assert_eq!(body["error"], "NowPayments API error");
        assert_eq!(body["details"]["code"], "INVALID_REQUEST_PARAMS");
    }

    #[test]
    fn test_missing_field_names_field() {
        let body = RelayError::missing_field("pay_currency").body();
        assert_eq!(body["error"], "Missing required field: pay_currency");
    }

    #[test]
    fn test_redacted_strips_internal_detail() {
        let err = RelayError::internal("stack trace here").redacted();
        let body = err.body();
        assert_eq!(body["error"], "Server error");
        assert!(body.get("details").is_none());

        let err = RelayError::estimate_failed("error sending request for url (http://upstream/v1/estimate)")
            .redacted();
        assert_eq!(err.status(), 400);
        assert!(err.body().get("details").is_none());

        // Other variants pass through untouched
        let err = RelayError::validation("bad").redacted();
        assert_eq!(err.body()["error"], "bad");
    }

    #[test]
    fn test_configuration_message_names_variable() {
        let err = RelayError::Configuration("NOWPAYMENTS_API_KEY");
        assert_eq!(err.to_string(), "NOWPAYMENTS_API_KEY not set on server");
    }
}
