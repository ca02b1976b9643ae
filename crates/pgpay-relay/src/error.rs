use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use pgpay::RelayError;
use std::fmt;

/// HTTP face of a [`RelayError`].
#[derive(Debug)]
pub struct ApiError(pub RelayError);

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ApiError {}

impl From<RelayError> for ApiError {
    fn from(e: RelayError) -> Self {
        ApiError(e)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status()).unwrap_or(StatusCode::BAD_GATEWAY)
    }

    fn error_response(&self) -> HttpResponse {
        match &self.0 {
            RelayError::Configuration(_) | RelayError::Internal { .. } => {
                tracing::error!(error = %self.0, "relay request failed");
            }
            RelayError::Unavailable(_) | RelayError::Timeout | RelayError::Upstream { .. } => {
                tracing::warn!(error = %self.0, "relay request failed upstream");
            }
            RelayError::Validation(_) | RelayError::EstimateFailed { .. } => {
                tracing::debug!(error = %self.0, "relay request rejected");
            }
        }
        HttpResponse::build(self.status_code()).json(self.0.body())
    }
}
