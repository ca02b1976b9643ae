//! reqwest-backed NOWPayments API client.

use std::time::Duration;

use rust_decimal::Decimal;
use serde_json::Value;

use crate::constants::API_KEY_HEADER;
use crate::error::RelayError;
use crate::payment::PaymentRequest;
use crate::payout::WithdrawalBatch;
use crate::processor::PaymentProcessor;

/// HTTP client for the NOWPayments REST API.
#[derive(Clone)]
pub struct NowPaymentsClient {
    http: reqwest::Client,
    base_url: String,
}

impl NowPaymentsClient {
    /// Create a client for `base_url` (e.g. `https://api.nowpayments.io`).
    /// `timeout` bounds each request end to end.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<Value, RelayError> {
        let resp = request.send().await.map_err(|e| classify(operation, e))?;
        let status = resp.status();
        let text = resp.text().await.map_err(|e| classify(operation, e))?;
        let body = parse_body(&text);

        if !status.is_success() {
            tracing::warn!(
                operation,
                status = status.as_u16(),
                "NOWPayments returned an error response"
            );
            return Err(RelayError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(operation, status = status.as_u16(), "NOWPayments call succeeded");
        Ok(body)
    }
}

/// Map a transport failure onto the relay's taxonomy.
fn classify(operation: &'static str, err: reqwest::Error) -> RelayError {
    if err.is_timeout() {
        tracing::warn!(operation, error = %err, "NOWPayments request timed out");
        RelayError::Timeout
    } else if err.is_connect() {
        tracing::error!(operation, error = %err, "NOWPayments unreachable");
        RelayError::Unavailable(err.to_string())
    } else {
        tracing::error!(operation, error = %err, "NOWPayments request failed");
        RelayError::internal(format!("{operation}: {err}"))
    }
}

/// Upstream bodies are JSON in practice, but error pages from proxies are not.
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

impl PaymentProcessor for NowPaymentsClient {
    async fn create_payment(
        &self,
        api_key: &str,
        request: &PaymentRequest,
    ) -> Result<Value, RelayError> {
        let req = self
            .http
            .post(self.url("/v1/payment"))
            .header(API_KEY_HEADER, api_key)
            .json(request);
        self.send("create_payment", req).await
    }

    async fn estimate(
        &self,
        api_key: &str,
        amount: Decimal,
        currency_from: &str,
        currency_to: &str,
    ) -> Result<Value, RelayError> {
        let amount = amount.to_string();
        let req = self
            .http
            .get(self.url("/v1/estimate"))
            .header(API_KEY_HEADER, api_key)
            .query(&[
                ("amount", amount.as_str()),
                ("currency_from", currency_from),
                ("currency_to", currency_to),
            ]);
        self.send("estimate", req).await
    }

    async fn create_payout(
        &self,
        api_key: &str,
        batch: &WithdrawalBatch,
    ) -> Result<Value, RelayError> {
        let req = self
            .http
            .post(self.url("/v1/payout"))
            .header(API_KEY_HEADER, api_key)
            .json(batch);
        self.send("create_payout", req).await
    }

    async fn min_amount(
        &self,
        api_key: &str,
        currency_from: &str,
        currency_to: &str,
    ) -> Result<Value, RelayError> {
        let req = self
            .http
            .get(self.url("/v1/min-amount"))
            .header(API_KEY_HEADER, api_key)
            .query(&[("currency_from", currency_from), ("currency_to", currency_to)]);
        self.send("min_amount", req).await
    }

    async fn payout_status(&self, api_key: &str, payout_id: &str) -> Result<Value, RelayError> {
        let path = format!("/v1/payout/{}", urlencoding::encode(payout_id));
        let req = self
            .http
            .get(self.url(&path))
            .header(API_KEY_HEADER, api_key);
        self.send("payout_status", req).await
    }
}
