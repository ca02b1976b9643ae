//! Upstream processor abstraction.
//!
//! [`PaymentProcessor`] is the seam between the relay's validation logic and
//! the HTTP calls to the processor. [`crate::nowpayments::NowPaymentsClient`]
//! is the production implementation; tests substitute a recording mock.

use rust_decimal::Decimal;
use serde_json::Value;

use crate::error::RelayError;
use crate::payment::PaymentRequest;
use crate::payout::WithdrawalBatch;

/// Calls into the upstream payment processor.
///
/// Every method returns the processor's JSON body on a 2xx response and a
/// classified [`RelayError`] otherwise. Implementations never retry.
pub trait PaymentProcessor: Send + Sync {
    /// `POST /v1/payment`.
    fn create_payment(
        &self,
        api_key: &str,
        request: &PaymentRequest,
    ) -> impl std::future::Future<Output = Result<Value, RelayError>> + Send;

    /// `GET /v1/estimate` converting `amount` of `currency_from` into `currency_to`.
    fn estimate(
        &self,
        api_key: &str,
        amount: Decimal,
        currency_from: &str,
        currency_to: &str,
    ) -> impl std::future::Future<Output = Result<Value, RelayError>> + Send;

    /// `POST /v1/payout`.
    fn create_payout(
        &self,
        api_key: &str,
        batch: &WithdrawalBatch,
    ) -> impl std::future::Future<Output = Result<Value, RelayError>> + Send;

    /// `GET /v1/min-amount`.
    fn min_amount(
        &self,
        api_key: &str,
        currency_from: &str,
        currency_to: &str,
    ) -> impl std::future::Future<Output = Result<Value, RelayError>> + Send;

    /// `GET /v1/payout/{id}`.
    fn payout_status(
        &self,
        api_key: &str,
        payout_id: &str,
    ) -> impl std::future::Future<Output = Result<Value, RelayError>> + Send;
}
