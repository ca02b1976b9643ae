//! The relay service: validation, normalization, and error mapping in front
//! of a [`PaymentProcessor`].

use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::Value;

use crate::callback::{
    CallbackAction, CallbackHooks, CallbackKind, CallbackStatus, LoggingHooks, StatusCallback,
};
use crate::constants::{API_KEY_ENV, PAYOUT_CALLBACK_PATH};
use crate::error::RelayError;
use crate::payment::{callback_url, PaymentDraft};
use crate::payout::{estimated_amount, PayoutDraft, PayoutSummary, WithdrawalBatch};
use crate::processor::PaymentProcessor;

/// Relay settings, loaded once at startup.
#[derive(Clone, Default)]
pub struct RelayConfig {
    /// NOWPayments API key. Absence fails each request, not startup.
    pub api_key: Option<String>,
    /// Externally visible base URL for callback URLs. When unset, the
    /// scheme and host of the incoming request are used.
    pub public_base_url: Option<String>,
    /// Strip internal error detail from responses.
    pub production: bool,
}

impl std::fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("public_base_url", &self.public_base_url)
            .field("production", &self.production)
            .finish()
    }
}

impl RelayConfig {
    pub fn api_key_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// Stateless service exposing the relay operations.
///
/// Every operation checks the credential before anything else, validates its
/// input, and only then talks to the processor.
pub struct Relay<P> {
    config: RelayConfig,
    processor: P,
    hooks: Arc<dyn CallbackHooks>,
}

impl<P: PaymentProcessor> Relay<P> {
    pub fn new(config: RelayConfig, processor: P) -> Self {
        Self {
            config,
            processor,
            hooks: Arc::new(LoggingHooks),
        }
    }

    /// Replace the default logging-only callback hooks.
    pub fn with_hooks(mut self, hooks: Arc<dyn CallbackHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn processor(&self) -> &P {
        &self.processor
    }

    fn api_key(&self) -> Result<&str, RelayError> {
        self.config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(RelayError::Configuration(API_KEY_ENV))
    }

    fn callback_base<'a>(&'a self, request_origin: &'a str) -> &'a str {
        self.config
            .public_base_url
            .as_deref()
            .unwrap_or(request_origin)
    }

    fn finish<T>(&self, result: Result<T, RelayError>) -> Result<T, RelayError> {
        if self.config.production {
            result.map_err(RelayError::redacted)
        } else {
            result
        }
    }

    /// Validate a purchase and create the payment upstream.
    ///
    /// `request_origin` is the `scheme://host` of the inbound request, used
    /// for the callback URL when no public base URL is configured.
    pub async fn create_payment(
        &self,
        draft: PaymentDraft,
        request_origin: &str,
    ) -> Result<Value, RelayError> {
        self.finish(self.forward_payment(draft, request_origin).await)
    }

    async fn forward_payment(
        &self,
        draft: PaymentDraft,
        request_origin: &str,
    ) -> Result<Value, RelayError> {
        let api_key = self.api_key()?;
        let request = draft.normalize(self.callback_base(request_origin))?;

        tracing::info!(
            order_id = %request.order_id,
            price_amount = request.price_amount,
            price_currency = %request.price_currency,
            pay_currency = %request.pay_currency,
            "creating payment"
        );

        let response = self.processor.create_payment(api_key, &request).await?;
        tracing::info!(order_id = %request.order_id, "payment created");
        Ok(response)
    }

    /// Estimate how much `target_currency` a USD payout buys.
    ///
    /// Any processor failure becomes [`RelayError::EstimateFailed`] so the
    /// payout is abandoned before a withdrawal exists.
    pub async fn estimate_payout(
        &self,
        usd_amount: Decimal,
        target_currency: &str,
    ) -> Result<Value, RelayError> {
        let api_key = self.api_key()?;
        let currency = target_currency.to_lowercase();

        let response = self
            .processor
            .estimate(api_key, usd_amount, "usd", &currency)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, currency = %currency, "payout estimate failed");
                RelayError::estimate_failed(estimate_cause(&e))
            })?;

        estimated_amount(&response).ok_or_else(|| {
            RelayError::estimate_failed("response did not include estimated_amount")
        })
    }

    /// Validate a PG coin cash-out, estimate it, and create the withdrawal.
    pub async fn create_payout(
        &self,
        draft: PayoutDraft,
        request_origin: &str,
    ) -> Result<PayoutSummary, RelayError> {
        self.finish(self.forward_payout(draft, request_origin).await)
    }

    async fn forward_payout(
        &self,
        draft: PayoutDraft,
        request_origin: &str,
    ) -> Result<PayoutSummary, RelayError> {
        let api_key = self.api_key()?;
        let payout = draft.validate()?;

        tracing::info!(
            playfab_id = %payout.playfab_id,
            pg_coins = payout.pg_coins_amount,
            usd_amount = %payout.usd_amount,
            currency = %payout.payout_currency,
            "payout requested"
        );

        let estimated = self
            .estimate_payout(payout.usd_amount, &payout.payout_currency)
            .await?;

        let batch = WithdrawalBatch::single(
            &payout,
            callback_url(self.callback_base(request_origin), PAYOUT_CALLBACK_PATH),
        );
        let response = self.processor.create_payout(api_key, &batch).await?;

        let summary = PayoutSummary::new(&payout, estimated, &response)?;
        tracing::info!(
            playfab_id = %payout.playfab_id,
            payout_id = %summary.payout_id,
            "payout created"
        );
        Ok(summary)
    }

    /// Minimum payment amount for a currency pair.
    pub async fn min_amount(
        &self,
        currency_from: &str,
        currency_to: &str,
    ) -> Result<Value, RelayError> {
        let api_key = self.api_key()?;
        let from = required_param("currency_from", currency_from)?;
        let to = required_param("currency_to", currency_to)?;
        self.finish(self.processor.min_amount(api_key, &from, &to).await)
    }

    /// Current status of a payout batch.
    pub async fn payout_status(&self, payout_id: &str) -> Result<Value, RelayError> {
        let api_key = self.api_key()?;
        let id = payout_id.trim();
        if id.is_empty() {
            return Err(RelayError::missing_field("payoutId"));
        }
        self.finish(self.processor.payout_status(api_key, id).await)
    }

    /// Classify a status notification and run the matching hook.
    ///
    /// Never fails: malformed bodies and hook errors are logged and the
    /// notification is still acknowledged.
    pub fn handle_status_callback(&self, kind: CallbackKind, body: &[u8]) -> CallbackAction {
        let Some(callback) = StatusCallback::parse(kind, body) else {
            tracing::warn!(kind = kind.as_str(), bytes = body.len(), "malformed status callback");
            return CallbackAction::Malformed;
        };

        tracing::info!(
            kind = kind.as_str(),
            id = callback.id.as_deref().unwrap_or("-"),
            order_id = callback.order_id.as_deref().unwrap_or("-"),
            status = callback.status.label(),
            "status callback received"
        );

        let (outcome, action) = match callback.status {
            CallbackStatus::Finished => (self.hooks.on_finished(&callback), CallbackAction::Settled),
            CallbackStatus::Failed => (self.hooks.on_failed(&callback), CallbackAction::Reversed),
            CallbackStatus::Other(_) => return CallbackAction::Ignored,
        };

        match outcome {
            Ok(()) => action,
            Err(e) => {
                tracing::error!(
                    kind = kind.as_str(),
                    id = callback.id.as_deref().unwrap_or("-"),
                    error = %e,
                    "callback hook failed"
                );
                CallbackAction::HookFailed
            }
        }
    }
}

fn required_param(name: &str, value: &str) -> Result<String, RelayError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(RelayError::missing_field(name));
    }
    Ok(value.to_lowercase())
}

fn estimate_cause(err: &RelayError) -> String {
    match err {
        RelayError::Upstream { status, body } => format!("NOWPayments returned {status}: {body}"),
        other => other.to_string(),
    }
}
