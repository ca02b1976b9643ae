use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{min_payout_pg, MIN_PAYOUT_USD, PG_COINS_PER_USD};
use crate::error::RelayError;
use crate::field;

/// Payout intent as sent by the game client, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutDraft {
    pub playfab_id: Option<Value>,
    pub pg_coins_amount: Option<Value>,
    pub payout_address: Option<Value>,
    pub payout_currency: Option<Value>,
}

/// A validated payout.
#[derive(Debug, Clone, PartialEq)]
pub struct PayoutRequest {
    pub playfab_id: String,
    pub pg_coins_amount: u64,
    pub payout_address: String,
    /// Lower-cased currency code.
    pub payout_currency: String,
    /// `pg_coins_amount / 100`, exact to the cent.
    pub usd_amount: Decimal,
}

/// Convert PG coins to USD at the fixed rate.
pub fn pg_to_usd(pg_coins: u64) -> Decimal {
    (Decimal::from(pg_coins) / Decimal::from(PG_COINS_PER_USD)).normalize()
}

impl PayoutDraft {
    /// Validate the draft and compute the USD amount.
    pub fn validate(self) -> Result<PayoutRequest, RelayError> {
        let playfab_id = field::text(self.playfab_id.as_ref())
            .ok_or_else(|| RelayError::missing_field("playfabId"))?;
        let raw_coins = self
            .pg_coins_amount
            .as_ref()
            .filter(|v| field::text(Some(v)).is_some())
            .ok_or_else(|| RelayError::missing_field("pgCoinsAmount"))?;
        let payout_address = field::text(self.payout_address.as_ref())
            .ok_or_else(|| RelayError::missing_field("payoutAddress"))?;
        let payout_currency = field::text(self.payout_currency.as_ref())
            .ok_or_else(|| RelayError::missing_field("payoutCurrency"))?;

        let pg_coins_amount = field::integer(raw_coins)
            .filter(|n| *n > 0)
            .ok_or_else(|| RelayError::validation("pgCoinsAmount must be a positive integer"))?;

        let usd_amount = pg_to_usd(pg_coins_amount);
        if usd_amount < MIN_PAYOUT_USD {
            return Err(RelayError::validation(format!(
                "Minimum payout is ${:.2} ({} PG coins); requested ${:.2} ({} PG coins)",
                MIN_PAYOUT_USD,
                min_payout_pg(),
                usd_amount,
                pg_coins_amount
            )));
        }

        Ok(PayoutRequest {
            playfab_id,
            pg_coins_amount,
            payout_address,
            payout_currency: payout_currency.to_lowercase(),
            usd_amount,
        })
    }
}

/// Body for `POST /v1/payout`.
#[derive(Debug, Clone, Serialize)]
pub struct WithdrawalBatch {
    pub ipn_callback_url: String,
    pub withdrawals: Vec<Withdrawal>,
}

/// A single withdrawal entry.
#[derive(Debug, Clone, Serialize)]
pub struct Withdrawal {
    pub address: String,
    pub currency: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub ipn_callback_url: String,
}

impl WithdrawalBatch {
    /// Build a one-entry batch for a validated payout.
    pub fn single(payout: &PayoutRequest, callback_url: String) -> Self {
        Self {
            ipn_callback_url: callback_url.clone(),
            withdrawals: vec![Withdrawal {
                address: payout.payout_address.clone(),
                currency: payout.payout_currency.clone(),
                amount: payout.usd_amount,
                ipn_callback_url: callback_url,
            }],
        }
    }
}

/// Summary returned to the client once the withdrawal is accepted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutSummary {
    pub success: bool,
    pub payout_id: String,
    pub status: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub payout_amount: Decimal,
    pub payout_currency: String,
    pub estimated_crypto_amount: Value,
    pub playfab_id: String,
    pub pg_coins_amount: u64,
}

impl PayoutSummary {
    /// Combine the validated payout, the estimate and the processor's
    /// withdrawal response. A response without any id is an internal fault.
    pub fn new(
        payout: &PayoutRequest,
        estimated: Value,
        withdrawal: &Value,
    ) -> Result<Self, RelayError> {
        let payout_id = payout_id(withdrawal)
            .ok_or_else(|| RelayError::internal("payout response missing id"))?;

        Ok(Self {
            success: true,
            payout_id,
            status: "processing".to_string(),
            payout_amount: payout.usd_amount,
            payout_currency: payout.payout_currency.clone(),
            estimated_crypto_amount: estimated,
            playfab_id: payout.playfab_id.clone(),
            pg_coins_amount: payout.pg_coins_amount,
        })
    }
}

/// Batch id from a `POST /v1/payout` response, falling back to the first
/// withdrawal's id.
fn payout_id(response: &Value) -> Option<String> {
    field::text(response.get("id")).or_else(|| {
        response
            .get("withdrawals")
            .and_then(|w| w.get(0))
            .and_then(|w| field::text(w.get("id")))
    })
}

/// `estimated_amount` from a `GET /v1/estimate` response.
pub fn estimated_amount(response: &Value) -> Option<Value> {
    response
        .get("estimated_amount")
        .filter(|v| !v.is_null())
        .cloned()
}
