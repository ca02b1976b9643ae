use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{DEFAULT_ORDER_DESCRIPTION, DEFAULT_PRICE_CURRENCY, PAYMENT_CALLBACK_PATH};
use crate::error::RelayError;
use crate::field;

/// Purchase intent as sent by the game client, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentDraft {
    pub price_amount: Option<Value>,
    pub price_currency: Option<Value>,
    pub pay_currency: Option<Value>,
    pub order_id: Option<Value>,
    pub order_description: Option<Value>,
    pub ipn_callback_url: Option<Value>,
}

/// Normalized body for `POST /v1/payment`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentRequest {
    pub price_amount: f64,
    pub price_currency: String,
    pub pay_currency: String,
    pub order_id: String,
    pub order_description: String,
    pub ipn_callback_url: String,
}

impl PaymentDraft {
    /// Validate and normalize the draft.
    ///
    /// Required fields are checked in order (`price_amount`, `pay_currency`,
    /// `order_id`) and the first missing one is reported. `callback_base` is
    /// used to synthesize `ipn_callback_url` when the client omitted it.
    pub fn normalize(self, callback_base: &str) -> Result<PaymentRequest, RelayError> {
        let raw_amount = self
            .price_amount
            .as_ref()
            .filter(|v| field::text(Some(v)).is_some())
            .ok_or_else(|| RelayError::missing_field("price_amount"))?;
        let pay_currency = field::text(self.pay_currency.as_ref())
            .ok_or_else(|| RelayError::missing_field("pay_currency"))?;
        let order_id = field::text(self.order_id.as_ref())
            .ok_or_else(|| RelayError::missing_field("order_id"))?;

        let price_amount = parse_price_amount(raw_amount)?;

        let price_currency = field::text(self.price_currency.as_ref())
            .unwrap_or_else(|| DEFAULT_PRICE_CURRENCY.to_string());
        let order_description = field::text(self.order_description.as_ref())
            .unwrap_or_else(|| DEFAULT_ORDER_DESCRIPTION.to_string());
        let ipn_callback_url = field::text(self.ipn_callback_url.as_ref())
            .unwrap_or_else(|| callback_url(callback_base, PAYMENT_CALLBACK_PATH));

        Ok(PaymentRequest {
            price_amount,
            price_currency: price_currency.to_lowercase(),
            pay_currency: pay_currency.to_lowercase(),
            order_id,
            order_description,
            ipn_callback_url,
        })
    }
}

fn parse_price_amount(raw: &Value) -> Result<f64, RelayError> {
    match field::number(raw) {
        Some(amount) if amount > 0.0 => Ok(amount),
        _ => Err(RelayError::validation(
            "price_amount must be a positive number",
        )),
    }
}

/// Join a base URL and a callback path without doubling the slash.
pub fn callback_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft(body: Value) -> PaymentDraft {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_defaults_applied() {
        let req = draft(json!({
            "price_amount": 10,
            "pay_currency": "BTC",
            "order_id": "abc123",
        }))
        .normalize("https://relay.example.com")
        .unwrap();

        assert_eq!(req.price_amount, 10.0);
        assert_eq!(req.price_currency, "usd");
        assert_eq!(req.pay_currency, "btc");
        assert_eq!(req.order_id, "abc123");
        assert_eq!(req.order_description, "Unity Game Purchase");
        assert_eq!(
            req.ipn_callback_url,
            "https://relay.example.com/ipn-callback"
        );
    }

    #[test]
    fn test_client_values_kept_and_lowercased() {
        let req = draft(json!({
            "price_amount": "4.99",
            "price_currency": "EUR",
            "pay_currency": "Eth",
            "order_id": 7781,
            "order_description": "Gem pack",
            "ipn_callback_url": "https://hooks.example.com/ipn",
        }))
        .normalize("http://ignored")
        .unwrap();

        assert_eq!(req.price_amount, 4.99);
        assert_eq!(req.price_currency, "eur");
        assert_eq!(req.pay_currency, "eth");
        assert_eq!(req.order_id, "7781");
        assert_eq!(req.order_description, "Gem pack");
        assert_eq!(req.ipn_callback_url, "https://hooks.example.com/ipn");
    }

    #[test]
    fn test_missing_fields_reported_in_order() {
        let err = draft(json!({})).normalize("http://h").unwrap_err();
        assert_eq!(err.body()["error"], "Missing required field: price_amount");

        let err = draft(json!({"price_amount": 5, "order_id": "x"}))
            .normalize("http://h")
            .unwrap_err();
        assert_eq!(err.body()["error"], "Missing required field: pay_currency");

        let err = draft(json!({"price_amount": 5, "pay_currency": "btc", "order_id": ""}))
            .normalize("http://h")
            .unwrap_err();
        assert_eq!(err.body()["error"], "Missing required field: order_id");
    }

    #[test]
    fn test_empty_price_amount_is_missing() {
        let err = draft(json!({"price_amount": "", "pay_currency": "btc", "order_id": "a"}))
            .normalize("http://h")
            .unwrap_err();
        assert_eq!(err.body()["error"], "Missing required field: price_amount");
    }

    #[test]
    fn test_non_positive_or_garbage_amount_rejected() {
        for amount in [json!(0), json!(-3), json!("abc"), json!("-0.5"), json!(true)] {
            let err = draft(json!({
                "price_amount": amount,
                "pay_currency": "btc",
                "order_id": "a",
            }))
            .normalize("http://h")
            .unwrap_err();
            assert!(matches!(err, RelayError::Validation(_)), "{amount}");
            assert_eq!(err.status(), 400);
        }
    }

    #[test]
    fn test_callback_url_trims_slash() {
        assert_eq!(
            callback_url("https://a.example/", "/ipn-callback"),
            "https://a.example/ipn-callback"
        );
    }
}
