use rust_decimal::Decimal;

/// Production NOWPayments API base URL.
pub const NOWPAYMENTS_API_URL: &str = "https://api.nowpayments.io";

/// Header carrying the NOWPayments API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Name of the environment variable holding the API key, echoed in
/// configuration errors so operators know what to set.
pub const API_KEY_ENV: &str = "NOWPAYMENTS_API_KEY";

/// Upstream request timeout when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_PRICE_CURRENCY: &str = "usd";
pub const DEFAULT_ORDER_DESCRIPTION: &str = "Unity Game Purchase";

/// Callback paths appended to the public base URL.
pub const PAYMENT_CALLBACK_PATH: &str = "/ipn-callback";
pub const PAYOUT_CALLBACK_PATH: &str = "/payout-callback";

/// 100 PG coins = $1.
pub const PG_COINS_PER_USD: u64 = 100;

/// Minimum payout in USD.
pub const MIN_PAYOUT_USD: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Currencies the game offers for payouts.
pub const SUPPORTED_PAYOUT_CURRENCIES: &[&str] = &["btc", "eth", "ltc", "usdttrc20", "doge"];

/// Minimum payout expressed in PG coins.
pub fn min_payout_pg() -> u64 {
    use rust_decimal::prelude::ToPrimitive;
    (MIN_PAYOUT_USD * Decimal::from(PG_COINS_PER_USD))
        .to_u64()
        .unwrap_or(u64::MAX)
}

/// USD value of a single PG coin (0.01).
pub fn pg_to_usd_rate() -> Decimal {
    Decimal::ONE / Decimal::from(PG_COINS_PER_USD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_payout_in_pg_coins() {
        assert_eq!(min_payout_pg(), 500);
    }

    #[test]
    fn test_pg_to_usd_rate() {
        assert_eq!(pg_to_usd_rate(), Decimal::new(1, 2));
    }
}
