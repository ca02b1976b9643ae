use actix_web::{web, HttpRequest, HttpResponse};
use pgpay::constants::{
    min_payout_pg, pg_to_usd_rate, MIN_PAYOUT_USD, PG_COINS_PER_USD, SUPPORTED_PAYOUT_CURRENCIES,
};
use rust_decimal::prelude::ToPrimitive;

use crate::metrics::metrics_output;
use crate::state::AppState;

/// GET / - Liveness text
pub async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("PG payments relay is running")
}

/// GET /health - Health check endpoint
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "OK",
        "serverTime": chrono::Utc::now().to_rfc3339(),
    }))
}

/// GET /debug-env - Reports configuration without exposing the API key
pub async fn debug_env(state: web::Data<AppState>) -> HttpResponse {
    let config = &state.config;
    HttpResponse::Ok().json(serde_json::json!({
        "apiKeyConfigured": config.api_key.is_some(),
        "publicBaseUrl": config.public_base_url,
        "environment": config.environment.as_str(),
        "apiUrl": config.api_url,
        "timeoutSecs": config.upstream_timeout.as_secs(),
    }))
}

/// GET /conversion-rate - PG coin economics for the client UI
pub async fn conversion_rate() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "pgToUsdRate": pg_to_usd_rate().to_f64(),
        "pgCoinsPerUsd": PG_COINS_PER_USD,
        "minimumPayoutUsd": MIN_PAYOUT_USD.to_f64(),
        "minimumPayoutPg": min_payout_pg(),
        "supportedCurrencies": SUPPORTED_PAYOUT_CURRENCIES,
    }))
}

/// Constant-time byte comparison that does not leak input lengths.
/// Both inputs are hashed to fixed-length digests before comparison.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    use sha2::{Digest, Sha256};
    let ha = Sha256::digest(a);
    let hb = Sha256::digest(b);
    let mut result = 0u8;
    for (x, y) in ha.iter().zip(hb.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// GET /metrics - Prometheus metrics endpoint (optionally auth-gated)
pub async fn metrics(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    if let Some(ref expected_token) = state.config.metrics_token {
        let authorized = req
            .headers()
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|token| constant_time_eq(token.as_bytes(), expected_token.as_bytes()))
            .unwrap_or(false);

        if !authorized {
            return HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "unauthorized",
                "message": "Valid Bearer token required for /metrics"
            }));
        }
    }

    match metrics_output() {
        Ok(output) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(output),
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            HttpResponse::InternalServerError().body("Failed to encode metrics")
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/health", web::get().to(health))
        .route("/debug-env", web::get().to(debug_env))
        .route("/conversion-rate", web::get().to(conversion_rate))
        .route("/metrics", web::get().to(metrics));
}
