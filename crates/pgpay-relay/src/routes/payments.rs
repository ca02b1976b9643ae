use std::time::Instant;

use actix_web::{web, HttpRequest, HttpResponse};
use pgpay::PaymentDraft;
use serde::Deserialize;

use super::{lenient_json, request_origin};
use crate::error::ApiError;
use crate::metrics::observe;
use crate::state::AppState;

/// POST /create-payment - Create a payment for a PG coin purchase
pub async fn create_payment(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let draft: PaymentDraft = lenient_json(&body);
    let origin = request_origin(&req);

    let started = Instant::now();
    let result = state.relay.create_payment(draft, &origin).await;
    observe("create_payment", started, &result);

    Ok(HttpResponse::Ok().json(result?))
}

#[derive(Debug, Deserialize)]
pub struct MinAmountQuery {
    pub currency_from: Option<String>,
    pub currency_to: Option<String>,
}

/// GET /min-amount?currency_from=..&currency_to=..
pub async fn min_amount_query(
    query: web::Query<MinAmountQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    min_amount(
        &state,
        query.currency_from.as_deref().unwrap_or_default(),
        query.currency_to.as_deref().unwrap_or_default(),
    )
    .await
}

/// GET /get-min-amount/{from}/{to}
pub async fn min_amount_path(
    path: web::Path<(String, String)>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let (from, to) = path.into_inner();
    min_amount(&state, &from, &to).await
}

async fn min_amount(state: &AppState, from: &str, to: &str) -> Result<HttpResponse, ApiError> {
    let started = Instant::now();
    let result = state.relay.min_amount(from, to).await;
    observe("min_amount", started, &result);

    Ok(HttpResponse::Ok().json(result?))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/create-payment", web::post().to(create_payment))
        .route("/min-amount", web::get().to(min_amount_query))
        .route("/get-min-amount/{from}/{to}", web::get().to(min_amount_path));
}
