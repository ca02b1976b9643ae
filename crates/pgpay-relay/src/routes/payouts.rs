use std::time::Instant;

use actix_web::{web, HttpRequest, HttpResponse};
use pgpay::PayoutDraft;

use super::{lenient_json, request_origin};
use crate::error::ApiError;
use crate::metrics::observe;
use crate::state::AppState;

/// POST /payout-pg - Cash PG coins out to a crypto address
pub async fn payout_pg(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let draft: PayoutDraft = lenient_json(&body);
    let origin = request_origin(&req);

    let started = Instant::now();
    let result = state.relay.create_payout(draft, &origin).await;
    observe("create_payout", started, &result);

    Ok(HttpResponse::Ok().json(result?))
}

/// GET /payout-status/{payoutId}
pub async fn payout_status(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let payout_id = path.into_inner();

    let started = Instant::now();
    let result = state.relay.payout_status(&payout_id).await;
    observe("payout_status", started, &result);

    Ok(HttpResponse::Ok().json(result?))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/payout-pg", web::post().to(payout_pg))
        .route("/payout-status/{payoutId}", web::get().to(payout_status));
}
