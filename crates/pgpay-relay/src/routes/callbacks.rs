use actix_web::{http::StatusCode, web, HttpResponse};
use pgpay::{CallbackAction, CallbackKind};

use crate::metrics::CALLBACKS;
use crate::state::AppState;

/// POST /ipn-callback - Payment status notification
pub async fn ipn_callback(
    body: Result<web::Bytes, actix_web::Error>,
    state: web::Data<AppState>,
) -> HttpResponse {
    acknowledge(CallbackKind::Payment, body, &state)
}

/// POST /payout-callback - Withdrawal status notification
pub async fn payout_callback(
    body: Result<web::Bytes, actix_web::Error>,
    state: web::Data<AppState>,
) -> HttpResponse {
    acknowledge(CallbackKind::Payout, body, &state)
}

/// Always "OK" unless the body itself could not be read. An oversized body
/// is the notifier's fault and is acknowledged as malformed.
fn acknowledge(
    kind: CallbackKind,
    body: Result<web::Bytes, actix_web::Error>,
    state: &AppState,
) -> HttpResponse {
    let body = match body {
        Ok(body) => body,
        Err(e) if e.as_response_error().status_code() == StatusCode::PAYLOAD_TOO_LARGE => {
            tracing::warn!(kind = kind.as_str(), error = %e, "callback body over size limit");
            CALLBACKS
                .with_label_values(&[kind.as_str(), CallbackAction::Malformed.as_str()])
                .inc();
            return ok();
        }
        Err(e) => {
            tracing::error!(kind = kind.as_str(), error = %e, "failed to read callback body");
            CALLBACKS.with_label_values(&[kind.as_str(), "error"]).inc();
            return HttpResponse::InternalServerError()
                .content_type("text/plain; charset=utf-8")
                .body("Error");
        }
    };

    let action = state.relay.handle_status_callback(kind, &body);
    CALLBACKS
        .with_label_values(&[kind.as_str(), action.as_str()])
        .inc();

    ok()
}

fn ok() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("OK")
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/ipn-callback", web::post().to(ipn_callback))
        .route("/payout-callback", web::post().to(payout_callback));
}
