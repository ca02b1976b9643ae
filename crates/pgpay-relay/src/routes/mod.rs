pub mod callbacks;
pub mod health;
pub mod payments;
pub mod payouts;

use actix_web::{web, HttpRequest};

/// Mount every relay route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::configure)
        .configure(payments::configure)
        .configure(payouts::configure)
        .configure(callbacks::configure);
}

/// `scheme://host` of the inbound request, honoring forwarding headers.
pub(crate) fn request_origin(req: &HttpRequest) -> String {
    let info = req.connection_info();
    format!("{}://{}", info.scheme(), info.host())
}

/// Parse a JSON body leniently. Anything unparseable yields an empty draft so
/// the required-field checks report what is missing.
pub(crate) fn lenient_json<T: serde::de::DeserializeOwned + Default>(body: &[u8]) -> T {
    serde_json::from_slice(body).unwrap_or_else(|e| {
        if !body.is_empty() {
            tracing::debug!(error = %e, "request body is not a JSON object");
        }
        T::default()
    })
}
