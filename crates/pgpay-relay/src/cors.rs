//! CORS configuration for browser (Unity WebGL) clients.

use actix_cors::Cors;

/// Build the CORS middleware from allowed origins. `*` admits any origin,
/// which WebGL builds served from arbitrary CDNs need.
pub fn build_cors(allowed_origins: &[String]) -> Cors {
    let cors = if allowed_origins.iter().any(|o| o == "*") {
        Cors::default().allow_any_origin()
    } else {
        allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors.allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![
            actix_web::http::header::ORIGIN,
            actix_web::http::header::ACCEPT,
            actix_web::http::header::CONTENT_TYPE,
            actix_web::http::header::HeaderName::from_static("x-requested-with"),
        ])
        .max_age(3600)
}
