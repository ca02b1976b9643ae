use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::{middleware::Logger, web, App, HttpServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pgpay_relay::{
    config::ServerConfig, metrics::register_metrics, routes, state::AppState, BODY_LIMIT,
};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = ServerConfig::from_env().expect("Failed to load configuration");
    let port = config.port;
    let allowed_origins = config.allowed_origins.clone();
    let rate_limit_rpm = config.rate_limit_rpm;

    tracing::info!("Starting pgpay-relay on port {}", port);
    tracing::info!("NOWPayments API: {}", config.api_url);
    tracing::info!("Environment: {}", config.environment.as_str());
    tracing::info!(
        "API key: {}",
        if config.api_key.is_some() {
            "configured"
        } else {
            "missing"
        }
    );
    match config.public_base_url {
        Some(ref base) => tracing::info!("Callback base URL: {}", base),
        None => tracing::info!("Callback base URL: derived from each request"),
    }

    // Register Prometheus metrics
    register_metrics();

    // Create shared state
    let state = AppState::new(config).expect("Failed to build NOWPayments client");
    let state_data = web::Data::new(state);

    // Configure rate limiter
    let governor_conf = GovernorConfigBuilder::default()
        .requests_per_minute(rate_limit_rpm)
        .finish()
        .expect("Failed to create rate limiter config");

    // Start HTTP server
    HttpServer::new(move || {
        let cors = pgpay_relay::cors::build_cors(&allowed_origins);

        App::new()
            .app_data(state_data.clone())
            .app_data(web::JsonConfig::default().limit(BODY_LIMIT))
            .app_data(web::PayloadConfig::new(BODY_LIMIT))
            .wrap(Logger::default())
            .wrap(cors)
            .wrap(Governor::new(&governor_conf))
            .configure(routes::configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
