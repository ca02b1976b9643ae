use std::time::Duration;

use pgpay::constants::{DEFAULT_TIMEOUT_SECS, NOWPAYMENTS_API_URL};
use pgpay::RelayConfig;
use url::Url;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_RATE_LIMIT_RPM: u64 = 120;

/// Deployment mode; controls whether internal error detail reaches clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Development,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Development => "development",
        }
    }
}

#[derive(Clone)]
pub struct ServerConfig {
    /// NOWPayments API key (None = every relay call fails with a config error)
    pub api_key: Option<String>,
    /// NOWPayments API base URL
    pub api_url: String,
    /// Externally visible base URL used to build callback URLs
    pub public_base_url: Option<String>,
    /// Server port
    pub port: u16,
    /// Upstream request timeout
    pub upstream_timeout: Duration,
    pub environment: Environment,
    /// CORS allowed origins ("*" = any)
    pub allowed_origins: Vec<String>,
    /// Rate limit requests per minute per IP
    pub rate_limit_rpm: u64,
    /// Bearer token required for /metrics (None = public)
    pub metrics_token: Option<String>,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_url", &self.api_url)
            .field("public_base_url", &self.public_base_url)
            .field("port", &self.port)
            .field("upstream_timeout", &self.upstream_timeout)
            .field("environment", &self.environment)
            .field("allowed_origins", &self.allowed_origins)
            .field("rate_limit_rpm", &self.rate_limit_rpm)
            .field(
                "metrics_token",
                &self.metrics_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: NOWPAYMENTS_API_URL.to_string(),
            public_base_url: None,
            port: DEFAULT_PORT,
            upstream_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            environment: Environment::Production,
            allowed_origins: vec!["*".to_string()],
            rate_limit_rpm: DEFAULT_RATE_LIMIT_RPM,
            metrics_token: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        // Optional: API key. Missing is reported per request, not here.
        let api_key = var("NOWPAYMENTS_API_KEY");

        // Optional: API URL
        let api_url = var("NOWPAYMENTS_API_URL").unwrap_or_else(|| NOWPAYMENTS_API_URL.to_string());
        validate_http_url(&api_url)?;

        // Optional: public base URL
        let public_base_url = var("PUBLIC_BASE_URL");
        if let Some(ref base) = public_base_url {
            validate_http_url(base)?;
        }

        // Optional: port
        let port = match var("PORT") {
            Some(p) => p.parse::<u16>().map_err(|_| ConfigError::InvalidNumber("PORT", p))?,
            None => DEFAULT_PORT,
        };

        // Optional: upstream timeout
        let timeout_secs: u64 = match var("UPSTREAM_TIMEOUT_SECS") {
            Some(t) => t
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidNumber("UPSTREAM_TIMEOUT_SECS", t))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let environment = match var("RELAY_ENV").as_deref() {
            None | Some("production") | Some("prod") => Environment::Production,
            Some("development") | Some("dev") => Environment::Development,
            Some(other) => return Err(ConfigError::InvalidEnvironment(other.to_string())),
        };

        // Optional: allowed origins
        let allowed_origins: Vec<String> = var("ALLOWED_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| vec!["*".to_string()]);

        // Optional: rate limit
        let rate_limit_rpm = match var("RATE_LIMIT_RPM") {
            Some(r) => r
                .parse::<u64>()
                .ok()
                .filter(|rpm| *rpm > 0)
                .ok_or(ConfigError::InvalidNumber("RATE_LIMIT_RPM", r))?,
            None => DEFAULT_RATE_LIMIT_RPM,
        };

        // Optional: metrics token
        let metrics_token = var("METRICS_TOKEN");

        if api_key.is_none() {
            tracing::warn!(
                "NOWPAYMENTS_API_KEY not set; payment endpoints will answer 500 until it is configured"
            );
        }
        if metrics_token.is_none() {
            tracing::warn!("METRICS_TOKEN not set; /metrics endpoint is publicly accessible");
        }

        Ok(Self {
            api_key,
            api_url,
            public_base_url,
            port,
            upstream_timeout: Duration::from_secs(timeout_secs),
            environment,
            allowed_origins,
            rate_limit_rpm,
            metrics_token,
        })
    }

    /// The subset handed to the relay service.
    pub fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            api_key: self.api_key.clone(),
            public_base_url: self.public_base_url.clone(),
            production: self.environment == Environment::Production,
        }
    }
}

fn validate_http_url(raw: &str) -> Result<(), ConfigError> {
    let parsed = Url::parse(raw).map_err(|_| ConfigError::InvalidUrl(raw.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(raw.to_string()));
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("invalid value for {0}: {1}")]
    InvalidNumber(&'static str, String),

    #[error("unknown RELAY_ENV: {0} (expected production or development)")]
    InvalidEnvironment(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.api_key, None);
        assert_eq!(config.api_url, "https://api.nowpayments.io");
        assert_eq!(config.port, 3000);
        assert_eq!(config.upstream_timeout, Duration::from_secs(30));
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.allowed_origins, vec!["*".to_string()]);
        assert!(config.relay_config().production);
    }

    #[test]
    fn test_full_configuration() {
        let config = load(&[
            ("NOWPAYMENTS_API_KEY", "NP-KEY-123"),
            ("NOWPAYMENTS_API_URL", "https://api-sandbox.nowpayments.io"),
            ("PUBLIC_BASE_URL", "https://relay.example.com"),
            ("PORT", "8080"),
            ("UPSTREAM_TIMEOUT_SECS", "10"),
            ("RELAY_ENV", "development"),
            ("ALLOWED_ORIGINS", "https://game.example.com, https://cdn.example.com"),
            ("RATE_LIMIT_RPM", "30"),
        ])
        .unwrap();

        assert_eq!(config.api_key.as_deref(), Some("NP-KEY-123"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.upstream_timeout, Duration::from_secs(10));
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.allowed_origins.len(), 2);
        assert_eq!(config.rate_limit_rpm, 30);

        let relay = config.relay_config();
        assert!(!relay.production);
        assert!(relay.api_key_configured());
        assert_eq!(
            relay.public_base_url.as_deref(),
            Some("https://relay.example.com")
        );
    }

    #[test]
    fn test_blank_api_key_is_absent() {
        let config = load(&[("NOWPAYMENTS_API_KEY", "  ")]).unwrap();
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            load(&[("PUBLIC_BASE_URL", "not a url")]),
            Err(ConfigError::InvalidUrl(_))
        ));
        assert!(matches!(
            load(&[("NOWPAYMENTS_API_URL", "ftp://api.nowpayments.io")]),
            Err(ConfigError::InvalidUrl(_))
        ));
        assert!(matches!(
            load(&[("PORT", "http")]),
            Err(ConfigError::InvalidNumber("PORT", _))
        ));
        assert!(matches!(
            load(&[("UPSTREAM_TIMEOUT_SECS", "0")]),
            Err(ConfigError::InvalidNumber("UPSTREAM_TIMEOUT_SECS", _))
        ));
        assert!(matches!(
            load(&[("RELAY_ENV", "staging")]),
            Err(ConfigError::InvalidEnvironment(_))
        ));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = load(&[
            ("NOWPAYMENTS_API_KEY", "NP-KEY-123"),
            ("METRICS_TOKEN", "metrics-secret"),
        ])
        .unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("NP-KEY-123"));
        assert!(!rendered.contains("metrics-secret"));
    }
}
