use std::sync::Arc;

use pgpay::{CallbackHooks, NowPaymentsClient, Relay};

use crate::config::ServerConfig;

/// Shared application state
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub relay: Relay<NowPaymentsClient>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Result<Self, reqwest::Error> {
        let client = NowPaymentsClient::new(&config.api_url, config.upstream_timeout)?;
        let relay = Relay::new(config.relay_config(), client);

        Ok(Self {
            config: Arc::new(config),
            relay,
        })
    }

    /// Swap in callback hooks backed by a real ledger.
    pub fn with_hooks(mut self, hooks: Arc<dyn CallbackHooks>) -> Self {
        self.relay = self.relay.with_hooks(hooks);
        self
    }
}
