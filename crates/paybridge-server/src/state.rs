use crate::config::ServerConfig;
use paybridge::{PayPalAdapter, PaystackAdapter, TokenManager};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub paystack: PaystackAdapter,
    pub paypal: PayPalAdapter,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("failed to create HTTP client");

        let credentials = Arc::new(config.credentials.clone());
        let tokens = TokenManager::with_cache(http_client.clone(), config.token_cache);

        Self {
            paystack: PaystackAdapter::new(http_client.clone(), credentials.clone()),
            paypal: PayPalAdapter::new(http_client, credentials, tokens),
            config: Arc::new(config),
        }
    }
}
