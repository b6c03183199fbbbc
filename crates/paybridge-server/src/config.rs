use paybridge::credentials::{DEFAULT_BRAND_NAME, DEFAULT_PAYPAL_BASE_URL, DEFAULT_PAYSTACK_BASE_URL};
use paybridge::CredentialStore;
use std::env;
use url::Url;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_RATE_LIMIT_RPM: u32 = 120;

#[derive(Clone)]
pub struct ServerConfig {
    /// Provider secrets and base URLs
    pub credentials: CredentialStore,
    /// Server port
    pub port: u16,
    /// CORS allowed origins
    pub allowed_origins: Vec<String>,
    /// Rate limit requests per minute (per client IP)
    pub rate_limit_rpm: u32,
    /// Reuse OAuth tokens until shortly before expiry (opt-in)
    pub token_cache: bool,
    /// Bearer token required for /metrics (None = see `public_metrics`)
    pub metrics_token: Option<String>,
    /// Serve /metrics without a token when none is configured
    pub public_metrics: bool,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("credentials", &self.credentials)
            .field("port", &self.port)
            .field("allowed_origins", &self.allowed_origins)
            .field("rate_limit_rpm", &self.rate_limit_rpm)
            .field("token_cache", &self.token_cache)
            .field(
                "metrics_token",
                &self.metrics_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("public_metrics", &self.public_metrics)
            .finish()
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source. Blank
    /// values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // Provider endpoints
        let paystack_base_url = var("PAYSTACK_BASE_URL")
            .unwrap_or_else(|| DEFAULT_PAYSTACK_BASE_URL.to_string());
        validate_base_url("PAYSTACK_BASE_URL", &paystack_base_url)?;

        let paypal_base_url =
            var("PAYPAL_BASE_URL").unwrap_or_else(|| DEFAULT_PAYPAL_BASE_URL.to_string());
        validate_base_url("PAYPAL_BASE_URL", &paypal_base_url)?;

        // Provider secrets: missing ones only disable the matching endpoints
        let paystack_key = var("PAYSTACK_SECRET_KEY");
        if paystack_key.is_none() {
            tracing::warn!("PAYSTACK_SECRET_KEY not set — Paystack endpoints will fail");
        }

        let paypal_client_id = var("PAYPAL_CLIENT_ID");
        let paypal_client_secret = var("PAYPAL_CLIENT_SECRET");
        if paypal_client_id.is_none() || paypal_client_secret.is_none() {
            tracing::warn!(
                "PAYPAL_CLIENT_ID or PAYPAL_CLIENT_SECRET not set — PayPal endpoints will fail"
            );
        }

        let brand_name = var("PAYPAL_BRAND_NAME").unwrap_or_else(|| DEFAULT_BRAND_NAME.to_string());

        let credentials = CredentialStore::default()
            .with_paystack_base_url(paystack_base_url)
            .with_paypal_base_url(paypal_base_url)
            .with_paystack_key(paystack_key.unwrap_or_default())
            .with_paypal_client(
                paypal_client_id.unwrap_or_default(),
                paypal_client_secret.unwrap_or_default(),
            )
            .with_paypal_brand_name(brand_name);

        // Optional: port
        let port = var("PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        // Optional: allowed origins
        let allowed_origins: Vec<String> = var("ALLOWED_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| {
                vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ]
            });

        // Optional: rate limit
        let rate_limit_rpm = var("RATE_LIMIT_RPM")
            .and_then(|s| s.parse().ok())
            .filter(|rpm| *rpm > 0)
            .unwrap_or(DEFAULT_RATE_LIMIT_RPM);

        let token_cache = parse_flag("PAYPAL_TOKEN_CACHE", var("PAYPAL_TOKEN_CACHE"), false)?;

        // Optional: metrics token
        let metrics_token = var("METRICS_TOKEN");
        let public_metrics = parse_flag("PUBLIC_METRICS", var("PUBLIC_METRICS"), false)?;

        if allowed_origins.iter().any(|o| o == "*") {
            tracing::warn!("Wildcard CORS origin '*' configured — any site can call the payment API");
        }

        if metrics_token.is_none() && public_metrics {
            tracing::warn!("METRICS_TOKEN not set and PUBLIC_METRICS=true — /metrics is publicly accessible");
        }

        Ok(Self {
            credentials,
            port,
            allowed_origins,
            rate_limit_rpm,
            token_cache,
            metrics_token,
            public_metrics,
        })
    }
}

fn validate_base_url(name: &'static str, value: &str) -> Result<(), ConfigError> {
    let parsed = Url::parse(value).map_err(|_| ConfigError::InvalidUrl(name, value.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(name, value.to_string()));
    }
    Ok(())
}

fn parse_flag(name: &'static str, value: Option<String>, default: bool) -> Result<bool, ConfigError> {
    match value.as_deref().map(str::trim) {
        None => Ok(default),
        Some("true") | Some("1") => Ok(true),
        Some("false") | Some("0") => Ok(false),
        Some(other) => Err(ConfigError::InvalidValue(name, other.to_string())),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL in {0}: {1}")]
    InvalidUrl(&'static str, String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
