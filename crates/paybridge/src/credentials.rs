//! Provider secrets and endpoints, fixed at process start.

pub const DEFAULT_PAYSTACK_BASE_URL: &str = "https://api.paystack.co";
pub const DEFAULT_PAYPAL_BASE_URL: &str = "https://api-m.sandbox.paypal.com";
pub const DEFAULT_BRAND_NAME: &str = "Paybridge";

/// Secret key for the direct-charge provider.
#[derive(Clone)]
pub struct PaystackCredentials {
    pub secret_key: String,
}

impl std::fmt::Debug for PaystackCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaystackCredentials")
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

/// OAuth client credentials for the delegated-order provider.
#[derive(Clone)]
pub struct PayPalCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for PayPalCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayPalCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// Read-only credential store shared by every adapter.
///
/// Built once by the server configuration; never mutated afterwards.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    pub paystack: Option<PaystackCredentials>,
    pub paystack_base_url: String,
    pub paypal: Option<PayPalCredentials>,
    pub paypal_base_url: String,
    /// Display name shown on the PayPal approval page
    pub paypal_brand_name: String,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self {
            paystack: None,
            paystack_base_url: DEFAULT_PAYSTACK_BASE_URL.to_string(),
            paypal: None,
            paypal_base_url: DEFAULT_PAYPAL_BASE_URL.to_string(),
            paypal_brand_name: DEFAULT_BRAND_NAME.to_string(),
        }
    }
}

impl CredentialStore {
    /// Empty strings count as "not configured".
    pub fn with_paystack_key(mut self, secret_key: impl Into<String>) -> Self {
        let secret_key = secret_key.into();
        self.paystack = (!secret_key.is_empty()).then_some(PaystackCredentials { secret_key });
        self
    }

    pub fn with_paypal_client(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        let client_id = client_id.into();
        let client_secret = client_secret.into();
        self.paypal = (!client_id.is_empty() && !client_secret.is_empty()).then_some(
            PayPalCredentials {
                client_id,
                client_secret,
            },
        );
        self
    }

    pub fn with_paystack_base_url(mut self, url: impl Into<String>) -> Self {
        self.paystack_base_url = url.into();
        self
    }

    pub fn with_paypal_base_url(mut self, url: impl Into<String>) -> Self {
        self.paypal_base_url = url.into();
        self
    }

    pub fn with_paypal_brand_name(mut self, name: impl Into<String>) -> Self {
        self.paypal_brand_name = name.into();
        self
    }

    pub fn paystack_configured(&self) -> bool {
        self.paystack.is_some()
    }

    pub fn paypal_configured(&self) -> bool {
        self.paypal.is_some()
    }
}

/// Join a base URL and an API path without doubling the slash.
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_secrets_are_not_configured() {
        let store = CredentialStore::default()
            .with_paystack_key("")
            .with_paypal_client("id", "");
        assert!(!store.paystack_configured());
        assert!(!store.paypal_configured());

        let store = store
            .with_paystack_key("sk_test")
            .with_paypal_client("id", "secret");
        assert!(store.paystack_configured());
        assert!(store.paypal_configured());
    }

    #[test]
    fn debug_redacts_secrets() {
        let store = CredentialStore::default()
            .with_paystack_key("sk_live_123")
            .with_paypal_client("client", "hunter2");
        let out = format!("{store:?}");
        assert!(!out.contains("sk_live_123"));
        assert!(!out.contains("hunter2"));
        assert!(out.contains("client"));
    }

    #[test]
    fn endpoint_trims_trailing_slash() {
        assert_eq!(
            endpoint("https://api.paystack.co/", "/transaction/initialize"),
            "https://api.paystack.co/transaction/initialize"
        );
    }
}
