//! OAuth2 client-credentials tokens for the delegated-order provider.
//!
//! By default every call exchanges credentials for a fresh token. With
//! caching enabled, tokens are kept per `(base_url, client_id)` until shortly
//! before they expire. Each key owns an async mutex, so concurrent callers
//! wait for a single in-flight refresh instead of all hitting the token
//! endpoint.

use base64::Engine;
use dashmap::DashMap;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::credentials::{endpoint, PayPalCredentials};
use crate::error::PaymentError;
use crate::metrics::TOKEN_REQUESTS;

/// Tokens are treated as expired this long before the provider says so.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Bearer token returned by the client-credentials grant.
#[derive(Clone)]
pub struct AccessToken {
    value: String,
    acquired_at: Instant,
    expires_in: Option<Duration>,
}

impl AccessToken {
    pub fn new(value: impl Into<String>, expires_in: Option<Duration>) -> Self {
        Self {
            value: value.into(),
            acquired_at: Instant::now(),
            expires_in,
        }
    }

    pub fn secret(&self) -> &str {
        &self.value
    }

    pub fn acquired_at(&self) -> Instant {
        self.acquired_at
    }

    /// Without an `expires_in` the token is never reused.
    fn is_fresh(&self) -> bool {
        match self.expires_in {
            Some(ttl) if ttl > EXPIRY_MARGIN => self.acquired_at.elapsed() < ttl - EXPIRY_MARGIN,
            _ => false,
        }
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"[REDACTED]")
            .field("acquired_at", &self.acquired_at)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TokenKey {
    base_url: String,
    client_id: String,
}

impl TokenKey {
    fn new(credentials: &PayPalCredentials, base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id: credentials.client_id.clone(),
        }
    }
}

type TokenSlot = Arc<Mutex<Option<AccessToken>>>;

/// Obtains bearer tokens, optionally reusing unexpired ones.
#[derive(Clone)]
pub struct TokenManager {
    http: reqwest::Client,
    cache: Option<Arc<DashMap<TokenKey, TokenSlot>>>,
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("cached", &self.cache.is_some())
            .finish()
    }
}

impl TokenManager {
    /// Token manager that performs a full exchange on every call.
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_cache(http, false)
    }

    /// `cache = true` reuses a token until shortly before it expires.
    pub fn with_cache(http: reqwest::Client, cache: bool) -> Self {
        Self {
            http,
            cache: cache.then(|| Arc::new(DashMap::new())),
        }
    }

    pub fn caching(&self) -> bool {
        self.cache.is_some()
    }

    /// Return a usable bearer token for `credentials` at `base_url`.
    pub async fn acquire_token(
        &self,
        credentials: &PayPalCredentials,
        base_url: &str,
    ) -> Result<AccessToken, PaymentError> {
        let Some(cache) = &self.cache else {
            return self.fetch(credentials, base_url).await;
        };

        let slot: TokenSlot = Arc::clone(
            cache
                .entry(TokenKey::new(credentials, base_url))
                .or_default()
                .value(),
        );

        let mut guard = slot.lock().await;
        if let Some(token) = guard.as_ref().filter(|t| t.is_fresh()) {
            TOKEN_REQUESTS.with_label_values(&["cached"]).inc();
            return Ok(token.clone());
        }

        let token = self.fetch(credentials, base_url).await?;
        *guard = Some(token.clone());
        Ok(token)
    }

    /// Drop any cached token so the next call performs a fresh exchange.
    pub async fn invalidate(&self, credentials: &PayPalCredentials, base_url: &str) {
        let Some(cache) = &self.cache else {
            return;
        };
        let slot = cache
            .get(&TokenKey::new(credentials, base_url))
            .map(|entry| Arc::clone(entry.value()));
        if let Some(slot) = slot {
            *slot.lock().await = None;
            tracing::debug!(client_id = %credentials.client_id, "cached OAuth token invalidated");
        }
    }

    async fn fetch(
        &self,
        credentials: &PayPalCredentials,
        base_url: &str,
    ) -> Result<AccessToken, PaymentError> {
        let url = endpoint(base_url, "/v1/oauth2/token");
        let basic = base64::engine::general_purpose::STANDARD.encode(format!(
            "{}:{}",
            credentials.client_id, credentials.client_secret
        ));

        let result = self
            .http
            .post(&url)
            .header(AUTHORIZATION, format!("Basic {basic}"))
            .header(ACCEPT, "application/json")
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await;

        let resp = match result {
            Ok(resp) => resp,
            Err(e) => {
                TOKEN_REQUESTS.with_label_values(&["failed"]).inc();
                tracing::error!(url = %url, error = %e, "OAuth token request failed");
                return Err(PaymentError::Auth(format!("token request failed: {e}")));
            }
        };

        let status = resp.status();
        let body: Value = match resp.text().await {
            Ok(text) => serde_json::from_str(&text).unwrap_or(Value::Null),
            Err(_) => Value::Null,
        };

        if !status.is_success() {
            TOKEN_REQUESTS.with_label_values(&["failed"]).inc();
            let description = describe_rejection(&body)
                .unwrap_or_else(|| format!("token endpoint returned {status}"));
            tracing::error!(
                status = %status,
                description = %description,
                "OAuth token exchange rejected"
            );
            return Err(PaymentError::Auth(description));
        }

        let Some(access_token) = body
            .get("access_token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
        else {
            TOKEN_REQUESTS.with_label_values(&["failed"]).inc();
            tracing::error!("OAuth token response did not include an access token");
            return Err(PaymentError::Auth(
                describe_rejection(&body)
                    .unwrap_or_else(|| "token response did not include an access token".into()),
            ));
        };

        let expires_in = body
            .get("expires_in")
            .and_then(Value::as_u64)
            .map(Duration::from_secs);

        TOKEN_REQUESTS.with_label_values(&["fetched"]).inc();
        tracing::debug!(client_id = %credentials.client_id, ?expires_in, "OAuth token acquired");
        Ok(AccessToken::new(access_token, expires_in))
    }
}

/// Prefer the provider's `error_description`, falling back to `error`.
fn describe_rejection(body: &Value) -> Option<String> {
    body.get("error_description")
        .or_else(|| body.get("error"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const BASIC: &str = "Basic Y2xpZW50OnNlY3JldA==";

    fn credentials() -> PayPalCredentials {
        PayPalCredentials {
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
        }
    }

    async fn token_mock(server: &mut mockito::Server, expires_in: u64, hits: usize) -> mockito::Mock {
        server
            .mock("POST", "/v1/oauth2/token")
            .match_header("authorization", BASIC)
            .match_body(Matcher::UrlEncoded(
                "grant_type".into(),
                "client_credentials".into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(
                r#"{{"access_token":"A21AA-token","token_type":"Bearer","expires_in":{expires_in}}}"#
            ))
            .expect(hits)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn exchanges_client_credentials() {
        let mut server = mockito::Server::new_async().await;
        let m = token_mock(&mut server, 32400, 1).await;

        let manager = TokenManager::with_cache(reqwest::Client::new(), false);
        let token = manager.acquire_token(&credentials(), &server.url()).await.unwrap();

        assert_eq!(token.secret(), "A21AA-token");
        m.assert_async().await;
    }

    #[tokio::test]
    async fn default_manager_refetches_every_call() {
        let mut server = mockito::Server::new_async().await;
        let m = token_mock(&mut server, 32400, 2).await;

        let manager = TokenManager::new(reqwest::Client::new());
        assert!(!manager.caching());
        manager.acquire_token(&credentials(), &server.url()).await.unwrap();
        manager.acquire_token(&credentials(), &server.url()).await.unwrap();

        m.assert_async().await;
    }

    #[tokio::test]
    async fn cached_manager_reuses_fresh_token() {
        let mut server = mockito::Server::new_async().await;
        let m = token_mock(&mut server, 32400, 1).await;

        let manager = TokenManager::with_cache(reqwest::Client::new(), true);
        let first = manager.acquire_token(&credentials(), &server.url()).await.unwrap();
        let second = manager.acquire_token(&credentials(), &server.url()).await.unwrap();

        assert_eq!(first.secret(), second.secret());
        assert_eq!(first.acquired_at(), second.acquired_at());
        m.assert_async().await;
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_refresh() {
        let mut server = mockito::Server::new_async().await;
        let m = token_mock(&mut server, 32400, 1).await;

        let manager = TokenManager::with_cache(reqwest::Client::new(), true);
        let creds = credentials();
        let url = server.url();
        let (a, b, c) = tokio::join!(
            manager.acquire_token(&creds, &url),
            manager.acquire_token(&creds, &url),
            manager.acquire_token(&creds, &url),
        );

        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        m.assert_async().await;
    }

    #[tokio::test]
    async fn short_lived_tokens_are_not_reused() {
        let mut server = mockito::Server::new_async().await;
        let m = token_mock(&mut server, 30, 2).await;

        let manager = TokenManager::with_cache(reqwest::Client::new(), true);
        manager.acquire_token(&credentials(), &server.url()).await.unwrap();
        manager.acquire_token(&credentials(), &server.url()).await.unwrap();

        m.assert_async().await;
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let mut server = mockito::Server::new_async().await;
        let m = token_mock(&mut server, 32400, 2).await;

        let manager = TokenManager::with_cache(reqwest::Client::new(), true);
        manager.acquire_token(&credentials(), &server.url()).await.unwrap();
        manager.invalidate(&credentials(), &server.url()).await;
        manager.acquire_token(&credentials(), &server.url()).await.unwrap();

        m.assert_async().await;
    }

    #[tokio::test]
    async fn rejection_carries_upstream_description() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/v1/oauth2/token")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"invalid_client","error_description":"Client Authentication failed"}"#)
            .create_async()
            .await;

        let manager = TokenManager::new(reqwest::Client::new());
        let err = manager
            .acquire_token(&credentials(), &server.url())
            .await
            .unwrap_err();

        match err {
            PaymentError::Auth(desc) => assert_eq!(desc, "Client Authentication failed"),
            other => panic!("expected auth error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_access_token_is_an_auth_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/v1/oauth2/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"token_type":"Bearer"}"#)
            .create_async()
            .await;

        let manager = TokenManager::new(reqwest::Client::new());
        let err = manager
            .acquire_token(&credentials(), &server.url())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "auth");
    }

    #[test]
    fn debug_redacts_token() {
        let token = AccessToken::new("super-secret", Some(Duration::from_secs(10)));
        assert!(!format!("{token:?}").contains("super-secret"));
    }
}
