//! Direct-charge adapter for Paystack: initialize a transaction, let the payer
//! finish checkout on Paystack's page, then verify by reference.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::sync::Arc;

use crate::credentials::{endpoint, CredentialStore, PaystackCredentials};
use crate::error::PaymentError;
use crate::intent::{is_present, PaymentIntent, PaymentStatus, Provider};
use crate::provider::{require_reference, ProviderAdapter};
use crate::reply::{read_reply, transport_error, UpstreamReply};

pub const MISSING_FIELDS: &str = "Email and amount are required";
const INITIALIZE_FAILED: &str = "Paystack initialization failed";
const INITIALIZE_ERROR: &str = "Failed to initialize payment";
const VERIFY_FAILED: &str = "Verification failed";

#[derive(Debug, Deserialize)]
struct Envelope<D> {
    status: bool,
    #[serde(default)]
    message: Option<String>,
    data: Option<D>,
}

#[derive(Debug, Deserialize)]
struct InitializeData {
    authorization_url: String,
    reference: String,
}

#[derive(Debug, Deserialize)]
struct VerifyData {
    status: String,
}

/// A freshly initialized transaction. Serializes as the provider payload,
/// unchanged.
#[derive(Debug, Clone)]
pub struct InitializedTransaction {
    pub reference: String,
    pub authorization_url: String,
    pub payload: Value,
}

impl Serialize for InitializedTransaction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.payload.serialize(serializer)
    }
}

/// Outcome of a verification: `success` or `failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionVerification {
    pub status: String,
    pub reference: String,
}

/// Paystack has no separate capture step.
#[derive(Debug, Clone, Serialize)]
pub enum NoCapture {}

#[derive(Debug, Clone)]
pub struct PaystackAdapter {
    http: reqwest::Client,
    credentials: Arc<CredentialStore>,
}

impl PaystackAdapter {
    pub fn new(http: reqwest::Client, credentials: Arc<CredentialStore>) -> Self {
        Self { http, credentials }
    }

    fn secret(&self) -> Result<&PaystackCredentials, PaymentError> {
        self.credentials
            .paystack
            .as_ref()
            .ok_or_else(|| PaymentError::Auth("Paystack secret key is not configured".into()))
    }

    fn url(&self, path: &str) -> String {
        endpoint(&self.credentials.paystack_base_url, path)
    }
}

/// Email and amount, both present and non-empty.
pub fn require_initiate(intent: &PaymentIntent) -> Result<(&str, &Value), PaymentError> {
    let email = intent.identity.as_deref().filter(|e| !e.is_empty());
    match (email, intent.amount.as_ref()) {
        (Some(email), Some(amount)) if is_present(Some(amount)) => Ok((email, amount)),
        _ => Err(PaymentError::validation(MISSING_FIELDS)),
    }
}

impl ProviderAdapter for PaystackAdapter {
    type Initiated = InitializedTransaction;
    type Verified = TransactionVerification;
    type Captured = NoCapture;

    fn provider(&self) -> Provider {
        Provider::DirectCharge
    }

    async fn initiate(
        &self,
        intent: &mut PaymentIntent,
    ) -> Result<InitializedTransaction, PaymentError> {
        let (email, amount) = require_initiate(intent)?;
        let secret = self.secret()?;

        let resp = self
            .http
            .post(self.url("/transaction/initialize"))
            .bearer_auth(&secret.secret_key)
            .json(&serde_json::json!({ "email": email, "amount": amount }))
            .send()
            .await
            .map_err(|e| transport_error(INITIALIZE_ERROR, e))?;

        let payload = match read_reply(resp, INITIALIZE_ERROR).await? {
            UpstreamReply::Accepted(payload) => payload,
            UpstreamReply::Rejected { status, details } => {
                tracing::warn!(status, details = %details, "Paystack rejected initialization");
                return Err(PaymentError::upstream(INITIALIZE_FAILED, details));
            }
        };

        let envelope: Envelope<InitializeData> = serde_json::from_value(payload.clone())
            .map_err(|e| {
                PaymentError::internal(INITIALIZE_ERROR, format!("unexpected response shape: {e}"))
            })?;
        if !envelope.status {
            tracing::warn!(
                message = envelope.message.as_deref().unwrap_or("unknown"),
                "Paystack initialization returned status=false"
            );
            return Err(PaymentError::upstream(INITIALIZE_FAILED, payload));
        }
        let data = envelope.data.ok_or_else(|| {
            PaymentError::internal(INITIALIZE_ERROR, "response did not include transaction data")
        })?;

        intent.assign_reference(data.reference.clone())?;
        intent.advance(PaymentStatus::Pending)?;
        tracing::info!(reference = %data.reference, "Paystack transaction initialized");

        Ok(InitializedTransaction {
            reference: data.reference,
            authorization_url: data.authorization_url,
            payload,
        })
    }

    async fn verify(
        &self,
        intent: &mut PaymentIntent,
    ) -> Result<TransactionVerification, PaymentError> {
        let reference = require_reference(intent, "Transaction reference is required")?.to_string();
        let secret = self.secret()?;

        let url = self.url(&format!(
            "/transaction/verify/{}",
            urlencoding::encode(&reference)
        ));
        let resp = self
            .http
            .get(url)
            .bearer_auth(&secret.secret_key)
            .send()
            .await
            .map_err(|e| transport_error(VERIFY_FAILED, e))?;

        let payload = match read_reply(resp, VERIFY_FAILED).await? {
            UpstreamReply::Accepted(payload) => payload,
            UpstreamReply::Rejected { status, details } => {
                tracing::warn!(status, reference = %reference, details = %details, "Paystack verification rejected");
                return Err(PaymentError::internal(
                    VERIFY_FAILED,
                    format!("Paystack returned HTTP {status}"),
                ));
            }
        };

        let envelope: Envelope<VerifyData> = serde_json::from_value(payload).map_err(|e| {
            PaymentError::internal(VERIFY_FAILED, format!("unexpected response shape: {e}"))
        })?;
        let upstream_status = envelope.data.map(|d| d.status).unwrap_or_default();
        let status = PaymentStatus::from_transaction_status(&upstream_status);
        intent.advance(status)?;

        tracing::info!(reference = %reference, upstream_status = %upstream_status, ?status, "Paystack transaction verified");

        Ok(TransactionVerification {
            status: match status {
                PaymentStatus::Succeeded => "success".to_string(),
                _ => "failed".to_string(),
            },
            reference,
        })
    }

    async fn capture(&self, _intent: &mut PaymentIntent) -> Result<NoCapture, PaymentError> {
        Err(PaymentError::validation(
            "Paystack transactions are completed at checkout and cannot be captured",
        ))
    }
}
