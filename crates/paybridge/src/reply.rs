//! Decoding of provider HTTP replies into a closed success/rejection variant.
//!
//! Every adapter funnels its responses through [`read_reply`], so contract
//! drift in a provider's success payload surfaces as one
//! [`PaymentError::Internal`] instead of a malformed pass-through.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::PaymentError;

/// Outcome of a provider call that reached the provider.
#[derive(Debug)]
pub enum UpstreamReply<T> {
    /// 2xx reply whose body matched the expected shape.
    Accepted(T),
    /// Non-2xx reply; `details` is the raw body.
    Rejected { status: u16, details: Value },
}

impl UpstreamReply<Value> {
    /// Validate an accepted body against its typed shape. Rejections pass
    /// through untouched.
    pub fn typed<T: DeserializeOwned>(self, context: &str) -> Result<UpstreamReply<T>, PaymentError> {
        match self {
            UpstreamReply::Accepted(body) => serde_json::from_value(body)
                .map(UpstreamReply::Accepted)
                .map_err(|e| {
                    PaymentError::internal(context, format!("unexpected response shape: {e}"))
                }),
            UpstreamReply::Rejected { status, details } => {
                Ok(UpstreamReply::Rejected { status, details })
            }
        }
    }
}

/// Read the body of a provider reply. A 2xx body must be JSON; a non-2xx
/// body is kept as JSON when possible, otherwise wrapped as `{"message": ..}`.
pub async fn read_reply(
    resp: reqwest::Response,
    context: &str,
) -> Result<UpstreamReply<Value>, PaymentError> {
    let status = resp.status();
    let text = resp
        .text()
        .await
        .map_err(|e| PaymentError::internal(context, format!("failed to read response: {e}")))?;

    if status.is_success() {
        let body = serde_json::from_str(&text).map_err(|e| {
            PaymentError::internal(context, format!("response is not valid JSON: {e}"))
        })?;
        Ok(UpstreamReply::Accepted(body))
    } else {
        let details = serde_json::from_str(&text)
            .unwrap_or_else(|_| serde_json::json!({ "message": text }));
        Ok(UpstreamReply::Rejected {
            status: status.as_u16(),
            details,
        })
    }
}

/// Read and validate a reply in one step.
pub async fn decode<T: DeserializeOwned>(
    resp: reqwest::Response,
    context: &str,
) -> Result<UpstreamReply<T>, PaymentError> {
    read_reply(resp, context).await?.typed(context)
}

pub(crate) fn transport_error(context: &str, e: reqwest::Error) -> PaymentError {
    PaymentError::internal(context, format!("request failed: {e}"))
}
