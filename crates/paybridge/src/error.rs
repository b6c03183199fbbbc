use thiserror::Error;

/// Errors returned by provider adapters.
///
/// Every adapter failure ends up as exactly one of these variants; the HTTP
/// layer maps each variant to a single status code.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// A required request field is missing or malformed. Raised before any
    /// network call is made.
    #[error("{0}")]
    Validation(String),

    /// The provider answered but refused the operation.
    #[error("{error}")]
    Upstream {
        error: String,
        details: serde_json::Value,
    },

    /// Credentials are missing or the OAuth client-credentials exchange failed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Transport failure or a response that breaks the provider's contract.
    #[error("{error}: {message}")]
    Internal { error: String, message: String },
}

impl PaymentError {
    pub fn validation(msg: impl Into<String>) -> Self {
        PaymentError::Validation(msg.into())
    }

    pub fn upstream(error: impl Into<String>, details: serde_json::Value) -> Self {
        PaymentError::Upstream {
            error: error.into(),
            details,
        }
    }

    pub fn internal(error: impl Into<String>, message: impl Into<String>) -> Self {
        PaymentError::Internal {
            error: error.into(),
            message: message.into(),
        }
    }

    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            PaymentError::Validation(_) => "validation",
            PaymentError::Upstream { .. } => "upstream",
            PaymentError::Auth(_) => "auth",
            PaymentError::Internal { .. } => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_public_message() {
        let err = PaymentError::validation("Email and amount are required");
        assert_eq!(err.to_string(), "Email and amount are required");

        let err = PaymentError::upstream("PayPal capture failed", serde_json::json!({}));
        assert_eq!(err.to_string(), "PayPal capture failed");

        let err = PaymentError::internal("Verification failed", "connection refused");
        assert_eq!(err.to_string(), "Verification failed: connection refused");
    }

    #[test]
    fn kind_labels() {
        assert_eq!(PaymentError::Auth("x".into()).kind(), "auth");
        assert_eq!(PaymentError::validation("x").kind(), "validation");
    }
}
