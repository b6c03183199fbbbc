use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use paybridge::PaymentError;
use std::fmt;

const AUTH_FAILED: &str = "Payment provider authentication failed";

/// HTTP face of [`PaymentError`]. Every failing route returns one of these,
/// so each error kind maps to exactly one status and body shape.
#[derive(Debug)]
pub struct ApiError(pub PaymentError);

impl From<PaymentError> for ApiError {
    fn from(e: PaymentError) -> Self {
        ApiError(e)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ApiError {
    /// Response body for this error. Auth descriptions stay in the logs.
    pub fn body(&self) -> serde_json::Value {
        match &self.0 {
            PaymentError::Validation(msg) => serde_json::json!({ "error": msg }),
            PaymentError::Upstream { error, details } => serde_json::json!({
                "error": error,
                "details": details
            }),
            PaymentError::Auth(_) => serde_json::json!({ "error": AUTH_FAILED }),
            PaymentError::Internal { error, message } => serde_json::json!({
                "error": error,
                "message": message
            }),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self.0 {
            PaymentError::Validation(_) | PaymentError::Upstream { .. } => StatusCode::BAD_REQUEST,
            PaymentError::Auth(_) | PaymentError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        match &self.0 {
            PaymentError::Auth(description) => {
                tracing::error!("Provider authentication failed: {}", description);
            }
            PaymentError::Internal { error, message } => {
                tracing::error!("{}: {}", error, message);
            }
            _ => {}
        }
        HttpResponse::build(self.status_code()).json(self.body())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn render(err: PaymentError) -> (StatusCode, serde_json::Value) {
        let resp = ApiError(err).error_response();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_rt::test]
    async fn validation_is_bad_request_with_message() {
        let (status, body) = render(PaymentError::validation("Order ID is required")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({ "error": "Order ID is required" }));
    }

    #[actix_rt::test]
    async fn upstream_carries_details() {
        let details = serde_json::json!({ "name": "UNPROCESSABLE_ENTITY" });
        let (status, body) =
            render(PaymentError::upstream("PayPal capture failed", details.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "PayPal capture failed");
        assert_eq!(body["details"], details);
    }

    #[actix_rt::test]
    async fn auth_hides_description() {
        let (status, body) = render(PaymentError::Auth("invalid_client: Client Authentication failed".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({ "error": AUTH_FAILED }));
    }

    #[actix_rt::test]
    async fn internal_has_error_and_message() {
        let (status, body) = render(PaymentError::internal("Verification failed", "timeout")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Verification failed");
        assert_eq!(body["message"], "timeout");
    }
}
