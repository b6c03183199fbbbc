//! Request bodies and their conversion into payment intents.
//!
//! Required-field checks run here, before any adapter is invoked, so a bad
//! request never reaches a provider.

use paybridge::intent::DEFAULT_CURRENCY;
use paybridge::paypal::{self, MISSING_ORDER_ID};
use paybridge::paystack;
use paybridge::{PaymentError, PaymentIntent, Provider};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

pub const MISSING_REFERENCE: &str = "Transaction reference is required";

/// Body of `POST /api/paystack/pay`.
#[derive(Debug, Default, Deserialize)]
pub struct PayRequest {
    #[serde(default)]
    pub email: Option<Value>,
    /// Minor units, forwarded to Paystack as received.
    #[serde(default)]
    pub amount: Option<Value>,
}

/// Body of `POST /api/paypal/create-order`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub currency: Option<Value>,
    #[serde(default)]
    pub return_url: Option<Value>,
    #[serde(default)]
    pub cancel_url: Option<Value>,
}

/// Body of `POST /api/paypal/capture-order`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureOrderRequest {
    #[serde(default)]
    pub order_id: Option<Value>,
}

/// Decode a request body. An empty body is the default request, so missing
/// fields are reported by the required-field checks; only a non-empty body
/// that is not a JSON object is rejected here.
pub fn parse_body<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, PaymentError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!("Rejected request body: {}", e);
        PaymentError::validation(format!("Invalid JSON body: {e}"))
    })
}

/// Present, non-empty string field. Anything else counts as missing.
fn text(value: Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        _ => None,
    }
}

pub fn pay_intent(req: PayRequest) -> Result<PaymentIntent, PaymentError> {
    let mut intent = PaymentIntent::new(Provider::DirectCharge);
    intent.identity = text(req.email);
    intent.amount = req.amount;
    paystack::require_initiate(&intent)?;
    Ok(intent)
}

pub fn order_intent(req: CreateOrderRequest) -> Result<PaymentIntent, PaymentError> {
    let mut intent = PaymentIntent::new(Provider::DelegatedOrder);
    intent.amount = req.amount;
    intent.currency = text(req.currency).unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
    intent.return_url = text(req.return_url);
    intent.cancel_url = text(req.cancel_url);
    paypal::require_create(&intent)?;
    Ok(intent)
}

pub fn capture_intent(req: CaptureOrderRequest) -> Result<PaymentIntent, PaymentError> {
    reference_intent(
        Provider::DelegatedOrder,
        text(req.order_id).as_deref().unwrap_or(""),
        MISSING_ORDER_ID,
    )
}

/// Intent naming an existing provider object. Blank references are rejected
/// with `message`.
pub fn reference_intent(
    provider: Provider,
    reference: &str,
    message: &str,
) -> Result<PaymentIntent, PaymentError> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(PaymentError::validation(message));
    }
    Ok(PaymentIntent::for_reference(provider, reference))
}

#[cfg(test)]
mod tests {
    use super::*;
    use paybridge::paypal::MISSING_ORDER_FIELDS;
    use paybridge::paystack::MISSING_FIELDS;
    use serde_json::json;

    fn parse<T: serde::de::DeserializeOwned>(body: Value) -> T {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn pay_requires_email_and_amount() {
        for body in [
            json!({}),
            json!({ "email": "a@b.com" }),
            json!({ "amount": 5000 }),
            json!({ "email": "", "amount": 5000 }),
            json!({ "email": "a@b.com", "amount": "" }),
            json!({ "email": "a@b.com", "amount": null }),
        ] {
            let err = pay_intent(parse(body)).unwrap_err();
            assert!(matches!(err, PaymentError::Validation(ref m) if m == MISSING_FIELDS));
        }
    }

    #[test]
    fn wrongly_typed_fields_count_as_missing() {
        let err = pay_intent(parse(json!({ "email": 42, "amount": 5000 }))).unwrap_err();
        assert!(matches!(err, PaymentError::Validation(ref m) if m == MISSING_FIELDS));

        let err = order_intent(parse(json!({
            "amount": "10.00",
            "returnUrl": 7,
            "cancelUrl": "https://y"
        })))
        .unwrap_err();
        assert!(matches!(err, PaymentError::Validation(ref m) if m == MISSING_ORDER_FIELDS));

        let err = capture_intent(parse(json!({ "orderId": 12 }))).unwrap_err();
        assert!(matches!(err, PaymentError::Validation(ref m) if m == MISSING_ORDER_ID));
    }

    #[test]
    fn empty_body_is_default_request() {
        let req: PayRequest = parse_body(b"").unwrap();
        assert!(req.email.is_none() && req.amount.is_none());
        let req: CaptureOrderRequest = parse_body(b" \n").unwrap();
        assert!(req.order_id.is_none());
    }

    #[test]
    fn non_json_body_is_rejected() {
        let err = parse_body::<PayRequest>(b"email=a@b.com&amount=5000").unwrap_err();
        assert!(matches!(err, PaymentError::Validation(ref m) if m.starts_with("Invalid JSON body")));
    }

    #[test]
    fn pay_keeps_amount_as_received() {
        let intent = pay_intent(parse(json!({ "email": "a@b.com", "amount": 5000 }))).unwrap();
        assert_eq!(intent.identity.as_deref(), Some("a@b.com"));
        assert_eq!(intent.amount, Some(json!(5000)));
        assert_eq!(intent.provider, Provider::DirectCharge);
    }

    #[test]
    fn order_defaults_currency() {
        let intent = order_intent(parse(json!({
            "amount": "10.00",
            "returnUrl": "https://x",
            "cancelUrl": "https://y"
        })))
        .unwrap();
        assert_eq!(intent.currency, "USD");
        assert_eq!(intent.return_url.as_deref(), Some("https://x"));

        let intent = order_intent(parse(json!({
            "amount": "10.00",
            "currency": "EUR",
            "returnUrl": "https://x",
            "cancelUrl": "https://y"
        })))
        .unwrap();
        assert_eq!(intent.currency, "EUR");
    }

    #[test]
    fn order_requires_amount_and_urls() {
        for body in [
            json!({ "returnUrl": "https://x", "cancelUrl": "https://y" }),
            json!({ "amount": "10.00", "cancelUrl": "https://y" }),
            json!({ "amount": "10.00", "returnUrl": "https://x" }),
            json!({ "amount": "10.00", "returnUrl": "", "cancelUrl": "https://y" }),
        ] {
            let err = order_intent(parse(body)).unwrap_err();
            assert!(matches!(err, PaymentError::Validation(ref m) if m == MISSING_ORDER_FIELDS));
        }
    }

    #[test]
    fn capture_requires_order_id() {
        for body in [json!({}), json!({ "orderId": "" }), json!({ "orderId": "   " })] {
            let err = capture_intent(parse(body)).unwrap_err();
            assert!(matches!(err, PaymentError::Validation(ref m) if m == MISSING_ORDER_ID));
        }
        let intent = capture_intent(parse(json!({ "orderId": "ORDER-1" }))).unwrap();
        assert_eq!(intent.external_reference(), Some("ORDER-1"));
    }
}
