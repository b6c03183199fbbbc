//! Request-scoped payment intent and its forward-only status machine.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::PaymentError;

pub const DEFAULT_CURRENCY: &str = "USD";

/// Which provider a payment intent is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provider {
    /// Single-step initialize/verify provider (Paystack).
    #[serde(rename = "paystack")]
    DirectCharge,
    /// OAuth-authenticated create-order/capture provider (PayPal).
    #[serde(rename = "paypal")]
    DelegatedOrder,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::DirectCharge => "paystack",
            Provider::DelegatedOrder => "paypal",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Approved,
    Captured,
    Succeeded,
    Failed,
}

impl PaymentStatus {
    fn rank(self) -> u8 {
        match self {
            PaymentStatus::Pending => 0,
            PaymentStatus::Approved => 1,
            PaymentStatus::Captured | PaymentStatus::Succeeded | PaymentStatus::Failed => 2,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.rank() == 2
    }

    /// Interpret a PayPal order status. Unknown values stay pending.
    pub fn from_order_status(status: &str) -> Self {
        match status {
            "COMPLETED" => PaymentStatus::Captured,
            "APPROVED" => PaymentStatus::Approved,
            "VOIDED" | "DECLINED" | "FAILED" => PaymentStatus::Failed,
            _ => PaymentStatus::Pending,
        }
    }

    /// Interpret a Paystack transaction status: only `success` succeeds.
    pub fn from_transaction_status(status: &str) -> Self {
        if status == "success" {
            PaymentStatus::Succeeded
        } else {
            PaymentStatus::Failed
        }
    }
}

/// A single payment attempt, built per request and dropped afterwards.
#[derive(Debug, Clone)]
pub struct PaymentIntent {
    pub provider: Provider,
    /// Minor units for Paystack (forwarded as received), decimal string or
    /// number for PayPal.
    pub amount: Option<serde_json::Value>,
    pub currency: String,
    /// Payer email (Paystack only)
    pub identity: Option<String>,
    pub return_url: Option<String>,
    pub cancel_url: Option<String>,
    external_reference: Option<String>,
    status: PaymentStatus,
}

impl PaymentIntent {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            amount: None,
            currency: DEFAULT_CURRENCY.to_string(),
            identity: None,
            return_url: None,
            cancel_url: None,
            external_reference: None,
            status: PaymentStatus::Pending,
        }
    }

    /// Intent for an existing provider object, used by verify and capture.
    pub fn for_reference(provider: Provider, reference: impl Into<String>) -> Self {
        let mut intent = Self::new(provider);
        intent.external_reference = Some(reference.into());
        intent
    }

    pub fn external_reference(&self) -> Option<&str> {
        self.external_reference.as_deref()
    }

    pub fn status(&self) -> PaymentStatus {
        self.status
    }

    /// Record the provider-assigned reference. Allowed once per intent.
    pub fn assign_reference(&mut self, reference: impl Into<String>) -> Result<(), PaymentError> {
        if let Some(existing) = &self.external_reference {
            return Err(PaymentError::internal(
                "Payment reference already assigned",
                format!("{} intent already bound to {existing}", self.provider),
            ));
        }
        self.external_reference = Some(reference.into());
        Ok(())
    }

    /// Move the status forward. Re-observing the current status is a no-op;
    /// moving backwards or out of a terminal state is refused.
    pub fn advance(&mut self, next: PaymentStatus) -> Result<(), PaymentError> {
        if next == self.status {
            return Ok(());
        }
        if self.status.is_terminal() || next.rank() < self.status.rank() {
            return Err(PaymentError::internal(
                "Invalid payment status transition",
                format!("{:?} -> {:?}", self.status, next),
            ));
        }
        self.status = next;
        Ok(())
    }
}

/// JavaScript-style truthiness for loosely typed JSON request fields:
/// `null`, `false`, `0`, `""` and absent all count as missing.
pub fn is_present(value: Option<&serde_json::Value>) -> bool {
    use serde_json::Value;
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Render a JSON amount as the decimal text PayPal expects.
pub fn amount_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
