//! The capability every payment provider adapter exposes.
//!
//! - [`ProviderAdapter::initiate`] starts a payment and binds the intent to
//!   the provider's reference
//! - [`ProviderAdapter::verify`] reads the provider's view of a payment
//! - [`ProviderAdapter::capture`] finalizes collection, where the provider
//!   has a separate capture step
//!
//! See [`crate::paystack::PaystackAdapter`] and [`crate::paypal::PayPalAdapter`].

use serde::Serialize;

use crate::error::PaymentError;
use crate::intent::{PaymentIntent, Provider};

pub trait ProviderAdapter: Send + Sync {
    /// Result of [`ProviderAdapter::initiate`], serialized to the caller.
    type Initiated: Serialize + Send;
    /// Result of [`ProviderAdapter::verify`].
    type Verified: Serialize + Send;
    /// Result of [`ProviderAdapter::capture`].
    type Captured: Serialize + Send;

    fn provider(&self) -> Provider;

    /// Start a payment. On success the intent carries the provider reference.
    fn initiate(
        &self,
        intent: &mut PaymentIntent,
    ) -> impl std::future::Future<Output = Result<Self::Initiated, PaymentError>> + Send;

    /// Read the current state of the payment named by the intent's reference.
    /// Must not change anything on the provider side.
    fn verify(
        &self,
        intent: &mut PaymentIntent,
    ) -> impl std::future::Future<Output = Result<Self::Verified, PaymentError>> + Send;

    /// Collect funds for an approved payment. Not idempotent: every call is
    /// forwarded to the provider.
    fn capture(
        &self,
        intent: &mut PaymentIntent,
    ) -> impl std::future::Future<Output = Result<Self::Captured, PaymentError>> + Send;
}

/// The intent's reference, or a validation error carrying `message`.
pub(crate) fn require_reference<'a>(
    intent: &'a PaymentIntent,
    message: &str,
) -> Result<&'a str, PaymentError> {
    intent
        .external_reference()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or_else(|| PaymentError::validation(message))
}
