//! Dispatch of intents to provider adapters.
//!
//! Every provider call from the HTTP layer goes through here so latency,
//! outcome counters and failure logs are recorded the same way for both
//! providers.

use paybridge::{PaymentError, PaymentIntent, Provider, ProviderAdapter};
use std::future::Future;
use std::time::Instant;

use crate::error::ApiError;
use crate::metrics::{PAYMENT_LATENCY, PAYMENT_REQUESTS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Initiate,
    Verify,
    Capture,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Initiate => "initiate",
            Operation::Verify => "verify",
            Operation::Capture => "capture",
        }
    }
}

pub async fn initiate<A: ProviderAdapter>(
    adapter: &A,
    intent: &mut PaymentIntent,
) -> Result<A::Initiated, ApiError> {
    observe(adapter.provider(), Operation::Initiate, adapter.initiate(intent)).await
}

pub async fn verify<A: ProviderAdapter>(
    adapter: &A,
    intent: &mut PaymentIntent,
) -> Result<A::Verified, ApiError> {
    observe(adapter.provider(), Operation::Verify, adapter.verify(intent)).await
}

pub async fn capture<A: ProviderAdapter>(
    adapter: &A,
    intent: &mut PaymentIntent,
) -> Result<A::Captured, ApiError> {
    observe(adapter.provider(), Operation::Capture, adapter.capture(intent)).await
}

/// Count a request rejected before it reached an adapter.
pub fn rejected(provider: Provider, operation: Operation, err: PaymentError) -> ApiError {
    PAYMENT_REQUESTS
        .with_label_values(&[provider.as_str(), operation.as_str(), err.kind()])
        .inc();
    ApiError(err)
}

async fn observe<T, F>(provider: Provider, operation: Operation, call: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, PaymentError>>,
{
    let start = Instant::now();
    let result = call.await;
    PAYMENT_LATENCY
        .with_label_values(&[provider.as_str(), operation.as_str()])
        .observe(start.elapsed().as_secs_f64());

    match result {
        Ok(value) => {
            PAYMENT_REQUESTS
                .with_label_values(&[provider.as_str(), operation.as_str(), "ok"])
                .inc();
            Ok(value)
        }
        Err(err) => {
            tracing::warn!(
                provider = provider.as_str(),
                operation = operation.as_str(),
                kind = err.kind(),
                "Payment operation failed: {}",
                err
            );
            Err(rejected(provider, operation, err))
        }
    }
}
