//! Payment orchestration across two checkout providers.
//!
//! Paystack (direct charge) and PayPal (delegated order) are exposed through
//! one capability, [`ProviderAdapter`], and one error taxonomy,
//! [`PaymentError`].
//!
//! - **Paystack** ([`PaystackAdapter`]): initialize a transaction, the payer
//!   completes checkout on Paystack, then verify by reference
//! - **PayPal** ([`PayPalAdapter`]): create an order, the payer approves it
//!   via the `approve` link, then capture; orders can be read back at any time
//!
//! PayPal calls are authenticated with client-credentials tokens obtained by
//! [`TokenManager`].

// Core types
pub mod credentials;
pub mod error;
pub mod intent;
pub mod provider;
pub mod reply;

// Providers
pub mod paypal;
pub mod paystack;
pub mod token;

pub mod metrics;

// Re-exports
pub use credentials::{CredentialStore, PayPalCredentials, PaystackCredentials};
pub use error::PaymentError;
pub use intent::{PaymentIntent, PaymentStatus, Provider};
pub use paypal::PayPalAdapter;
pub use paystack::PaystackAdapter;
pub use provider::ProviderAdapter;
pub use token::{AccessToken, TokenManager};
