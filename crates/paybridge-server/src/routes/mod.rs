pub mod health;
pub mod paypal;
pub mod paystack;

use actix_web::web;

/// Request bodies above this size are refused before reaching a handler.
pub const MAX_BODY_BYTES: usize = 65_536;

pub fn payload_config() -> web::PayloadConfig {
    web::PayloadConfig::new(MAX_BODY_BYTES)
}

/// Mount every route of the payment API.
pub fn configure(cfg: &mut web::ServiceConfig) {
    health::configure(cfg);
    paystack::configure(cfg);
    paypal::configure(cfg);
}
