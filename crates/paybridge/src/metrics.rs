use prometheus::{register_int_counter_vec, IntCounterVec};
use std::sync::LazyLock;

/// OAuth token acquisitions by outcome (`fetched`, `cached`, `failed`).
pub static TOKEN_REQUESTS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "paybridge_oauth_token_requests_total",
        "OAuth client-credentials token acquisitions",
        &["result"]
    )
    .unwrap()
});
