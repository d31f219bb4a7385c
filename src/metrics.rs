//! Prometheus metrics for the session token signer.

use once_cell::sync::Lazy;
use prometheus::{register_counter_vec, CounterVec};

/// Tokens signed, by operation (`encode` or `refresh`).
pub static TOKENS_ISSUED: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "session_token_issued_total",
        "Total number of session tokens signed",
        &["kind"]
    )
    .expect("Failed to register session_token_issued metric")
});

/// Decode attempts, by outcome.
pub static TOKENS_DECODED: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "session_token_decoded_total",
        "Total number of session tokens decoded",
        &["outcome"]
    )
    .expect("Failed to register session_token_decoded metric")
});

/// Signer starts, by key origin.
pub static SIGNER_STARTS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "session_token_signer_starts_total",
        "Total number of signer starts",
        &["origin"]
    )
    .expect("Failed to register session_token_signer_starts metric")
});

/// Record a signed token.
pub fn record_token_issued(kind: &str) {
    TOKENS_ISSUED.with_label_values(&[kind]).inc();
}

/// Record a decode outcome: `valid`, `expired`, `invalid_signature` or `malformed`.
pub fn record_token_decoded(outcome: &str) {
    TOKENS_DECODED.with_label_values(&[outcome]).inc();
}

/// Record a signer start.
pub fn record_signer_start(origin: &str) {
    SIGNER_STARTS.with_label_values(&[origin]).inc();
}
