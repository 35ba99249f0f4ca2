//! Error types for provider operations.

use thiserror::Error;

/// Errors that can occur while invoking an explanation provider.
///
/// Every variant is recoverable at the orchestrator level: a failing
/// provider is logged and the chain advances to the next candidate.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Network connectivity error (DNS, connection refused, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded deadline.
    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    /// Provider returned an error response (4xx, 5xx).
    #[error("Provider error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Provider response doesn't match the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Provider is not currently usable (no credential, runtime absent).
    #[error("Provider unavailable: {0}")]
    Unavailable(&'static str),

    /// Provider configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}
