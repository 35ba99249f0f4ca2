//! Error types for transport operations.

use thiserror::Error;

/// Failures of the underlying link, reported by a [`super::Connector`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectorError {
    /// The host endpoint is gone or refused the connection.
    #[error("host unavailable: {0}")]
    Unavailable(String),

    /// The execution context serving the link was torn down mid-call.
    #[error("context invalidated")]
    ContextInvalidated,

    /// The link closed while a message was in flight.
    #[error("channel closed")]
    Closed,
}

/// Failures of one transport attempt, recovered by falling back to the
/// alternate path before anything is surfaced to the user.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The persistent channel dropped; pending requests were rejected.
    #[error("channel disconnected")]
    Disconnected,

    /// No matching response arrived within the correlation timeout.
    #[error("request timed out after {0}ms")]
    Timeout(u64),

    /// A send on an open channel failed.
    #[error("send failed: {0}")]
    Send(String),

    /// Neither connect nor one-shot could reach the host.
    #[error("transport unavailable: {0}")]
    Unavailable(String),
}
