//! Two-context transport layer.
//!
//! The caller and the analysis host share no memory; everything crosses a
//! message boundary. A persistent bidirectional channel carries normal
//! traffic, an independent one-shot request/response call is the fallback,
//! and both resolve to the same response shape so callers never care which
//! path served them.

pub mod channel;
pub mod client;
pub mod error;
pub mod protocol;
pub mod state;

pub use channel::{pair, Connector, HostEndpoint, Link, PairedConnector};
pub use client::{ExplainFailure, TransportClient};
pub use error::{ConnectorError, TransportError};
pub use protocol::{Envelope, ErrorCode, ExplainPayload, ResponseBody};
pub use state::ChannelState;
