//! Error types for the request manager.
//!
//! # Design
//! Only configuration and callback failures ever reach the caller as `Err`.
//! Transport faults and unusable responses are folded into a not-okay
//! `Response` and dispatched through the `"error"` callbacks instead, so they
//! get their own types here but never appear inside `ManagerError`.

use thiserror::Error;

/// Failure raised by a registered callback or sequence accumulator.
pub type CallbackFault = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by `RequestManager` operations.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// An exchange was requested with no resource configured.
    #[error("must have resource defined")]
    Configuration,

    /// A handler was registered under a kind the registry does not declare.
    #[error("unknown event kind: {0}")]
    UnknownEventKind(String),

    /// A handler failed during dispatch; remaining handlers were skipped.
    #[error("callback failed: {0}")]
    Callback(#[source] CallbackFault),
}

/// The exchange itself could not complete (connection refused, DNS, ...).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{description}")]
pub struct TransportFault {
    description: String,
}

impl TransportFault {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// The exchange completed but the response handler could not vouch for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MalformedResponse {
    /// The handler could not build anything from the raw body.
    #[error("null response")]
    Null,

    /// The handler built a response that reports itself not okay.
    #[error("bad response")]
    Rejected,
}
