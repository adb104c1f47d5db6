//! REST request manager with pluggable transports and callback dispatch.
//!
//! # Overview
//! A `RequestManager` holds what to request (resource, payload, method), a
//! `Transport` that knows how to perform the exchange, and a registry of
//! `"success"` / `"error"` callbacks. `fetch` runs an exchange to completion;
//! `start` returns a future. Either way exactly one response is built and
//! exactly one kind of callback is dispatched per call.
//!
//! # Design
//! - Transports are strategies, not subclasses: `EchoTransport` (no
//!   network), `BlockingTransport` (ureq) and `NonBlockingTransport`
//!   (reqwest) all plug into the same manager.
//! - Response handlers are a type parameter implementing `Response`; the
//!   manager never looks at the raw body itself.
//! - Only configuration and callback failures surface as `Err`. Transport
//!   faults and unusable bodies become not-okay responses.

pub mod error;
pub mod http;
pub mod manager;
pub mod registry;
pub mod response;
mod sequence;
pub mod transport;

pub use error::{CallbackFault, MalformedResponse, ManagerError, TransportFault};
pub use http::{HttpMethod, HttpRequest, Payload};
pub use manager::{EventKind, RequestArgs, RequestConfig, RequestManager, ResponseFuture};
pub use registry::CallbackRegistry;
pub use response::{JsonResponse, Response, Status, TextResponse};
pub use transport::{
    BlockingTransport, EchoTransport, NonBlockingTransport, Transport, TransportConfig,
};
