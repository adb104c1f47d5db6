//! Network-free transport.
//!
//! # Design
//! The body of every exchange is the assembled resource: the resource with
//! the payload rendered as a query string, keys in insertion order. Nothing
//! can fail, and the transport vouches for whatever the response handler
//! builds, so callbacks and handlers can be exercised without a server.

use crate::error::TransportFault;
use crate::http::HttpRequest;
use crate::transport::Transport;

/// Network-free transport: the assembled resource string is the body.
///
/// Useful for exercising callbacks and response handlers without a server.
/// Every exchange succeeds and is vouched for.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoTransport;

impl Transport for EchoTransport {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn exchange(&self, request: &HttpRequest) -> Result<String, TransportFault> {
        Ok(request.assemble())
    }

    fn vouches(&self) -> bool {
        true
    }
}
