//! The request manager: config, transport and callbacks in one handle.
//!
//! # Design
//! `RequestManager<R, T>` is parameterized by the response handler `R` and
//! the transport strategy `T`. Every exchange goes through the same three
//! steps regardless of transport:
//!
//! 1. merge the call's arguments into the stored config and snapshot it
//!    into an `HttpRequest` (fails with `ManagerError::Configuration` when
//!    no resource is set);
//! 2. run the exchange, blocking (`fetch`) or as a future (`start`);
//! 3. build exactly one response from the outcome and dispatch it to
//!    either the `"success"` or the `"error"` handlers.
//!
//! Config lives behind a mutex so a handler, or a sequence step, can adjust
//! it through a shared `&RequestManager`. The lock is only held while
//! reading or writing config, never across an exchange or a dispatch.
//! Overlapping exchanges on one manager are not supported; use one manager
//! per in-flight request.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::future::{self, BoxFuture, FutureExt};
use uuid::Uuid;

use crate::error::{CallbackFault, MalformedResponse, ManagerError, TransportFault};
use crate::http::{self, HttpRequest, Payload};
use crate::registry::CallbackRegistry;
use crate::response::Response;
use crate::transport::Transport;

pub const DEFAULT_METHOD: &str = "GET";

/// Callback signature: the finished response and the manager that made it.
pub type Handler<R, T> =
    dyn Fn(&R, &RequestManager<R, T>) -> Result<(), CallbackFault> + Send + Sync;

/// Resolves to the dispatched response, or rejects with a configuration or
/// callback failure.
pub type ResponseFuture<'a, R> = BoxFuture<'a, Result<R, ManagerError>>;

/// The two kinds of event a manager dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Success,
    Error,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Success => "success",
            EventKind::Error => "error",
        }
    }
}

impl AsRef<str> for EventKind {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// What an exchange is aimed at. Owned by one manager.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestConfig {
    pub resource: Option<String>,
    pub payload: Payload,
    pub method: String,
    pub headers: Vec<(String, String)>,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            resource: None,
            payload: Payload::new(),
            method: DEFAULT_METHOD.to_string(),
            headers: Vec::new(),
        }
    }
}

impl RequestConfig {
    /// Overwrite each field the caller provided; leave the rest alone.
    fn merge(&mut self, args: RequestArgs) {
        if let Some(resource) = args.resource {
            self.resource = Some(resource);
        }
        if let Some(payload) = args.payload {
            self.payload = payload;
        }
        if let Some(method) = args.method {
            self.method = method;
        }
    }
}

/// Per-call overrides for `fetch` and `start`.
///
/// A field left as `None` keeps the manager's current value. A field set to
/// an empty value still overwrites it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestArgs {
    pub resource: Option<String>,
    pub payload: Option<Payload>,
    pub method: Option<String>,
}

impl RequestArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }
}

impl From<&str> for RequestArgs {
    fn from(resource: &str) -> Self {
        Self::new().resource(resource)
    }
}

impl From<String> for RequestArgs {
    fn from(resource: String) -> Self {
        Self::new().resource(resource)
    }
}

pub struct RequestManager<R: Response, T: Transport> {
    config: Mutex<RequestConfig>,
    registry: CallbackRegistry<Handler<R, T>>,
    transport: T,
}

impl<R: Response, T: Transport> RequestManager<R, T> {
    pub fn new(transport: T) -> Self {
        Self {
            config: Mutex::new(RequestConfig::default()),
            registry: CallbackRegistry::new(&[
                EventKind::Success.as_str(),
                EventKind::Error.as_str(),
            ]),
            transport,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Add a handler for `kind` (`"success"` or `"error"`).
    pub fn register<F>(&mut self, kind: impl AsRef<str>, handler: F) -> Result<(), ManagerError>
    where
        F: Fn(&R, &Self) -> Result<(), CallbackFault> + Send + Sync + 'static,
    {
        self.registry.register(kind.as_ref(), Box::new(handler))
    }

    // --- config accessors ---

    pub fn resource(&self) -> Option<String> {
        self.config().resource.clone()
    }

    pub fn set_resource(&self, resource: impl Into<String>) {
        self.config().resource = Some(resource.into());
    }

    /// A copy of the stored payload; changing it does not affect the manager.
    pub fn payload(&self) -> Payload {
        self.config().payload.clone()
    }

    pub fn set_payload(&self, payload: Payload) {
        self.config().payload = payload;
    }

    pub fn method(&self) -> String {
        self.config().method.clone()
    }

    pub fn set_method(&self, method: impl Into<String>) {
        self.config().method = method.into();
    }

    pub fn headers(&self) -> Vec<(String, String)> {
        self.config().headers.clone()
    }

    /// Set a header sent with every exchange, replacing any of the same
    /// name (compared case-insensitively).
    pub fn set_header(&self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let mut config = self.config();
        config.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        config.headers.push((name, value.into()));
    }

    /// The resource with the payload rendered as a query string.
    pub fn assemble(&self) -> Option<String> {
        let config = self.config();
        config
            .resource
            .as_deref()
            .map(|resource| http::assemble(resource, &config.payload))
    }

    // --- execution ---

    /// Run one exchange to completion, dispatch its response, and return it.
    pub fn fetch(&self, args: RequestArgs) -> Result<R, ManagerError> {
        let request = self.prepare(args)?;
        let outcome = self.transport.exchange(&request);
        let response = self.settle(request.id, outcome);
        self.dispatch(&response)?;
        Ok(response)
    }

    /// `fetch` with the stored config as is.
    pub fn action(&self) -> Result<R, ManagerError> {
        self.fetch(RequestArgs::default())
    }

    /// Begin one exchange. The returned future dispatches the response to
    /// the registered handlers and then resolves with it.
    ///
    /// Arguments are merged and validated before this returns; a missing
    /// resource yields an already-rejected future.
    pub fn start(&self, args: RequestArgs) -> ResponseFuture<'_, R> {
        let request = match self.prepare(args) {
            Ok(request) => request,
            Err(e) => return future::ready(Err(e)).boxed(),
        };
        let id = request.id;
        let exchange = self.transport.exchange_async(request);
        async move {
            let outcome = exchange.await;
            let response = self.settle(id, outcome);
            self.dispatch(&response)?;
            Ok(response)
        }
        .boxed()
    }

    fn config(&self) -> MutexGuard<'_, RequestConfig> {
        self.config.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn prepare(&self, args: RequestArgs) -> Result<HttpRequest, ManagerError> {
        let mut config = self.config();
        config.merge(args);
        let resource = match config.resource.as_deref() {
            Some(resource) if !resource.is_empty() => resource.to_string(),
            _ => return Err(ManagerError::Configuration),
        };
        let request = HttpRequest {
            id: Uuid::new_v4(),
            method: config.method.clone(),
            resource,
            payload: config.payload.clone(),
            headers: config.headers.clone(),
        };
        tracing::debug!(
            exchange = %request.id,
            transport = self.transport.name(),
            method = %request.method,
            resource = %request.resource,
            "arguments ensured"
        );
        Ok(request)
    }

    /// Build the single response for an exchange outcome.
    fn settle(&self, id: Uuid, outcome: Result<String, TransportFault>) -> R {
        let raw = match outcome {
            Ok(raw) => raw,
            Err(fault) => {
                tracing::warn!(exchange = %id, error = %fault, "exchange failed");
                return failure(fault.description());
            }
        };
        let Some(mut response) = R::parse(&raw) else {
            tracing::warn!(exchange = %id, "response handler produced nothing");
            return failure(&MalformedResponse::Null.to_string());
        };
        if self.transport.vouches() {
            response.set_okay(true);
            response.set_message("empty");
            response.set_message_type("success");
        } else if !response.okay() {
            if response.message_type().is_none() {
                response.set_message_type("error");
            }
            if response.message().is_none() {
                response.set_message(MalformedResponse::Rejected.to_string());
            }
        }
        response
    }

    fn dispatch(&self, response: &R) -> Result<(), ManagerError> {
        let kind = if response.okay() {
            EventKind::Success
        } else {
            EventKind::Error
        };
        tracing::debug!(kind = kind.as_str(), "dispatching callbacks");
        self.registry
            .apply(kind.as_str(), |handler| handler(response, self))
            .map_err(ManagerError::Callback)
    }
}

fn failure<R: Response>(message: &str) -> R {
    let mut response = R::null();
    response.set_okay(false);
    response.set_message_type("error");
    response.set_message(message);
    response
}

impl<R: Response, T: Transport> fmt::Display for RequestManager<R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[rest-manager.{}]", self.transport.name())
    }
}

impl<R: Response, T: Transport> fmt::Debug for RequestManager<R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestManager")
            .field("transport", &self.transport.name())
            .field("config", &*self.config())
            .field("registry", &self.registry)
            .finish()
    }
}
