//! Synchronous network transport backed by `ureq`.
//!
//! HTTP error statuses are not faults here: a 4xx/5xx body is handed to the
//! response handler like any other, and only failures to complete the
//! exchange become a `TransportFault`. Extension methods go through the
//! agent's generic `run` without a body.

use std::io::ErrorKind;

use ureq::http::Response;
use ureq::{Agent, Body, RequestBuilder};

use crate::error::TransportFault;
use crate::http::{HttpMethod, HttpRequest};
use crate::transport::{fault, FaultClass, Transport, TransportConfig};

#[derive(Clone)]
pub struct BlockingTransport {
    agent: Agent,
    user_agent: String,
}

impl BlockingTransport {
    pub fn new(config: TransportConfig) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(config.timeout)
            .build()
            .new_agent();
        Self {
            agent,
            user_agent: config.user_agent,
        }
    }

    fn prepare<B>(&self, builder: RequestBuilder<B>, request: &HttpRequest) -> RequestBuilder<B> {
        let mut builder = builder.header("user-agent", self.user_agent.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
    }

    fn send(
        &self,
        method: &HttpMethod,
        url: &str,
        request: &HttpRequest,
    ) -> Result<Response<Body>, ureq::Error> {
        let body = request.json_body();
        match method {
            HttpMethod::Get => self.prepare(self.agent.get(url), request).call(),
            HttpMethod::Head => self.prepare(self.agent.head(url), request).call(),
            HttpMethod::Options => self.prepare(self.agent.options(url), request).call(),
            HttpMethod::Delete => self.prepare(self.agent.delete(url), request).call(),
            HttpMethod::Post => self
                .prepare(self.agent.post(url), request)
                .content_type("application/json")
                .send(body.as_bytes()),
            HttpMethod::Put => self
                .prepare(self.agent.put(url), request)
                .content_type("application/json")
                .send(body.as_bytes()),
            HttpMethod::Patch => self
                .prepare(self.agent.patch(url), request)
                .content_type("application/json")
                .send(body.as_bytes()),
            HttpMethod::Other(verb) => {
                let mut builder = ureq::http::Request::builder()
                    .method(verb.as_str())
                    .uri(url)
                    .header("user-agent", self.user_agent.as_str());
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                self.agent.run(builder.body(())?)
            }
        }
    }
}

fn classify(err: &ureq::Error) -> FaultClass {
    match err {
        ureq::Error::Timeout(_) => FaultClass::Timeout,
        ureq::Error::HostNotFound | ureq::Error::ConnectionFailed => FaultClass::Connect,
        ureq::Error::Io(io) => match io.kind() {
            ErrorKind::TimedOut => FaultClass::Timeout,
            ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::NotConnected
            | ErrorKind::AddrNotAvailable => FaultClass::Connect,
            _ => FaultClass::Other,
        },
        _ => FaultClass::Other,
    }
}

impl std::fmt::Debug for BlockingTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingTransport")
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

impl Default for BlockingTransport {
    fn default() -> Self {
        Self::new(TransportConfig::default())
    }
}

impl Transport for BlockingTransport {
    fn name(&self) -> &'static str {
        "blocking"
    }

    fn exchange(&self, request: &HttpRequest) -> Result<String, TransportFault> {
        let method = request.http_method()?;
        let url = request.target(&method);
        tracing::debug!(exchange = %request.id, %method, %url, "blocking exchange");

        let mut response = self
            .send(&method, &url, request)
            .map_err(|e| fault(classify(&e), &url, &e))?;
        tracing::debug!(exchange = %request.id, status = response.status().as_u16(), "blocking exchange complete");
        response
            .body_mut()
            .read_to_string()
            .map_err(|e| fault(classify(&e), &url, &e))
    }
}
