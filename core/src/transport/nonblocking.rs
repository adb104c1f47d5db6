//! Asynchronous network transport backed by `reqwest`.
//!
//! `exchange_async` is the real entry point and must be polled inside a
//! tokio runtime. The blocking `exchange` drives the same request on a
//! private current-thread runtime with a client that keeps no idle
//! connections, since pooled connections die with the runtime that opened
//! them. Runtimes cannot be nested, so it reports a fault when called from
//! async code instead.

use futures::future::FutureExt;
use reqwest::Client;

use crate::error::TransportFault;
use crate::http::HttpRequest;
use crate::transport::{fault, Exchange, FaultClass, Transport, TransportConfig};

#[derive(Debug, Clone)]
pub struct NonBlockingTransport {
    client: Client,
    config: TransportConfig,
}

impl NonBlockingTransport {
    pub fn new(config: TransportConfig) -> Result<Self, TransportFault> {
        let client = build_client(&config, true)?;
        Ok(Self { client, config })
    }
}

impl Transport for NonBlockingTransport {
    fn name(&self) -> &'static str {
        "nonblocking"
    }

    fn exchange(&self, request: &HttpRequest) -> Result<String, TransportFault> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(TransportFault::new(
                "blocking exchange requested from inside an async runtime; use start",
            ));
        }
        let client = build_client(&self.config, false)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| TransportFault::new(format!("start runtime: {e}")))?;
        runtime.block_on(send(client, request.clone()))
    }

    fn exchange_async(&self, request: HttpRequest) -> Exchange {
        send(self.client.clone(), request).boxed()
    }
}

fn build_client(config: &TransportConfig, pooled: bool) -> Result<Client, TransportFault> {
    let mut builder = Client::builder().user_agent(config.user_agent.as_str());
    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    if !pooled {
        builder = builder.pool_max_idle_per_host(0);
    }
    builder
        .build()
        .map_err(|e| TransportFault::new(format!("build http client: {e}")))
}

async fn send(client: Client, request: HttpRequest) -> Result<String, TransportFault> {
    let method = request.http_method()?;
    let url = request.target(&method);
    tracing::debug!(exchange = %request.id, %method, %url, "async exchange");

    let verb = reqwest::Method::from_bytes(method.as_str().as_bytes())
        .map_err(|e| fault(FaultClass::Other, &url, &e))?;
    let mut builder = client.request(verb, url.as_str());
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if method.sends_body() {
        builder = builder.json(&request.payload);
    }

    let response = builder
        .send()
        .await
        .map_err(|e| fault(classify(&e), &url, &e))?;
    tracing::debug!(exchange = %request.id, status = response.status().as_u16(), "async exchange complete");
    response
        .text()
        .await
        .map_err(|e| fault(classify(&e), &url, &e))
}

fn classify(err: &reqwest::Error) -> FaultClass {
    if err.is_timeout() {
        FaultClass::Timeout
    } else if err.is_connect() {
        FaultClass::Connect
    } else {
        FaultClass::Other
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::http::Payload;

    fn request(method: &str) -> HttpRequest {
        request_to(method, "http://127.0.0.1:9/")
    }

    fn request_to(method: &str, resource: &str) -> HttpRequest {
        HttpRequest {
            id: Uuid::nil(),
            method: method.to_string(),
            resource: resource.to_string(),
            payload: Payload::new(),
            headers: Vec::new(),
        }
    }

    #[tokio::test]
    async fn blocking_entry_refuses_inside_runtime() {
        let transport = NonBlockingTransport::new(TransportConfig::default()).unwrap();
        let fault = transport.exchange(&request("GET")).unwrap_err();
        assert!(fault.description().contains("use start"));
    }

    #[tokio::test]
    async fn invalid_method_faults_before_sending() {
        let transport = NonBlockingTransport::new(TransportConfig::default()).unwrap();
        let fault = transport.exchange_async(request("BR EW")).await.unwrap_err();
        assert_eq!(fault.description(), "invalid method: BR EW");
    }

    #[tokio::test]
    async fn refused_connection_is_classified() {
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let url = format!("http://{addr}/");
        let transport = NonBlockingTransport::new(TransportConfig::default()).unwrap();
        let fault = transport.exchange_async(request_to("GET", &url)).await.unwrap_err();
        assert_eq!(fault.description(), format!("could not connect: {url}"));
    }
}
