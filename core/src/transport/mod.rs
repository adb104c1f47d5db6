//! Pluggable exchange strategies.
//!
//! # Design
//! A `Transport` turns an `HttpRequest` into a raw body or a
//! `TransportFault`. It offers a blocking entry point (used by `fetch`) and
//! a future-returning one (used by `start`); the default async entry point
//! runs the blocking one immediately and hands back an already-resolved
//! future, which is all a synchronous transport needs.
//!
//! Transports never build responses or touch callbacks. That stays in
//! `RequestManager`, so every transport gets the same dispatch rules.
//!
//! Network failures are sorted into a `FaultClass` before they become a
//! `TransportFault`, and the description is rendered from the class and the
//! target URL alone. Two transports built on different HTTP stacks therefore
//! describe a refused connection or a timeout with the same text; the
//! stack-specific cause chain goes to the log, and is kept in the
//! description only for failures that fit no class.

mod blocking;
mod echo;
mod nonblocking;

use std::error::Error;
use std::time::Duration;

use futures::future::{self, BoxFuture, FutureExt};
use serde::{Deserialize, Deserializer};

use crate::error::TransportFault;
use crate::http::HttpRequest;

pub use blocking::BlockingTransport;
pub use echo::EchoTransport;
pub use nonblocking::NonBlockingTransport;

pub type Exchange = BoxFuture<'static, Result<String, TransportFault>>;

pub trait Transport: Send + Sync {
    /// Short name used when displaying a manager, e.g. `echo`.
    fn name(&self) -> &'static str;

    /// Perform the exchange to completion on the calling thread.
    fn exchange(&self, request: &HttpRequest) -> Result<String, TransportFault>;

    /// Begin the exchange and resolve once it completes.
    fn exchange_async(&self, request: HttpRequest) -> Exchange {
        future::ready(self.exchange(&request)).boxed()
    }

    /// Whether a completed exchange counts as a success no matter what the
    /// response handler thinks of the body.
    fn vouches(&self) -> bool {
        false
    }
}

/// How a failed exchange is described to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FaultClass {
    /// No connection to the server could be established.
    Connect,
    /// The exchange ran past the configured timeout.
    Timeout,
    Other,
}

/// Build the fault for a failed exchange against `url`.
pub(crate) fn fault(class: FaultClass, url: &str, err: &(dyn Error + 'static)) -> TransportFault {
    let cause = cause_chain(err);
    tracing::debug!(%url, ?class, error = %cause, "exchange failed");
    match class {
        FaultClass::Connect => TransportFault::new(format!("could not connect: {url}")),
        FaultClass::Timeout => TransportFault::new(format!("timed out: {url}")),
        FaultClass::Other => TransportFault::new(format!("exchange failed: {url}: {cause}")),
    }
}

/// `err` followed by each of its sources, skipping any already spelled out
/// by the message before it.
fn cause_chain(err: &(dyn Error + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let message = cause.to_string();
        if !text.contains(&message) {
            text.push_str(": ");
            text.push_str(&message);
        }
        source = cause.source();
    }
    text
}

/// Settings shared by the network transports.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Whole-exchange timeout, read as whole seconds; `None` waits
    /// indefinitely.
    #[serde(deserialize_with = "seconds")]
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            user_agent: concat!("rest-manager/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

fn seconds<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
    Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fmt;

    #[derive(Debug)]
    struct Layer {
        message: &'static str,
        source: Option<Box<Layer>>,
    }

    impl fmt::Display for Layer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.message)
        }
    }

    impl Error for Layer {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            self.source.as_deref().map(|s| s as &(dyn Error + 'static))
        }
    }

    fn layered(messages: &[&'static str]) -> Layer {
        let mut messages = messages.iter().copied().rev();
        let mut err = Layer {
            message: messages.next().unwrap(),
            source: None,
        };
        for message in messages {
            err = Layer {
                message,
                source: Some(Box::new(err)),
            };
        }
        err
    }

    #[test]
    fn default_config() {
        let config = TransportConfig::default();
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert!(config.user_agent.starts_with("rest-manager/"));
    }

    #[test]
    fn config_fills_missing_fields_from_defaults() {
        let config: TransportConfig = serde_json::from_str(r#"{"timeout": 5}"#).unwrap();
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.user_agent, TransportConfig::default().user_agent);

        let config: TransportConfig = serde_json::from_str(r#"{"timeout": null}"#).unwrap();
        assert_eq!(config.timeout, None);

        let config: TransportConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, TransportConfig::default());
    }

    #[test]
    fn classified_faults_name_only_the_url() {
        let err = layered(&["error sending request", "tcp connect error", "Connection refused"]);
        let url = "http://127.0.0.1:9/?q=f1";

        let connect = fault(FaultClass::Connect, url, &err);
        assert_eq!(connect.description(), "could not connect: http://127.0.0.1:9/?q=f1");

        let timeout = fault(FaultClass::Timeout, url, &err);
        assert_eq!(timeout.description(), "timed out: http://127.0.0.1:9/?q=f1");
    }

    #[test]
    fn unclassified_faults_carry_the_cause_chain() {
        let err = layered(&["error sending request", "tcp connect error", "Connection refused"]);
        let other = fault(FaultClass::Other, "http://x/", &err);
        assert_eq!(
            other.description(),
            "exchange failed: http://x/: error sending request: tcp connect error: Connection refused"
        );
    }

    #[test]
    fn cause_chain_skips_repeated_messages() {
        let err = layered(&["io: Connection refused", "Connection refused"]);
        assert_eq!(cause_chain(&err), "io: Connection refused");
    }
}
