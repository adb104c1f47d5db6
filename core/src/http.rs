//! Exchange descriptions handed to a transport.
//!
//! # Design
//! An `HttpRequest` is plain owned data: the manager snapshots its config
//! into one per exchange and gives it to the transport, which is free to
//! move it into a future. The method stays a string (as configured by the
//! caller) and is only interpreted by network transports via `HttpMethod`.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use url::form_urlencoded;
use uuid::Uuid;

use crate::error::TransportFault;

/// Arguments delivered to a resource, keyed by name.
pub type Payload = serde_json::Map<String, Value>;

/// HTTP methods the network transports know how to issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Head,
    Options,
    Delete,
    Post,
    Put,
    Patch,
    /// An extension method such as `PURGE`, sent exactly as written.
    Other(String),
}

impl HttpMethod {
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Other(name) => name,
        }
    }

    /// Whether the payload travels as a JSON body rather than a query string.
    pub fn sends_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl FromStr for HttpMethod {
    type Err = TransportFault;

    /// Standard methods are matched case-insensitively, so `"get"` and
    /// `"GET"` are the same method. Anything else that is a valid HTTP token
    /// becomes `Other` with its case preserved.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let method = match s.to_ascii_uppercase().as_str() {
            "GET" => HttpMethod::Get,
            "HEAD" => HttpMethod::Head,
            "OPTIONS" => HttpMethod::Options,
            "DELETE" => HttpMethod::Delete,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "PATCH" => HttpMethod::Patch,
            _ if is_token(s) => HttpMethod::Other(s.to_string()),
            _ => return Err(TransportFault::new(format!("invalid method: {s}"))),
        };
        Ok(method)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// RFC 9110 `token`: one or more visible ASCII characters, no delimiters.
fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b))
}

/// One exchange, described as plain data.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Correlates log lines of a single exchange.
    pub id: Uuid,
    pub method: String,
    pub resource: String,
    pub payload: Payload,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    /// The resource with the payload appended as a query string.
    pub fn assemble(&self) -> String {
        assemble(&self.resource, &self.payload)
    }

    /// Interpret `method` for a network transport.
    pub fn http_method(&self) -> Result<HttpMethod, TransportFault> {
        self.method.parse()
    }

    /// The URL a network transport should hit for `method`: body-carrying
    /// methods leave the payload out of the URL.
    pub fn target(&self, method: &HttpMethod) -> String {
        if method.sends_body() {
            self.resource.clone()
        } else {
            self.assemble()
        }
    }

    pub fn json_body(&self) -> String {
        Value::Object(self.payload.clone()).to_string()
    }
}

/// Join `resource` and a form-encoded rendering of `payload`.
///
/// Keys appear in insertion order. An empty payload leaves the resource
/// untouched. Array values repeat their key once per element; `null`
/// renders as an empty value.
pub fn assemble(resource: &str, payload: &Payload) -> String {
    if payload.is_empty() {
        return resource.to_string();
    }
    let mut query = form_urlencoded::Serializer::new(String::new());
    for (key, value) in payload {
        match value {
            Value::Array(items) => {
                for item in items {
                    query.append_pair(key, &scalar(item));
                }
            }
            other => {
                query.append_pair(key, &scalar(other));
            }
        }
    }
    format!("{resource}?{}", query.finish())
}

fn scalar(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
