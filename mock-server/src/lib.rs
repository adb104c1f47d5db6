//! In-process HTTP server used to exercise the network transports.
//!
//! Every route answers with a small JSON object echoing the `q` argument it
//! received, the method it was reached by and the `x-trace` request header,
//! so a client can tell which request a response belongs to.

use std::collections::HashMap;

use axum::{
    extract::Query,
    http::{HeaderMap, Method, StatusCode},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpListener;

/// Request header echoed back in `Echo::header`.
pub const TRACE_HEADER: &str = "x-trace";

/// Body returned by every route.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Echo {
    pub text: String,
    pub q: Option<String>,
    pub method: String,
    #[serde(default)]
    pub header: Option<String>,
}

pub fn app() -> Router {
    Router::new()
        .route("/", get(hello_get).post(hello_post))
        .route("/error", get(error_get))
        .route("/any", any(any_method))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn trace(headers: &HeaderMap) -> Option<String> {
    headers
        .get(TRACE_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

async fn hello_get(headers: HeaderMap, Query(params): Query<HashMap<String, String>>) -> Json<Echo> {
    tracing::debug!(q = ?params.get("q"), "GET /");
    Json(Echo {
        text: "hello world".to_string(),
        q: params.get("q").cloned(),
        method: "GET".to_string(),
        header: trace(&headers),
    })
}

async fn hello_post(headers: HeaderMap, Json(body): Json<Value>) -> Json<Echo> {
    let q = body.get("q").and_then(Value::as_str).map(str::to_string);
    tracing::debug!(q = ?q, "POST /");
    Json(Echo {
        text: "hello world".to_string(),
        q,
        method: "POST".to_string(),
        header: trace(&headers),
    })
}

async fn error_get(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Echo>) {
    tracing::debug!(q = ?params.get("q"), "GET /error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(Echo {
            text: "error".to_string(),
            q: params.get("q").cloned(),
            method: "GET".to_string(),
            header: trace(&headers),
        }),
    )
}

/// Accepts any method, extension methods included, and reports it verbatim.
async fn any_method(
    method: Method,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Echo> {
    tracing::debug!(%method, q = ?params.get("q"), "ANY /any");
    Json(Echo {
        text: "hello world".to_string(),
        q: params.get("q").cloned(),
        method: method.to_string(),
        header: trace(&headers),
    })
}
