//! Request audit trail
//!
//! Every call, success or failure, produces exactly one structured record:
//! method, target, caller address, header set, response status, elapsed
//! time, and a payload summary the handler attached as a response
//! extension. Handlers never put the large `text` body in the summary;
//! it is replaced by `TEXT_PLACEHOLDER` to keep log volume sane.

use axum::{
    extract::{ConnectInfo, Request},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::time::Instant;
use tracing::info;

/// Stands in for the text body in audit payload summaries
pub const TEXT_PLACEHOLDER: &str = "[text omitted]";

/// Payload summary a handler attaches for the audit record
#[derive(Debug, Clone)]
pub struct AuditPayload(pub serde_json::Value);

/// Attach a payload summary to an outgoing response
pub fn with_payload(mut response: Response, payload: serde_json::Value) -> Response {
    response.extensions_mut().insert(AuditPayload(payload));
    response
}

/// Middleware emitting the per-request audit record
pub async fn audit(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    let target = request.uri().to_string();
    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.to_string());
    let headers = headers_json(request.headers());

    let response = next.run(request).await;

    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    let payload = response
        .extensions()
        .get::<AuditPayload>()
        .map(|p| p.0.to_string());

    info!(
        target: "audit",
        method = %method,
        url = %target,
        remote_addr = remote_addr.as_deref().unwrap_or("unknown"),
        headers = %headers,
        response_status = response.status().as_u16(),
        elapsed_ms = elapsed_ms,
        request_body = payload.as_deref().unwrap_or("-"),
        "request handled"
    );

    response
}

fn headers_json(headers: &HeaderMap) -> String {
    let map: serde_json::Map<String, serde_json::Value> = headers
        .iter()
        .map(|(name, value)| {
            (
                name.to_string(),
                serde_json::Value::String(String::from_utf8_lossy(value.as_bytes()).into_owned()),
            )
        })
        .collect();
    serde_json::Value::Object(map).to_string()
}
