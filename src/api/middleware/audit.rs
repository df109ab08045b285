//! Request audit pipeline
//!
//! Outermost middleware: observes every call (including rejected ones),
//! times it, and records the outcome to both sinks. A sink failure is
//! logged and swallowed so the caller's response is never affected.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Instant;

use axum::body::{to_bytes, Body};
use axum::extract::{ConnectInfo, MatchedPath, Query, Request, State};
use axum::http::{header, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde_json::Value;
use tracing::{error, warn};

use crate::api::middleware::auth::extract_credential;
use crate::api::state::AppState;
use crate::api::types::{ApiError, AuditErrorMessage};
use crate::domain::audit::AuditRecord;

/// Replacement for password values in the request log
const REDACTED: &str = "***hidden***";

/// Upper bound on buffered request bodies
const MAX_BODY_BYTES: usize = 1024 * 1024;

pub async fn audit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let timestamp = Utc::now();

    let method = request.method().clone();
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let ip_address = client_ip(&request);
    let query_params = query_params_json(&request);
    let user_agent = header_value(&request, header::USER_AGENT);

    let (parts, body) = request.into_parts();
    let credential = extract_credential(&parts);
    let user_name = credential
        .as_deref()
        .and_then(|token| state.registry.resolve_holder(token))
        .map(str::to_string);

    // Buffer JSON bodies on mutating calls so the log can keep a redacted copy
    let (request_body, response) = if parts.method == Method::POST || parts.method == Method::PUT {
        match to_bytes(body, MAX_BODY_BYTES).await {
            Ok(bytes) => {
                let parsed = serde_json::from_slice::<Value>(&bytes).ok().map(|mut v| {
                    redact_passwords(&mut v);
                    v
                });
                let request = Request::from_parts(parts, Body::from(bytes));
                (parsed, next.run(request).await)
            }
            Err(e) => {
                // Unbufferable body: reject in the standard envelope rather
                // than forwarding a truncated request
                warn!(error = %e, "Rejecting unbufferable request body");
                let err = ApiError::new(
                    StatusCode::PAYLOAD_TOO_LARGE,
                    "Payload too large",
                    Some(format!("request body exceeds {} bytes", MAX_BODY_BYTES)),
                );
                (None, err.into_response())
            }
        }
    } else {
        let request = Request::from_parts(parts, body);
        (None, next.run(request).await)
    };

    let status_code = i32::from(response.status().as_u16());
    let response_time = started.elapsed().as_secs_f64();
    let error_message = response
        .extensions()
        .get::<AuditErrorMessage>()
        .map(|m| m.0.clone());

    let record = AuditRecord::new(
        timestamp,
        ip_address,
        credential.as_deref(),
        user_name,
        method.to_string(),
        endpoint,
        query_params,
        status_code,
        response_time,
        user_agent.as_deref(),
        error_message.as_deref(),
    );

    if let Err(e) = state.audit.insert(&record).await {
        error!(error = %e, "Audit store write failed");
    }
    if let Err(e) = state.audit_log.append(&record, request_body.as_ref()).await {
        error!(error = %e, "Request log append failed");
    }

    response
}

/// Client address: first `X-Forwarded-For` entry, then the peer address
fn client_ip(request: &Request) -> String {
    if let Some(forwarded) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn query_params_json(request: &Request) -> Option<Value> {
    let params: Query<HashMap<String, String>> = Query::try_from_uri(request.uri()).ok()?;
    if params.is_empty() {
        return None;
    }
    serde_json::to_value(params.0).ok()
}

fn header_value(request: &Request, name: header::HeaderName) -> Option<String> {
    request
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Replaces every field literally named `password` with the redaction marker
fn redact_passwords(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, val) in map.iter_mut() {
                if key == "password" {
                    *val = Value::String(REDACTED.to_string());
                } else {
                    redact_passwords(val);
                }
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                redact_passwords(item);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_redact_top_level_password() {
        let mut body = json!({"domain": "example.com", "password": "hunter2"});
        redact_passwords(&mut body);
        assert_eq!(body["password"], REDACTED);
        assert_eq!(body["domain"], "example.com");
    }

    #[test]
    fn test_redact_nested_and_array_passwords() {
        let mut body = json!({
            "accounts": [
                {"username": "a", "password": "one"},
                {"username": "b", "password": "two"}
            ]
        });
        redact_passwords(&mut body);
        assert_eq!(body["accounts"][0]["password"], REDACTED);
        assert_eq!(body["accounts"][1]["password"], REDACTED);
        assert_eq!(body["accounts"][0]["username"], "a");
    }

    #[test]
    fn test_client_ip_prefers_forwarded_header() {
        let request = Request::builder()
            .uri("/records")
            .header("X-Forwarded-For", "203.0.113.9, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_ip(&request), "203.0.113.9");
    }

    #[test]
    fn test_client_ip_unknown_without_peer() {
        let request = Request::builder()
            .uri("/records")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_ip(&request), "unknown");
    }

    #[test]
    fn test_query_params_json() {
        let request = Request::builder()
            .uri("/records?page=2&domain=example")
            .body(Body::empty())
            .unwrap();
        let params = query_params_json(&request).unwrap();
        assert_eq!(params["page"], "2");
        assert_eq!(params["domain"], "example");

        let bare = Request::builder()
            .uri("/records")
            .body(Body::empty())
            .unwrap();
        assert!(query_params_json(&bare).is_none());
    }
}
