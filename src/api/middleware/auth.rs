//! API key extractors
//!
//! The credential travels either in the `X-API-Key` header or the `api_key`
//! query parameter; the header wins when both are present.

use std::collections::HashMap;

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::api_key::{AdmittedKey, Permission};

pub const API_KEY_HEADER: &str = "x-api-key";
pub const API_KEY_QUERY_PARAM: &str = "api_key";

/// Pulls the credential out of the request, if any
pub fn extract_credential(parts: &Parts) -> Option<String> {
    if let Some(value) = parts.headers.get(API_KEY_HEADER) {
        if let Ok(token) = value.to_str() {
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    let params: Query<HashMap<String, String>> = Query::try_from_uri(&parts.uri).ok()?;
    params
        .get(API_KEY_QUERY_PARAM)
        .filter(|token| !token.is_empty())
        .cloned()
}

async fn admit(
    parts: &Parts,
    state: &AppState,
    required: &[Permission],
) -> Result<AdmittedKey, ApiError> {
    let credential = extract_credential(parts);
    state
        .registry
        .admit(credential.as_deref(), required)
        .map_err(ApiError::from)
}

/// Admits the request with the `read` permission
pub struct RequireRead(pub AdmittedKey);

impl FromRequestParts<AppState> for RequireRead {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        admit(parts, state, &[Permission::Read]).await.map(Self)
    }
}

/// Admits the request with the `write` permission
pub struct RequireWrite(pub AdmittedKey);

impl FromRequestParts<AppState> for RequireWrite {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        admit(parts, state, &[Permission::Write]).await.map(Self)
    }
}

/// Admits any valid key regardless of its permission set
pub struct RequireApiKey(pub AdmittedKey);

impl FromRequestParts<AppState> for RequireApiKey {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        admit(parts, state, &[Permission::Read, Permission::Write])
            .await
            .map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_for(uri: &str, header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri(uri);
        if let Some(value) = header {
            builder = builder.header("X-API-Key", value);
        }
        let (parts, ()) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[test]
    fn test_header_credential() {
        let parts = parts_for("/records", Some("demo_key_123"));
        assert_eq!(extract_credential(&parts).as_deref(), Some("demo_key_123"));
    }

    #[test]
    fn test_query_param_credential() {
        let parts = parts_for("/records?api_key=read_only_key_456&page=2", None);
        assert_eq!(
            extract_credential(&parts).as_deref(),
            Some("read_only_key_456")
        );
    }

    #[test]
    fn test_header_wins_over_query_param() {
        let parts = parts_for("/records?api_key=from_query", Some("from_header"));
        assert_eq!(extract_credential(&parts).as_deref(), Some("from_header"));
    }

    #[test]
    fn test_missing_credential() {
        let parts = parts_for("/records?page=1", None);
        assert_eq!(extract_credential(&parts), None);
    }

    #[test]
    fn test_empty_header_ignored() {
        let parts = parts_for("/records", Some(""));
        assert_eq!(extract_credential(&parts), None);
    }
}
