//! Ranked free-text search over the record store

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::middleware::RequireRead;
use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::account::AccountRecord;

const DEFAULT_SEARCH_LIMIT: u32 = 20;
const MAX_SEARCH_LIMIT: u32 = 100;
const MIN_QUERY_LEN: usize = 2;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub query: String,
    pub results: Vec<AccountRecord>,
    pub count: usize,
}

/// GET /search
pub async fn search_records(
    State(state): State<AppState>,
    RequireRead(_key): RequireRead,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = params.q.as_deref().unwrap_or("").trim().to_string();

    if query.chars().count() < MIN_QUERY_LEN {
        return Err(ApiError::bad_request(format!(
            "q must be at least {} characters",
            MIN_QUERY_LEN
        )));
    }

    let limit = params
        .limit
        .unwrap_or(DEFAULT_SEARCH_LIMIT)
        .clamp(1, MAX_SEARCH_LIMIT);

    let results = state.accounts.search(&query, limit).await?;
    let count = results.len();

    Ok(Json(SearchResponse {
        success: true,
        query,
        results,
        count,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    use crate::api::middleware::RequireRead;
    use crate::api::state::test_support::mock_state;
    use crate::domain::account::MockAccountRepository;
    use crate::domain::api_key::{AdmittedKey, Permission};

    fn reader_key() -> AdmittedKey {
        AdmittedKey {
            holder: "Read Only User".to_string(),
            permissions: vec![Permission::Read],
            daily_quota: 500,
            used_today: 1,
        }
    }

    async fn run(params: SearchQuery, repo: MockAccountRepository) -> Result<SearchResponse, StatusCode> {
        search_records(State(mock_state(repo)), RequireRead(reader_key()), Query(params))
            .await
            .map(|Json(r)| r)
            .map_err(|e| e.status)
    }

    #[tokio::test]
    async fn test_short_query_rejected_before_store_access() {
        for q in [None, Some(String::new()), Some("a".to_string()), Some("  x ".to_string())] {
            let status = run(
                SearchQuery { q, limit: None },
                MockAccountRepository::new(),
            )
            .await
            .unwrap_err();
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn test_min_length_counts_characters_not_bytes() {
        // One multibyte character is still one character
        let status = run(
            SearchQuery {
                q: Some("é".to_string()),
                limit: None,
            },
            MockAccountRepository::new(),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let mut repo = MockAccountRepository::new();
        repo.expect_search()
            .withf(|query, _| query == "éé")
            .returning(|_, _| Ok(vec![]));
        run(
            SearchQuery {
                q: Some("éé".to_string()),
                limit: None,
            },
            repo,
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_query_trimmed_and_limit_clamped() {
        let mut repo = MockAccountRepository::new();
        repo.expect_search()
            .withf(|query, limit| query == "example" && *limit == MAX_SEARCH_LIMIT)
            .returning(|_, _| Ok(vec![]));

        let response = run(
            SearchQuery {
                q: Some("  example  ".to_string()),
                limit: Some(5000),
            },
            repo,
        )
        .await
        .unwrap();

        assert_eq!(response.query, "example");
        assert_eq!(response.count, 0);
    }

    #[tokio::test]
    async fn test_default_limit() {
        let mut repo = MockAccountRepository::new();
        repo.expect_search()
            .withf(|_, limit| *limit == DEFAULT_SEARCH_LIMIT)
            .returning(|_, _| Ok(vec![]));

        run(
            SearchQuery {
                q: Some("example".to_string()),
                limit: None,
            },
            repo,
        )
        .await
        .unwrap();
    }
}
