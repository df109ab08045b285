//! Audit-trail query handlers

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::middleware::RequireRead;
use crate::api::state::AppState;
use crate::api::types::{ApiError, DataResponse, ListResponse};
use crate::domain::account::Pagination;
use crate::domain::audit::{AuditFilter, AuditStats, StoredAuditRecord};

const DEFAULT_PAGE_SIZE: u32 = 50;
const MAX_PAGE_SIZE: u32 = 200;

#[derive(Debug, Default, Deserialize)]
pub struct AuditQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub status_code: Option<i32>,
    pub method: Option<String>,
    pub user: Option<String>,
    pub ip: Option<String>,
}

/// GET /audit
pub async fn list_audit(
    State(state): State<AppState>,
    RequireRead(_key): RequireRead,
    Query(params): Query<AuditQuery>,
) -> Result<Json<ListResponse<StoredAuditRecord>>, ApiError> {
    let filter = AuditFilter::from_params(
        params.date_from.as_deref(),
        params.date_to.as_deref(),
        params.api_key,
        params.endpoint,
        params.status_code,
        params.method,
        params.user,
        params.ip,
    )?;
    let page = Pagination::clamped(params.page, params.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);

    let result = state.audit.list(&filter, page).await?;

    Ok(Json(ListResponse::new(result.records, &page, result.total)))
}

/// GET /audit/stats
pub async fn audit_stats(
    State(state): State<AppState>,
    RequireRead(_key): RequireRead,
) -> Result<Json<DataResponse<AuditStats>>, ApiError> {
    let stats = state.audit.stats().await?;
    Ok(Json(DataResponse::new(stats)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    use crate::api::state::test_support::mock_state_with;
    use crate::domain::account::MockAccountRepository;
    use crate::domain::api_key::{AdmittedKey, Permission};
    use crate::domain::audit::{AuditPage, MockAuditRepository};

    fn reader_key() -> AdmittedKey {
        AdmittedKey {
            holder: "Read Only User".to_string(),
            permissions: vec![Permission::Read],
            daily_quota: 500,
            used_today: 1,
        }
    }

    #[tokio::test]
    async fn test_bad_date_rejected_before_store_access() {
        let state = mock_state_with(MockAccountRepository::new(), MockAuditRepository::new());
        let params = AuditQuery {
            date_from: Some("01-23-2025".to_string()),
            ..Default::default()
        };

        let err = list_audit(State(state), RequireRead(reader_key()), Query(params))
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_defaults_and_envelope() {
        let mut audit = MockAuditRepository::new();
        audit
            .expect_list()
            .withf(|filter, page| {
                *filter == AuditFilter::default() && page.page == 1 && page.limit == DEFAULT_PAGE_SIZE
            })
            .returning(|_, _| {
                Ok(AuditPage {
                    records: vec![],
                    total: 120,
                })
            });

        let state = mock_state_with(MockAccountRepository::new(), audit);
        let Json(response) = list_audit(
            State(state),
            RequireRead(reader_key()),
            Query(AuditQuery::default()),
        )
        .await
        .unwrap();

        assert!(response.success);
        assert_eq!(response.pagination.limit, DEFAULT_PAGE_SIZE);
        assert_eq!(response.pagination.pages, 3);
    }

    #[tokio::test]
    async fn test_limit_clamped_to_max() {
        let mut audit = MockAuditRepository::new();
        audit
            .expect_list()
            .withf(|_, page| page.limit == MAX_PAGE_SIZE)
            .returning(|_, _| {
                Ok(AuditPage {
                    records: vec![],
                    total: 0,
                })
            });

        let state = mock_state_with(MockAccountRepository::new(), audit);
        let params = AuditQuery {
            limit: Some(10_000),
            ..Default::default()
        };

        list_audit(State(state), RequireRead(reader_key()), Query(params))
            .await
            .unwrap();
    }
}
