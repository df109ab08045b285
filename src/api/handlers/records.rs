//! Account record handlers: listing, CRUD, and bulk ingest

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::api::middleware::{RequireRead, RequireWrite};
use crate::api::state::AppState;
use crate::api::types::{ApiError, DataResponse, ListResponse, MessageResponse};
use crate::domain::account::{
    parse_filter_date, AccountFilter, AccountInput, AccountRecord, AccountUpdate, Pagination, Sort,
};

const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 100;
const MAX_BULK_ITEMS: usize = 100;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub domain: Option<String>,
    pub source: Option<String>,
    pub region: Option<String>,
    pub provider_id: Option<i32>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

impl ListQuery {
    fn filter(&self) -> Result<AccountFilter, ApiError> {
        let date_from = self
            .date_from
            .as_deref()
            .map(|v| parse_filter_date("date_from", v))
            .transpose()?;
        let date_to = self
            .date_to
            .as_deref()
            .map(|v| parse_filter_date("date_to", v))
            .transpose()?;

        Ok(AccountFilter {
            domain: self.domain.clone().filter(|s| !s.is_empty()),
            source: self.source.clone().filter(|s| !s.is_empty()),
            region: self.region.clone().filter(|s| !s.is_empty()),
            provider_id: self.provider_id,
            date_from,
            date_to,
        })
    }
}

/// GET /records
pub async fn list_records(
    State(state): State<AppState>,
    RequireRead(_key): RequireRead,
    Query(params): Query<ListQuery>,
) -> Result<Json<ListResponse<AccountRecord>>, ApiError> {
    let filter = params.filter()?;
    let sort = Sort::from_params(params.sort_by.as_deref(), params.sort_order.as_deref());
    let page = Pagination::clamped(params.page, params.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);

    let result = state.accounts.list(&filter, sort, page).await?;

    Ok(Json(ListResponse::new(result.accounts, &page, result.total)))
}

/// GET /records/{id}
pub async fn get_record(
    State(state): State<AppState>,
    RequireRead(_key): RequireRead,
    Path(id): Path<i64>,
) -> Result<Json<DataResponse<AccountRecord>>, ApiError> {
    let account = state
        .accounts
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Record {} not found", id)))?;

    Ok(Json(DataResponse::new(account)))
}

/// POST /records
pub async fn create_record(
    State(state): State<AppState>,
    RequireWrite(key): RequireWrite,
    Json(input): Json<AccountInput>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let account = input.into_new_account(&format!("API-{}", key.holder))?;
    let id = state.accounts.insert(&account).await?;

    info!(id, domain = %account.domain, holder = %key.holder, "Record created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Record created",
            "data": {
                "id": id,
                "domain": account.domain,
                "username": account.username,
            }
        })),
    ))
}

/// PUT /records/{id}
pub async fn update_record(
    State(state): State<AppState>,
    RequireWrite(key): RequireWrite,
    Path(id): Path<i64>,
    Json(update): Json<AccountUpdate>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.accounts.exists(id).await? {
        return Err(ApiError::not_found(format!("Record {} not found", id)));
    }
    if update.is_empty() {
        return Err(ApiError::bad_request("no updatable fields provided"));
    }

    state.accounts.update(id, &update).await?;

    info!(id, holder = %key.holder, "Record updated");

    Ok(Json(MessageResponse::new(format!("Record {} updated", id))))
}

/// DELETE /records/{id}
pub async fn delete_record(
    State(state): State<AppState>,
    RequireWrite(key): RequireWrite,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.accounts.delete(id).await?;

    info!(id, holder = %key.holder, "Record deleted");

    Ok(Json(MessageResponse::new(format!("Record {} deleted", id))))
}

#[derive(Debug, Deserialize)]
pub struct BulkRequest {
    #[serde(default)]
    pub accounts: Vec<AccountInput>,
}

/// Bulk ingest outcome; always returned with status 200 once the batch shape
/// itself is acceptable
#[derive(Debug, Serialize)]
pub struct BulkResponse {
    pub success: bool,
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

/// POST /records/bulk
pub async fn bulk_create_records(
    State(state): State<AppState>,
    RequireWrite(key): RequireWrite,
    Json(request): Json<BulkRequest>,
) -> Result<Json<BulkResponse>, ApiError> {
    if request.accounts.is_empty() {
        return Err(ApiError::bad_request("accounts list must not be empty"));
    }
    if request.accounts.len() > MAX_BULK_ITEMS {
        return Err(ApiError::bad_request(format!(
            "accounts list exceeds the maximum of {} items",
            MAX_BULK_ITEMS
        )));
    }

    let default_source = format!("API-Bulk-{}", key.holder);
    let processed = request.accounts.len();
    let mut valid = Vec::with_capacity(processed);
    let mut errors = Vec::new();

    // Items are validated independently; one bad item never sinks the batch
    for (index, input) in request.accounts.into_iter().enumerate() {
        match input.into_new_account(&default_source) {
            Ok(account) => valid.push(account),
            Err(crate::domain::DomainError::Validation { message }) => {
                errors.push(format!("Item {}: {}", index + 1, message));
            }
            Err(e) => errors.push(format!("Item {}: {}", index + 1, e)),
        }
    }

    if !valid.is_empty() {
        state.accounts.insert_batch(&valid).await?;
    }

    info!(
        processed,
        succeeded = valid.len(),
        failed = errors.len(),
        holder = %key.holder,
        "Bulk ingest finished"
    );

    Ok(Json(BulkResponse {
        success: true,
        processed,
        succeeded: valid.len(),
        failed: errors.len(),
        errors,
    }))
}
