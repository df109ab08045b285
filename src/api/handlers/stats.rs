//! Record-store aggregates

use axum::{extract::State, Json};

use crate::api::middleware::RequireRead;
use crate::api::state::AppState;
use crate::api::types::{ApiError, DataResponse};
use crate::domain::account::AccountStats;

/// GET /stats
pub async fn account_stats(
    State(state): State<AppState>,
    RequireRead(_key): RequireRead,
) -> Result<Json<DataResponse<AccountStats>>, ApiError> {
    let stats = state.accounts.stats().await?;
    Ok(Json(DataResponse::new(stats)))
}
