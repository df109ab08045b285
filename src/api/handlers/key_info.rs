//! Key self-inspection

use axum::{extract::State, Json};
use serde::Serialize;

use crate::api::middleware::RequireApiKey;
use crate::api::state::AppState;
use crate::api::types::{ApiError, DataResponse};
use crate::domain::api_key::Permission;

#[derive(Debug, Serialize)]
pub struct KeyInfo {
    pub name: String,
    pub permissions: Vec<Permission>,
    pub daily_quota: u32,
    pub requests_today: u32,
    pub remaining_requests: u32,
}

/// GET /key-info
///
/// Any valid key may inspect itself; the lookup itself counts against the
/// quota, so the figures reflect this very call.
pub async fn key_info(
    State(_state): State<AppState>,
    RequireApiKey(key): RequireApiKey,
) -> Result<Json<DataResponse<KeyInfo>>, ApiError> {
    let remaining = key.remaining();

    Ok(Json(DataResponse::new(KeyInfo {
        name: key.holder,
        permissions: key.permissions,
        daily_quota: key.daily_quota,
        requests_today: key.used_today,
        remaining_requests: remaining,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;

    use crate::api::state::test_support::mock_state;
    use crate::domain::account::MockAccountRepository;
    use crate::domain::api_key::AdmittedKey;

    #[tokio::test]
    async fn test_key_info_reflects_usage() {
        let key = AdmittedKey {
            holder: "Demo User".to_string(),
            permissions: vec![Permission::Read, Permission::Write],
            daily_quota: 1000,
            used_today: 42,
        };

        let state = mock_state(MockAccountRepository::new());
        let Json(response) = key_info(State(state), RequireApiKey(key)).await.unwrap();

        assert_eq!(response.data.name, "Demo User");
        assert_eq!(response.data.requests_today, 42);
        assert_eq!(response.data.remaining_requests, 958);
    }
}
