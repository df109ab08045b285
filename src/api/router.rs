//! Route table and middleware stack

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::handlers::{audit, health, key_info, records, search, stats};
use crate::api::middleware::audit_middleware;
use crate::api::state::AppState;

/// Builds the application router.
///
/// The audit pipeline wraps everything but tracing and CORS, so rejected and
/// panicking calls are still recorded. CatchPanicLayer sits inside it and
/// turns panics into plain 500s before the audit layer observes the response.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/records",
            get(records::list_records).post(records::create_record),
        )
        .route("/records/bulk", post(records::bulk_create_records))
        .route(
            "/records/{id}",
            get(records::get_record)
                .put(records::update_record)
                .delete(records::delete_record),
        )
        .route("/search", get(search::search_records))
        .route("/key-info", get(key_info::key_info))
        .route("/audit", get(audit::list_audit))
        .route("/audit/stats", get(audit::audit_stats))
        .route("/stats", get(stats::account_stats))
        .layer(CatchPanicLayer::new())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            audit_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
