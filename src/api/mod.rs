//! HTTP layer: routing, extractors, middleware, and response shaping

pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;
pub mod types;

pub use router::build_router;
pub use state::AppState;
