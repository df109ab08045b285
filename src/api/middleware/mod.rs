pub mod audit;
pub mod auth;

pub use audit::audit_middleware;
pub use auth::{RequireApiKey, RequireRead, RequireWrite};
