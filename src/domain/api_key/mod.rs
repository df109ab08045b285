//! API key domain: key metadata, daily quota windows, admission control

mod entity;
mod registry;

pub use entity::{AdmittedKey, ApiKeySpec, Permission, UsageWindow};
pub use registry::KeyRegistry;
