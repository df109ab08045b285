//! Domain layer: entities, query models, and repository contracts

pub mod account;
pub mod api_key;
pub mod audit;
mod error;

pub use error::DomainError;
