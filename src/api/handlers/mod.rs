pub mod audit;
pub mod health;
pub mod key_info;
pub mod records;
pub mod search;
pub mod stats;
