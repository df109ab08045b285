//! Infrastructure layer: storage, repositories, sinks, logging

pub mod account;
pub mod audit;
pub mod logging;
pub mod storage;
