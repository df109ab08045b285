mod app_config;

pub use app_config::{
    AppConfig, AuditConfig, DatabaseConfig, LogFormat, LoggingConfig, ServerConfig,
};
