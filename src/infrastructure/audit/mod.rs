mod file_sink;
mod postgres_repository;

pub use file_sink::FileAuditSink;
pub use postgres_repository::PostgresAuditRepository;
