mod postgres_repository;

pub use postgres_repository::PostgresAccountRepository;
