pub mod postgres_repositories;
pub mod repository;
pub mod utils;

pub use postgres_repositories::PostgresRepositories;
pub use repository::ledger_repository::LedgerRepositoryImpl;
pub use repository::rate_window_repository::RateWindowRepositoryImpl;

#[cfg(test)]
pub mod test_helper;
