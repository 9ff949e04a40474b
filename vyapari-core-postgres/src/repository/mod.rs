pub mod db_init;
pub mod ledger_repository;
pub mod rate_window_repository;
