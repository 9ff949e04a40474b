pub mod memory;
pub mod models;
pub mod repository;
pub mod utils;
