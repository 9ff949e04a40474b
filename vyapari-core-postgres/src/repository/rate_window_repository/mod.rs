pub mod repo_impl;
pub mod try_admit;

pub use repo_impl::RateWindowRepositoryImpl;
