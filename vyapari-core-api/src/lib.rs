pub mod config;
pub mod domain;
pub mod error;
pub mod service;

pub use self::config::{LedgerConfig, RateLimitConfig};
pub use domain::*;
pub use error::*;
pub use service::*;
