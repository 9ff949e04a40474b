pub mod account;
pub mod identifiable;
pub mod message_log;
pub mod transaction;

// Re-exports
pub use account::*;
pub use identifiable::*;
pub use message_log::*;
pub use transaction::*;
