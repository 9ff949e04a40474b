//! In-process store implementations.
//!
//! Used as the local rate-limit fallback and by tests; state lives as long as
//! the store value and is shared between clones.

pub mod ledger_store;
pub mod rate_window_store;

pub use ledger_store::MemoryLedgerStore;
pub use rate_window_store::MemoryRateWindowStore;
