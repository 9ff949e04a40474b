//! Deletion wizard: locate and remove one ledger line through callback menus.
//!
//! ```text
//! ROOT ──del_recent──▶ DATE_LIST ──del_date──▶ INVOICE_LIST ──del_inv──▶ ITEM_LIST ──del_item──▶ DELETED
//!   └──del_search──▶ AWAITING_INVOICE_NUMBER ──(text)──────────────────────▲
//! del_cancel|<level> from any state ▶ CANCELLED (session cleared)
//! ```

pub mod menus;
pub mod session_store;
pub mod state;
#[allow(clippy::module_inception)]
pub mod wizard;

pub use session_store::SessionStore;
pub use state::{DeletionSession, WizardState};
pub use wizard::{DeletionWizard, WizardReply};
