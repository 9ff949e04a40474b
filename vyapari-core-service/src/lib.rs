pub mod accounts;
pub mod bootstrap;
pub mod dispatch;
pub mod invoicing;
pub mod ledger;
pub mod message_log;
pub mod offload;
pub mod rate_limit;
pub mod wizard;

#[cfg(test)]
pub(crate) mod test_support;

pub use accounts::AccountRegistry;
pub use dispatch::{ConversationHandler, DispatchOutcome, InboundUpdate, RequestDispatcher};
pub use invoicing::{InvoiceReceipt, InvoiceService};
pub use ledger::{CsvExport, DeleteOutcome, TransactionLedger};
pub use message_log::MessageLog;
pub use offload::{BlockingCallOffload, LivenessGuard};
pub use rate_limit::{RateDecision, RateLimiter};
pub use wizard::{DeletionWizard, SessionStore, WizardReply, WizardState};
