use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    Root,
    DateList,
    InvoiceList,
    ItemList,
    /// The next plain-text message is an invoice number to search for.
    AwaitingInvoiceNumber,
    Deleted,
    /// The chosen item was already gone.
    NothingDeleted,
    /// A listing came back empty.
    NoResults,
    Cancelled,
}

impl WizardState {
    /// Terminal states end the flow and clear the session.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WizardState::Deleted | WizardState::NothingDeleted | WizardState::NoResults | WizardState::Cancelled
        )
    }
}

/// Per-account wizard progress, kept between callback round trips.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionSession {
    pub state: WizardState,
    pub selected_date: Option<NaiveDate>,
    pub selected_invoice: Option<String>,
    /// Entries of the list last shown; `#n` token references index into it.
    pub listed: Vec<String>,
}

impl Default for DeletionSession {
    fn default() -> Self {
        Self {
            state: WizardState::Root,
            selected_date: None,
            selected_invoice: None,
            listed: Vec::new(),
        }
    }
}
