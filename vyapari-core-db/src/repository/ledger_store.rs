use super::{
    AccountStore, DeleteTransaction, InvoiceNumberExists, ListInvoiceDates, ListInvoiceNumbers,
    ListItemNames, MessageLogStore, ReadTransactions, WriteTransaction,
};

/// Every persistence operation the ledger services need, behind one object
///
/// Implemented automatically for any type that implements the individual
/// repository traits.
pub trait LedgerStore:
    WriteTransaction
    + ReadTransactions
    + ListInvoiceDates
    + ListInvoiceNumbers
    + ListItemNames
    + DeleteTransaction
    + InvoiceNumberExists
    + AccountStore
    + MessageLogStore
{
}

impl<T> LedgerStore for T where
    T: WriteTransaction
        + ReadTransactions
        + ListInvoiceDates
        + ListInvoiceNumbers
        + ListItemNames
        + DeleteTransaction
        + InvoiceNumberExists
        + AccountStore
        + MessageLogStore
{
}
