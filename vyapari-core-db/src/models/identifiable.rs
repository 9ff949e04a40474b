use uuid::Uuid;

/// Trait for ledger rows that carry their own UUID
pub trait Identifiable {
    /// Returns the unique identifier of the row
    fn get_id(&self) -> Uuid;
}
