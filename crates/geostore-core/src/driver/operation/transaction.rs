use super::Operation;

/// Transaction control, rendered per dialect by the serializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transaction {
    /// `BEGIN` or `START TRANSACTION`
    Start,
    Commit,
    Rollback,
}

impl From<Transaction> for Operation {
    fn from(value: Transaction) -> Operation {
        Operation::Transaction(value)
    }
}
