mod query_sql;
pub use query_sql::{ExecSql, QuerySql};

mod transaction;
pub use transaction::Transaction;

#[derive(Debug, Clone)]
pub enum Operation {
    /// Run a query and stream its rows
    Query(QuerySql),

    /// Run a statement and report the affected row count
    Execute(ExecSql),

    /// Run statements in order, reporting the total affected row count
    Batch(Vec<ExecSql>),

    /// Delimit a transaction
    Transaction(Transaction),
}
