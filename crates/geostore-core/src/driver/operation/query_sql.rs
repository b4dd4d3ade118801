use super::Operation;
use crate::stmt::{Type, Value};

/// Rendered query text with its bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySql {
    /// SQL text using the dialect's placeholder syntax
    pub sql: String,

    pub params: Vec<Value>,

    /// Type to decode each result column into
    pub ret: Vec<Type>,
}

/// Rendered statement text for a statement without result rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecSql {
    pub sql: String,
    pub params: Vec<Value>,
}

impl From<QuerySql> for Operation {
    fn from(value: QuerySql) -> Self {
        Self::Query(value)
    }
}

impl From<ExecSql> for Operation {
    fn from(value: ExecSql) -> Self {
        Self::Execute(value)
    }
}
