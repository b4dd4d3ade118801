use super::{Expr, Statement, TableRef};

/// Single-row `INSERT`.
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    /// Where to insert the values
    pub table: TableRef,

    pub columns: Vec<String>,

    /// One expression per column
    pub values: Vec<Expr>,

    /// Column to return, for backends that support `RETURNING`
    pub returning: Option<String>,
}

impl Statement {
    pub fn is_insert(&self) -> bool {
        matches!(self, Statement::Insert(..))
    }

    pub fn as_insert(&self) -> Option<&Insert> {
        match self {
            Self::Insert(insert) => Some(insert),
            _ => None,
        }
    }
}

impl From<Insert> for Statement {
    fn from(src: Insert) -> Self {
        Self::Insert(src)
    }
}
