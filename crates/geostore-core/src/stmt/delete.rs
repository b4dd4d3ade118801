use super::{Expr, Statement, TableRef};

#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    /// Table to delete from
    pub from: TableRef,

    /// WHERE
    pub filter: Option<Expr>,
}

impl Statement {
    pub fn is_delete(&self) -> bool {
        matches!(self, Statement::Delete(..))
    }
}

impl From<Delete> for Statement {
    fn from(src: Delete) -> Self {
        Self::Delete(src)
    }
}
