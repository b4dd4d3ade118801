use super::{Expr, Statement, TableRef};

#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    /// What to update
    pub table: TableRef,

    /// Assignments
    pub assignments: Vec<Assignment>,

    /// Which rows to update
    pub filter: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub value: Expr,
}

impl Statement {
    pub fn is_update(&self) -> bool {
        matches!(self, Statement::Update(_))
    }
}

impl From<Update> for Statement {
    fn from(src: Update) -> Statement {
        Statement::Update(src)
    }
}
