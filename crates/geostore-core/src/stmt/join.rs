use super::{Expr, TableRef};

/// `LEFT OUTER JOIN <table> ON <on>`
///
/// Joins are always outer so that a feature without rows in a joined table
/// is still returned.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    /// The table to join
    pub table: TableRef,

    /// The join condition
    pub on: Expr,
}
