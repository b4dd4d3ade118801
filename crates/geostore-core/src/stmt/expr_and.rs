use super::*;

use std::ops;

#[derive(Debug, Clone, PartialEq)]
pub struct ExprAnd {
    pub operands: Vec<Expr>,
}

impl Expr {
    /// Builds a conjunction without flattening nested conjunctions, so the
    /// rendered clause keeps the grouping of the input.
    pub fn and_from_vec(operands: Vec<Self>) -> Self {
        if operands.len() == 1 {
            let mut operands = operands;
            return operands.remove(0);
        }

        ExprAnd { operands }.into()
    }
}

impl ops::Deref for ExprAnd {
    type Target = [Expr];

    fn deref(&self) -> &Self::Target {
        self.operands.deref()
    }
}

impl From<ExprAnd> for Expr {
    fn from(value: ExprAnd) -> Self {
        Self::And(value)
    }
}
