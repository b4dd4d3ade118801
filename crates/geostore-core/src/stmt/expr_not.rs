use super::Expr;

/// Logical negation of a predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprNot {
    pub expr: Box<Expr>,
}

impl Expr {
    /// Negates `expr`. A double negation collapses to the inner predicate.
    pub fn not(expr: impl Into<Self>) -> Self {
        match expr.into() {
            Expr::Not(ExprNot { expr }) => *expr,
            expr => Expr::Not(ExprNot {
                expr: Box::new(expr),
            }),
        }
    }
}

impl From<ExprNot> for Expr {
    fn from(value: ExprNot) -> Self {
        Self::Not(value)
    }
}
