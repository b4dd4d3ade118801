use super::Expr;

/// `expr IS NULL`, or `expr IS NOT NULL` when negated.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprIsNull {
    pub negate: bool,
    pub expr: Box<Expr>,
}

impl Expr {
    pub fn is_null(expr: impl Into<Self>) -> Self {
        Self::null_check(expr.into(), false)
    }

    pub fn is_not_null(expr: impl Into<Self>) -> Self {
        Self::null_check(expr.into(), true)
    }

    fn null_check(expr: Expr, negate: bool) -> Self {
        Self::IsNull(ExprIsNull {
            negate,
            expr: Box::new(expr),
        })
    }
}

impl From<ExprIsNull> for Expr {
    fn from(value: ExprIsNull) -> Self {
        Self::IsNull(value)
    }
}
