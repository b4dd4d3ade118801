use super::Expr;

/// `expr LIKE pattern ESCAPE '<escape>'`
///
/// The pattern is already in SQL syntax (`%` and `_`); it is bound as a
/// parameter like every other constant.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprLike {
    pub expr: Box<Expr>,
    pub pattern: Box<Expr>,
    pub escape: char,
}

impl Expr {
    pub fn like(expr: impl Into<Self>, pattern: impl Into<Self>, escape: char) -> Self {
        ExprLike {
            expr: Box::new(expr.into()),
            pattern: Box::new(pattern.into()),
            escape,
        }
        .into()
    }
}

impl From<ExprLike> for Expr {
    fn from(value: ExprLike) -> Self {
        Self::Like(value)
    }
}
