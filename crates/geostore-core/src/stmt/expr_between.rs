use super::Expr;

#[derive(Debug, Clone, PartialEq)]
pub struct ExprBetween {
    pub expr: Box<Expr>,
    pub lower: Box<Expr>,
    pub upper: Box<Expr>,
}

impl Expr {
    pub fn between(expr: impl Into<Self>, lower: impl Into<Self>, upper: impl Into<Self>) -> Self {
        ExprBetween {
            expr: Box::new(expr.into()),
            lower: Box::new(lower.into()),
            upper: Box::new(upper.into()),
        }
        .into()
    }
}

impl From<ExprBetween> for Expr {
    fn from(value: ExprBetween) -> Self {
        Self::Between(value)
    }
}
