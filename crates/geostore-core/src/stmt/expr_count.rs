use super::Expr;

/// `COUNT(*)`, `COUNT(arg)` or `COUNT(DISTINCT arg)`
#[derive(Debug, Clone, PartialEq)]
pub struct ExprCount {
    pub arg: Option<Box<Expr>>,
    pub distinct: bool,
}

impl Expr {
    pub fn count_star() -> Self {
        ExprCount {
            arg: None,
            distinct: false,
        }
        .into()
    }

    pub fn count_distinct(arg: impl Into<Self>) -> Self {
        ExprCount {
            arg: Some(Box::new(arg.into())),
            distinct: true,
        }
        .into()
    }
}

impl From<ExprCount> for Expr {
    fn from(value: ExprCount) -> Self {
        Self::Count(value)
    }
}
