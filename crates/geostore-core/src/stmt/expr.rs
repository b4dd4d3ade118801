use super::*;

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// AND a set of boolean expressions
    And(ExprAnd),

    /// `lower <= expr AND expr <= upper`
    Between(ExprBetween),

    /// Binary comparison
    BinaryOp(ExprBinaryOp),

    /// References a column, optionally qualified by schema and table
    Column(ExprColumn),

    /// Count of rows (or of distinct values)
    Count(ExprCount),

    /// Function call, rendered through the function provider registry
    Func(ExprFunc),

    /// In list
    InList(ExprInList),

    /// The expression is contained by the given subquery
    InSubquery(ExprInSubquery),

    /// Whether an expression is (or is not) null. This is different from a
    /// binary expression because of how databases treat null comparisons.
    IsNull(ExprIsNull),

    /// SQL `LIKE` with an escape character
    Like(ExprLike),

    /// Negates a boolean expression
    Not(ExprNot),

    /// OR a set of boolean expressions
    Or(ExprOr),

    /// Evaluates to a constant value. Constants are always bound as
    /// parameters, never inlined into query text.
    Value(Value),
}

impl Expr {
    pub fn null() -> Self {
        Self::Value(Value::Null)
    }

    /// Is a value that evaluates to null
    pub fn is_value_null(&self) -> bool {
        matches!(self, Self::Value(Value::Null))
    }

    /// Returns true if the expression is a constant value.
    pub fn is_value(&self) -> bool {
        matches!(self, Self::Value(..))
    }

    pub fn is_column(&self) -> bool {
        matches!(self, Self::Column(..))
    }

    pub fn as_column(&self) -> Option<&ExprColumn> {
        match self {
            Self::Column(expr) => Some(expr),
            _ => None,
        }
    }

    pub fn as_func(&self) -> Option<&ExprFunc> {
        match self {
            Self::Func(expr) => Some(expr),
            _ => None,
        }
    }

    /// Visits every column reference in the expression tree.
    pub fn for_each_column_mut(&mut self, f: &mut impl FnMut(&mut ExprColumn)) {
        match self {
            Self::And(expr) => expr.operands.iter_mut().for_each(|e| e.for_each_column_mut(f)),
            Self::Or(expr) => expr.operands.iter_mut().for_each(|e| e.for_each_column_mut(f)),
            Self::Between(expr) => {
                expr.expr.for_each_column_mut(f);
                expr.lower.for_each_column_mut(f);
                expr.upper.for_each_column_mut(f);
            }
            Self::BinaryOp(expr) => {
                expr.lhs.for_each_column_mut(f);
                expr.rhs.for_each_column_mut(f);
            }
            Self::Column(expr) => f(expr),
            Self::Count(expr) => {
                if let Some(arg) = &mut expr.arg {
                    arg.for_each_column_mut(f);
                }
            }
            Self::Func(expr) => expr.args.iter_mut().for_each(|e| e.for_each_column_mut(f)),
            Self::InList(expr) => {
                expr.expr.for_each_column_mut(f);
                expr.list.iter_mut().for_each(|e| e.for_each_column_mut(f));
            }
            Self::InSubquery(expr) => expr.expr.for_each_column_mut(f),
            Self::IsNull(expr) => expr.expr.for_each_column_mut(f),
            Self::Like(expr) => {
                expr.expr.for_each_column_mut(f);
                expr.pattern.for_each_column_mut(f);
            }
            Self::Not(expr) => expr.expr.for_each_column_mut(f),
            Self::Value(_) => {}
        }
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Self::Value(value.into())
    }
}

impl From<String> for Expr {
    fn from(value: String) -> Self {
        Self::Value(value.into())
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Self::Value(value.into())
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Self::Value(value.into())
    }
}

impl From<bool> for Expr {
    fn from(value: bool) -> Self {
        Self::Value(value.into())
    }
}

/// Re-stringifies mapping expressions.
///
/// Column references, string constants and function calls print in the
/// mapping-expression syntax accepted by [`parse_mapping_expr`]. Passthrough
/// function nodes print their original text unchanged.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Column(expr) => fmt::Display::fmt(expr, f),
            Self::Func(expr) => fmt::Display::fmt(expr, f),
            Self::Value(Value::String(s)) => write!(f, "'{}'", s.replace('\'', "''")),
            Self::Value(Value::Null) => f.write_str("NULL"),
            Self::Value(value) => match value.to_text() {
                Some(text) => f.write_str(&text),
                None => write!(f, "<{}>", value.kind_name()),
            },
            other => write!(f, "{other:?}"),
        }
    }
}
