use super::{Expr, OrderByExpr, Statement, TableWithJoins};

#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    /// `SELECT DISTINCT`
    pub distinct: bool,

    /// Projected expressions, in result column order
    pub returning: Vec<Expr>,

    /// The `FROM` part of the query
    pub source: TableWithJoins,

    /// Query filter
    pub filter: Option<Expr>,

    pub order_by: Vec<OrderByExpr>,

    pub limit: Option<Limit>,
}

/// `LIMIT`/`OFFSET` paging. Either bound may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Limit {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl Limit {
    pub fn is_empty(&self) -> bool {
        self.limit.is_none() && self.offset.is_none()
    }
}

impl Select {
    pub fn new(source: impl Into<TableWithJoins>, returning: Vec<Expr>) -> Self {
        Self {
            distinct: false,
            returning,
            source: source.into(),
            filter: None,
            order_by: vec![],
            limit: None,
        }
    }

    pub fn add_filter(&mut self, expr: impl Into<Expr>) {
        self.filter = Some(match self.filter.take() {
            // Keep the existing filter as a single operand so its grouping
            // survives.
            Some(existing) => Expr::and_from_vec(vec![existing, expr.into()]),
            None => expr.into(),
        });
    }
}

impl From<Select> for Statement {
    fn from(src: Select) -> Self {
        Self::Select(src)
    }
}
