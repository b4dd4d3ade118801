use super::{PlannedJoin, QueryPlan};

use geostore_core::stmt::{Expr, Limit, OrderByExpr, Select, Statement, TableRef, TableWithJoins};

/// Alias of the primary table in the projection
pub(crate) const PROJECTION_BASE: &str = "X1";

/// Alias of the primary table in the filter
pub(crate) const FILTER_BASE: &str = "F1";

impl QueryPlan {
    /// The statement producing the result rows, ordered by feature id.
    ///
    /// When neither the filter nor the projection needs joins, this is a
    /// single select over the primary table. Otherwise the matching ids are
    /// selected by a subquery, so that paging counts features rather than
    /// joined rows.
    pub fn select_statement(&self) -> Statement {
        let mut source = TableWithJoins::from(TableRef::aliased(&self.table, PROJECTION_BASE));
        source.joins = self.joins.iter().map(PlannedJoin::to_join).collect();

        let returning = self.columns.iter().map(|column| column.expr.clone()).collect();

        let mut select = Select::new(source, returning);
        select.order_by = self.order_by.clone();

        let paged = self.native_paging && self.has_paging();

        if self.filter_joins.is_empty() && (self.joins.is_empty() || !paged) {
            if let Some(filter) = &self.filter {
                select.add_filter(rebase(filter, PROJECTION_BASE));
            }

            if paged {
                select.limit = Some(self.limit_clause());
            }
        } else {
            select.add_filter(Expr::in_subquery(
                Expr::qualified_column(PROJECTION_BASE, &self.id_column),
                self.id_subquery(paged),
            ));
        }

        select.into()
    }

    /// `COUNT(DISTINCT id)` over the filter, ignoring paging.
    pub fn count_statement(&self) -> Statement {
        let id = Expr::qualified_column(FILTER_BASE, &self.id_column);
        let mut select = Select::new(self.filter_source(), vec![Expr::count_distinct(id)]);

        if let Some(filter) = &self.filter {
            select.add_filter(filter.clone());
        }

        select.into()
    }

    /// Ids of the features matching the filter.
    pub(crate) fn id_subquery(&self, paged: bool) -> Select {
        let id = Expr::qualified_column(FILTER_BASE, &self.id_column);

        let mut select = Select::new(self.filter_source(), vec![id.clone()]);
        select.distinct = !self.filter_joins.is_empty();

        if let Some(filter) = &self.filter {
            select.add_filter(filter.clone());
        }

        if paged {
            select.order_by = vec![OrderByExpr::asc(id)];
            select.limit = Some(self.limit_clause());
        }

        select
    }

    fn filter_source(&self) -> TableWithJoins {
        let mut source = TableWithJoins::from(TableRef::aliased(&self.table, FILTER_BASE));
        source.joins = self.filter_joins.iter().map(PlannedJoin::to_join).collect();
        source
    }

    fn limit_clause(&self) -> Limit {
        Limit {
            limit: self.limit,
            offset: self.offset,
        }
    }
}

/// Moves a filter without joins from the filter alias onto `alias`.
fn rebase(filter: &Expr, alias: &str) -> Expr {
    let mut filter = filter.clone();
    filter.for_each_column_mut(&mut |column| {
        if column.table.as_deref() == Some(FILTER_BASE) {
            column.table = Some(alias.to_string());
        }
    });
    filter
}
