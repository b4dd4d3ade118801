mod filter;
mod joins;
mod projection;

use super::{PlannedJoin, QueryPlan};
use crate::{
    services::{CrsTransformer, UnitConverter},
    Query, Result,
};

use geostore_core::{
    schema::{FeatureTypeMapping, TableJoin},
    stmt::Expr,
    Filter, MappedSchema,
};

/// Turns queries into plans.
#[derive(Debug, Clone, Copy)]
pub struct Translator<'a> {
    schema: &'a MappedSchema,
    units: &'a dyn UnitConverter,
    crs: Option<&'a dyn CrsTransformer>,
    native_paging: bool,

    /// Backend column telling rows apart, for unordered joins without key
    /// columns
    row_identity: Option<&'a str>,
}

impl<'a> Translator<'a> {
    pub fn new(schema: &'a MappedSchema, units: &'a dyn UnitConverter) -> Self {
        Self {
            schema,
            units,
            crs: None,
            native_paging: true,
            row_identity: None,
        }
    }

    pub fn crs(mut self, crs: Option<&'a dyn CrsTransformer>) -> Self {
        self.crs = crs;
        self
    }

    pub fn native_paging(mut self, native_paging: bool) -> Self {
        self.native_paging = native_paging;
        self
    }

    pub fn row_identity(mut self, column: Option<&'a str>) -> Self {
        self.row_identity = column;
        self
    }

    pub fn schema(&self) -> &'a MappedSchema {
        self.schema
    }

    pub fn translate(&self, query: &Query) -> Result<QueryPlan> {
        let ty = self.schema.feature_type_by_name(&query.type_name)?;

        let filter = match (&query.filter, query.ids.is_empty()) {
            (None, true) => None,
            (None, false) => Some(Filter::ResourceIds(query.ids.clone())),
            (Some(filter), true) => Some(filter.clone()),
            (Some(filter), false) => Some(Filter::and([
                Filter::ResourceIds(query.ids.clone()),
                filter.clone(),
            ])),
        };

        let (filter_joins, filter) = match &filter {
            Some(filter) => {
                let (joins, expr) = self.filter(ty, filter)?;
                (joins, Some(expr))
            }
            None => (vec![], None),
        };

        let projection = projection::build(self, ty, &query.properties)?;

        Ok(QueryPlan {
            feature_type: ty.name.clone(),
            table: ty.table.clone(),
            id_column: ty.id.column.clone(),
            id_prefix: ty.id.prefix.clone(),
            joins: projection.joins,
            filter_joins,
            filter,
            columns: projection.columns,
            properties: projection.properties,
            order_by: projection.order_by,
            offset: query.offset,
            limit: query.limit,
            native_paging: self.native_paging,
        })
    }

    /// Lowers `filter` to an expression over the aliases `F1`, `F2`, ...
    /// where `F1` is the primary table. Returns the joins it needs along with
    /// it.
    pub fn filter(
        &self,
        ty: &FeatureTypeMapping,
        filter: &Filter,
    ) -> Result<(Vec<PlannedJoin>, Expr)> {
        filter::lower(self, ty, filter)
    }
}

/// The table a property reached through `chain` lives in.
fn owning_table<'a>(ty: &'a FeatureTypeMapping, chain: &[&'a TableJoin]) -> &'a str {
    chain
        .last()
        .map(|join| join.to_table.as_str())
        .unwrap_or(&ty.table)
}

/// Points unqualified columns, and columns qualified with the owning table,
/// at `alias`. Other qualifiers and passthrough text are left alone.
fn qualify(expr: &Expr, owner: &str, alias: &str) -> Expr {
    let mut expr = expr.clone();
    expr.for_each_column_mut(&mut |column| {
        if column.table.as_deref().map_or(true, |table| table == owner) {
            column.schema = None;
            column.table = Some(alias.to_string());
        }
    });
    expr
}
