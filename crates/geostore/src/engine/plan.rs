use geostore_core::{
    geometry::Srid,
    schema::{QName, TableJoin},
    stmt::{Expr, Join, OrderByExpr, TableRef, Type},
};

/// The translated form of a [`Query`](crate::Query).
///
/// Projection joins are aliased `X2`, `X3`, ... on top of the primary table
/// `X1`. The filter is expressed over a second, independent set of aliases
/// `F1`, `F2`, ... so that it can be placed in an id subquery without
/// multiplying the projected rows.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub feature_type: QName,

    /// Primary table
    pub table: String,

    pub id_column: String,

    pub id_prefix: String,

    /// Joins needed by the projection, deduplicated, parents first
    pub joins: Vec<PlannedJoin>,

    /// Joins needed by the filter, deduplicated, parents first
    pub filter_joins: Vec<PlannedJoin>,

    pub filter: Option<Expr>,

    /// Result columns. Column 0 is always the feature id.
    pub columns: Vec<ProjectedColumn>,

    /// How result columns fold back into properties
    pub properties: Vec<ProjectedProperty>,

    /// Feature id first, then the order columns of ordered joins
    pub order_by: Vec<OrderByExpr>,

    pub offset: Option<u64>,

    pub limit: Option<u64>,

    /// When `false`, offset and limit are applied while streaming
    pub native_paging: bool,
}

impl QueryPlan {
    pub fn has_paging(&self) -> bool {
        self.offset.is_some() || self.limit.is_some()
    }

    pub fn column_types(&self) -> Vec<Type> {
        self.columns.iter().map(|column| column.ty).collect()
    }
}

/// A mapping join realized under an alias.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedJoin {
    pub alias: String,

    /// Alias of the table joined from
    pub parent: String,

    pub join: TableJoin,
}

impl PlannedJoin {
    pub fn to_join(&self) -> Join {
        let on = self
            .join
            .from_columns
            .iter()
            .zip(&self.join.to_columns)
            .map(|(from, to)| {
                Expr::eq(
                    Expr::qualified_column(&self.parent, from),
                    Expr::qualified_column(&self.alias, to),
                )
            })
            .collect();

        Join {
            table: TableRef::aliased(&self.join.to_table, &self.alias),
            on: Expr::and_from_vec(on),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedColumn {
    pub expr: Expr,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedProperty {
    pub name: QName,

    /// Collected into a list
    pub multi: bool,

    pub nillable: bool,

    /// The property has joins of its own, so its values are elements that
    /// rows may repeat
    pub joined: bool,

    /// Columns identifying an element among repeated rows
    pub key: Vec<usize>,

    pub order: ElementOrder,

    /// Every column of this property and its children. A joined element
    /// whose columns are all null did not match the outer join.
    pub columns: Vec<usize>,

    pub kind: ProjectedKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementOrder {
    /// Arrival order, which follows the `ORDER BY` of the statement
    Arrival,

    /// Sorted by the single numeric key column
    Numbered,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProjectedKind {
    Primitive {
        column: usize,
        ty: Type,
    },

    Geometry {
        column: usize,
        srid: Option<Srid>,
    },

    Reference {
        fk: Option<usize>,
        href: Option<usize>,
        target: Option<QName>,

        /// Id prefix of the target type, prepended to foreign keys
        prefix: String,
    },

    Record(Vec<ProjectedProperty>),
}
