//! Insert, update and delete statements for features.

use super::{lower::FILTER_BASE, PlannedJoin, Translator};
use crate::Result;

use geostore_core::{
    bail,
    driver::Capability,
    feature::{PropertyValue, ReferenceHandle},
    geometry::Srid,
    schema::{
        FeatureTypeMapping, IdGenerator, PropertyKind, PropertyMapping, PropertyPath, QName,
        TableJoin,
    },
    stmt::{Assignment, Delete, Expr, Insert, Select, Statement, TableRef, Type, Update, Value},
    Error, Feature, Filter, Geometry, MappedSchema,
};
use indexmap::IndexMap;

/// Replaces properties of one stored feature.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureUpdate {
    pub type_name: String,

    pub fid: String,

    /// Only update when the feature also matches this filter
    pub guard: Option<Filter>,

    /// New values, by property path. Only properties stored in the primary
    /// table can be replaced.
    pub replace: Vec<(PropertyPath, PropertyValue)>,
}

impl FeatureUpdate {
    pub fn new(type_name: impl Into<String>, fid: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fid: fid.into(),
            guard: None,
            replace: vec![],
        }
    }

    pub fn set(mut self, path: impl Into<PropertyPath>, value: impl Into<PropertyValue>) -> Self {
        self.replace.push((path.into(), value.into()));
        self
    }

    pub fn guard(mut self, filter: Filter) -> Self {
        self.guard = Some(filter);
        self
    }
}

/// Column values of one row to insert.
type RowValues = IndexMap<String, Expr>;

/// The statements inserting one feature.
///
/// Child rows reference their parent through the join columns, so they can
/// only be rendered once the parent key is known.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertRows {
    pub table: String,

    pub id_column: String,

    pub id_ty: Type,

    /// Prefix turning the key into a feature id
    pub id_prefix: String,

    /// Key supplied by the caller; `None` when the backend generates it
    pub key: Option<Value>,

    pub row: RowValues,

    pub children: Vec<ChildRows>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChildRows {
    pub join: TableJoin,
    pub rows: Vec<RowValues>,
}

impl InsertRows {
    pub fn parent_statement(&self) -> Statement {
        Insert {
            table: TableRef::new(&self.table),
            columns: self.row.keys().cloned().collect(),
            values: self.row.values().cloned().collect(),
            returning: match self.key {
                Some(_) => None,
                None => Some(self.id_column.clone()),
            },
        }
        .into()
    }

    /// Child row inserts, given the key the parent row was stored under.
    pub fn child_statements(&self, key: &Value) -> Result<Vec<Statement>> {
        let mut statements = vec![];

        for child in &self.children {
            let mut parent = vec![];
            for column in &child.join.from_columns {
                let value = if *column == self.id_column {
                    Expr::Value(key.clone())
                } else {
                    match self.row.get(column) {
                        Some(value) => value.clone(),
                        None => {
                            return Err(Error::unsupported_feature(format!(
                                "child rows of `{}` join on `{column}`, which is not written",
                                child.join.to_table
                            )))
                        }
                    }
                };
                parent.push(value);
            }

            for row in &child.rows {
                let mut columns: Vec<String> = child.join.to_columns.clone();
                let mut values = parent.clone();
                columns.extend(row.keys().cloned());
                values.extend(row.values().cloned());

                statements.push(
                    Insert {
                        table: TableRef::new(&child.join.to_table),
                        columns,
                        values,
                        returning: None,
                    }
                    .into(),
                );
            }
        }

        Ok(statements)
    }
}

/// Generates mutation statements for one backend.
#[derive(Debug, Clone, Copy)]
pub struct MutationPlanner<'a> {
    translator: &'a Translator<'a>,
    capability: &'a Capability,
}

impl<'a> MutationPlanner<'a> {
    pub fn new(translator: &'a Translator<'a>, capability: &'a Capability) -> Self {
        Self {
            translator,
            capability,
        }
    }

    fn schema(&self) -> &'a MappedSchema {
        self.translator.schema()
    }

    pub fn insert(&self, feature: &Feature) -> Result<InsertRows> {
        let ty = self.schema().feature_type(&feature.type_name).ok_or_else(|| {
            Error::invalid_filter(format!("unknown feature type `{}`", feature.type_name))
        })?;

        let mut row = RowValues::new();

        let key = match &ty.id.generator {
            IdGenerator::Client => {
                let Some(key) = ty.id.key(&feature.id).filter(|key| !key.is_empty()) else {
                    bail!(
                        "feature id `{}` does not start with the prefix `{}` of `{}`",
                        feature.id,
                        ty.id.prefix,
                        ty.name
                    );
                };
                let key = Value::from(key).cast(ty.id.ty)?;
                row.insert(ty.id.column.clone(), Expr::Value(key.clone()));
                Some(key)
            }
            IdGenerator::AutoIncrement => {
                if !self.capability.returning {
                    return Err(Error::unsupported_feature(format!(
                        "generated ids need `INSERT ... RETURNING`, which {} does not support",
                        self.capability.dialect
                    )));
                }
                None
            }
            IdGenerator::Sequence(sequence) => {
                if !self.capability.sequences || !self.capability.returning {
                    return Err(Error::unsupported_feature(format!(
                        "sequence id generators are not supported by {}",
                        self.capability.dialect
                    )));
                }
                row.insert(
                    ty.id.column.clone(),
                    Expr::passthrough(format!("nextval('{sequence}')")),
                );
                None
            }
        };

        let mut children = vec![];

        for property in &ty.properties {
            let Some(value) = lookup(&feature.properties, property) else {
                continue;
            };

            match &property.joins[..] {
                [] => self.write(property, value, &mut row)?,
                [join] => children.push(self.child_rows(property, join, value)?),
                _ => {
                    return Err(Error::unsupported_feature(format!(
                        "`{}` is stored across more than one join and cannot be inserted",
                        property.name
                    )))
                }
            }
        }

        Ok(InsertRows {
            table: ty.table.clone(),
            id_column: ty.id.column.clone(),
            id_ty: ty.id.ty,
            id_prefix: ty.id.prefix.clone(),
            key,
            row,
            children,
        })
    }

    fn child_rows(
        &self,
        property: &PropertyMapping,
        join: &TableJoin,
        value: &PropertyValue,
    ) -> Result<ChildRows> {
        let elements = match value {
            PropertyValue::List(elements) => &elements[..],
            value => std::slice::from_ref(value),
        };

        let mut rows = vec![];
        for (index, element) in elements.iter().enumerate() {
            let mut row = RowValues::new();

            if join.numbered_order {
                if let Some(column) = join.order_columns.first() {
                    row.insert(column.name.clone(), Expr::Value(Value::I64(index as i64)));
                }
            }

            self.write(property, element, &mut row)?;
            rows.push(row);
        }

        Ok(ChildRows {
            join: join.clone(),
            rows,
        })
    }

    /// Writes a value of a property stored in the row's own table.
    fn write(
        &self,
        property: &PropertyMapping,
        value: &PropertyValue,
        row: &mut RowValues,
    ) -> Result<()> {
        match (&property.kind, value) {
            (PropertyKind::Compound { properties }, value) => {
                for child in properties {
                    if !child.joins.is_empty() {
                        return Err(Error::unsupported_feature(format!(
                            "`{}` is stored in a joined table and cannot be written with `{}`",
                            child.name, property.name
                        )));
                    }

                    let field = match value {
                        PropertyValue::Record(fields) => lookup(fields, child),
                        PropertyValue::Nil => Some(&PropertyValue::Nil),
                        _ => return Err(mismatch(property, value)),
                    };

                    if let Some(field) = field {
                        self.write(child, field, row)?;
                    }
                }
            }
            (PropertyKind::Primitive { expr, .. }, PropertyValue::Nil)
            | (PropertyKind::Geometry { expr, .. }, PropertyValue::Nil) => {
                row.insert(column(property, expr)?, Expr::null());
            }
            (PropertyKind::Primitive { expr, ty }, PropertyValue::Primitive(value)) => {
                row.insert(column(property, expr)?, Expr::Value(value.clone().cast(*ty)?));
            }
            (PropertyKind::Geometry { expr, srid, .. }, PropertyValue::Geometry(geometry)) => {
                let geometry = stored_geometry(property, geometry, *srid)?;
                row.insert(column(property, expr)?, Expr::Value(Value::Geometry(geometry)));
            }
            (PropertyKind::Reference { fk, href, .. }, PropertyValue::Nil) => {
                for expr in fk.iter().chain(href) {
                    row.insert(column(property, expr)?, Expr::null());
                }
            }
            (PropertyKind::Reference { fk, href, target }, PropertyValue::Reference(reference)) => {
                match &reference.handle {
                    ReferenceHandle::Local { fid, .. } => {
                        if let Some(fk) = fk {
                            let prefix = target
                                .as_ref()
                                .and_then(|target| self.schema().feature_type(target))
                                .map(|target| target.id.prefix.as_str())
                                .unwrap_or_default();
                            let key = fid.strip_prefix(prefix).unwrap_or(fid);
                            row.insert(column(property, fk)?, Expr::Value(Value::from(key)));
                        }
                        if let Some(href) = href {
                            row.insert(column(property, href)?, Expr::Value(format!("#{fid}").into()));
                        }
                    }
                    ReferenceHandle::External { href: link } => {
                        let Some(href) = href else {
                            return Err(Error::unsupported_feature(format!(
                                "`{}` has no href column to store the external reference `{link}`",
                                property.name
                            )));
                        };
                        if let Some(fk) = fk {
                            row.insert(column(property, fk)?, Expr::null());
                        }
                        row.insert(column(property, href)?, Expr::Value(link.as_str().into()));
                    }
                }
            }
            (_, value) => return Err(mismatch(property, value)),
        }

        Ok(())
    }

    pub fn update(&self, update: &FeatureUpdate) -> Result<Statement> {
        let ty = self.schema().feature_type_by_name(&update.type_name)?;

        let mut row = RowValues::new();
        for (path, value) in &update.replace {
            let resolved = ty.resolve(path)?;
            if !resolved.is_direct() || !resolved.ancestors.is_empty() {
                return Err(Error::unsupported_feature(format!(
                    "`{path}` is not a top-level property of the primary table and cannot be replaced"
                )));
            }
            self.write(resolved.property, value, &mut row)?;
        }

        if row.is_empty() {
            bail!("update of `{}` replaces no properties", update.fid);
        }

        let mut filter = Filter::ResourceIds(vec![update.fid.clone()]);
        if let Some(guard) = &update.guard {
            filter = Filter::and([filter, guard.clone()]);
        }

        Ok(Update {
            table: TableRef::new(&ty.table),
            assignments: row
                .into_iter()
                .map(|(column, value)| Assignment { column, value })
                .collect(),
            filter: Some(self.row_filter(ty, &filter)?),
        }
        .into())
    }

    /// Deletes the matching features along with the child rows of their
    /// single-join properties, children first.
    pub fn delete(&self, type_name: &str, filter: &Filter) -> Result<Vec<Statement>> {
        let ty = self.schema().feature_type_by_name(type_name)?;
        let mut statements = vec![];

        for property in &ty.properties {
            let [join] = &property.joins[..] else {
                continue;
            };

            let ([from], [to]) = (&join.from_columns[..], &join.to_columns[..]) else {
                return Err(Error::unsupported_feature(format!(
                    "child rows of `{}` join on more than one column and cannot be deleted",
                    property.name
                )));
            };

            let (joins, expr) = self.translator.filter(ty, filter)?;
            let mut parents = Select::new(
                TableRef::aliased(&ty.table, FILTER_BASE),
                vec![Expr::qualified_column(FILTER_BASE, from)],
            );
            parents.source.joins = joins.iter().map(|join| join.to_join()).collect();
            parents.add_filter(expr);

            statements.push(
                Delete {
                    from: TableRef::new(&join.to_table),
                    filter: Some(Expr::in_subquery(Expr::column(to), parents)),
                }
                .into(),
            );
        }

        statements.push(
            Delete {
                from: TableRef::new(&ty.table),
                filter: Some(self.row_filter(ty, filter)?),
            }
            .into(),
        );

        Ok(statements)
    }

    /// Selects the keys of the features a delete would remove, when `filter`
    /// reaches into joined tables. The child rows such a filter reads are
    /// deleted before the features themselves, so the keys have to be known
    /// up front.
    pub fn delete_keys(&self, type_name: &str, filter: &Filter) -> Result<Option<Statement>> {
        let ty = self.schema().feature_type_by_name(type_name)?;
        let (joins, expr) = self.translator.filter(ty, filter)?;

        if joins.is_empty() {
            return Ok(None);
        }

        Ok(Some(id_select(ty, &joins, expr).into()))
    }

    /// A filter on rows of the primary table, outside of any `SELECT`.
    fn row_filter(&self, ty: &FeatureTypeMapping, filter: &Filter) -> Result<Expr> {
        let (joins, mut expr) = self.translator.filter(ty, filter)?;

        if joins.is_empty() {
            expr.for_each_column_mut(&mut |column| {
                if column.table.as_deref() == Some(FILTER_BASE) {
                    column.table = None;
                }
            });
            return Ok(expr);
        }

        Ok(Expr::in_subquery(
            Expr::column(&ty.id.column),
            id_select(ty, &joins, expr),
        ))
    }
}

fn id_select(ty: &FeatureTypeMapping, joins: &[PlannedJoin], filter: Expr) -> Select {
    let mut ids = Select::new(
        TableRef::aliased(&ty.table, FILTER_BASE),
        vec![Expr::qualified_column(FILTER_BASE, &ty.id.column)],
    );
    ids.source.joins = joins.iter().map(PlannedJoin::to_join).collect();
    ids.distinct = true;
    ids.add_filter(filter);
    ids
}

fn lookup<'v>(
    values: &'v IndexMap<QName, PropertyValue>,
    property: &PropertyMapping,
) -> Option<&'v PropertyValue> {
    values
        .iter()
        .find(|(name, _)| name.matches(&property.name))
        .map(|(_, value)| value)
}

/// The plain column a writable property maps to.
fn column(property: &PropertyMapping, expr: &Expr) -> Result<String> {
    match expr.as_column() {
        Some(column) => Ok(column.column.clone()),
        None => Err(Error::unsupported_feature(format!(
            "`{}` is mapped to the expression `{expr}` and cannot be written",
            property.name
        ))),
    }
}

fn stored_geometry(
    property: &PropertyMapping,
    geometry: &Geometry,
    stored: Option<Srid>,
) -> Result<Geometry> {
    match (geometry.srid, stored) {
        (Some(given), Some(stored)) if given != stored => Err(Error::unsupported_feature(format!(
            "`{}` is stored in {stored}; cannot write a geometry in {given}",
            property.name
        ))),
        (_, stored) => Ok(geometry.clone().with_srid(geometry.srid.or(stored))),
    }
}

fn mismatch(property: &PropertyMapping, value: &PropertyValue) -> Error {
    let given = match value {
        PropertyValue::Nil => "nil",
        PropertyValue::Primitive(_) => "primitive",
        PropertyValue::Geometry(_) => "geometry",
        PropertyValue::Reference(_) => "reference",
        PropertyValue::Record(_) => "record",
        PropertyValue::List(_) => "list",
    };

    Error::invalid_filter(format!(
        "`{}` is a {} property; got a {given} value",
        property.name,
        property.kind_name()
    ))
}
