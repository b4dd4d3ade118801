use super::{joins::JoinAliases, joins::JoinSet, owning_table, qualify, Translator};
use crate::{
    engine::{
        plan::{ElementOrder, ProjectedColumn, ProjectedKind, ProjectedProperty},
        PlannedJoin,
    },
    Result,
};

use geostore_core::{
    schema::{
        FeatureTypeMapping, OrderColumn, PropertyKind, PropertyMapping, PropertyPath, TableJoin,
    },
    stmt::{Expr, OrderByExpr, Type},
    Error, MappedSchema,
};

pub(super) struct Projection {
    pub(super) columns: Vec<ProjectedColumn>,
    pub(super) properties: Vec<ProjectedProperty>,
    pub(super) joins: Vec<PlannedJoin>,
    pub(super) order_by: Vec<OrderByExpr>,
}

pub(super) fn build<'a>(
    translator: &Translator<'a>,
    ty: &'a FeatureTypeMapping,
    paths: &[PropertyPath],
) -> Result<Projection> {
    // A requested path selects the whole top-level property it starts at
    let mut requested = vec![];
    for path in paths {
        requested.push(ty.resolve(path)?.root());
    }

    let selected: Vec<&PropertyMapping> = ty
        .properties
        .iter()
        .filter(|property| {
            requested.is_empty() || requested.iter().any(|r| std::ptr::eq(*r, *property))
        })
        .collect();

    let mut joins = JoinSet::default();
    for property in &selected {
        collect_joins(property, &mut vec![], &mut joins);
    }

    let aliases = joins.assign("X");
    let id = Expr::qualified_column(aliases.base(), &ty.id.column);

    let mut cx = Build {
        schema: translator.schema,
        row_identity: translator.row_identity,
        ty,
        aliases,
        columns: vec![ProjectedColumn {
            expr: id.clone(),
            ty: ty.id.ty,
        }],
    };

    let properties = selected
        .iter()
        .map(|property| cx.property(property, &[]))
        .collect::<Result<Vec<_>>>()?;

    let mut order_by = vec![OrderByExpr::asc(id)];

    for planned in cx.aliases.joins() {
        for column in &planned.join.order_columns {
            order_by.push(order_by_column(&planned.alias, column));
        }
    }

    Ok(Projection {
        columns: cx.columns,
        properties,
        joins: cx.aliases.into_joins(),
        order_by,
    })
}

fn collect_joins<'a>(
    property: &'a PropertyMapping,
    chain: &mut Vec<&'a TableJoin>,
    joins: &mut JoinSet,
) {
    let depth = chain.len();
    chain.extend(property.joins.iter());

    if !property.joins.is_empty() {
        joins.add(chain);
    }

    for child in property.children() {
        collect_joins(child, chain, joins);
    }

    chain.truncate(depth);
}

fn order_by_column(alias: &str, column: &OrderColumn) -> OrderByExpr {
    let expr = Expr::qualified_column(alias, &column.name);
    if column.descending {
        OrderByExpr::desc(expr)
    } else {
        OrderByExpr::asc(expr)
    }
}

struct Build<'a> {
    schema: &'a MappedSchema,
    row_identity: Option<&'a str>,
    ty: &'a FeatureTypeMapping,
    aliases: JoinAliases,
    columns: Vec<ProjectedColumn>,
}

impl<'a> Build<'a> {
    fn push(&mut self, expr: Expr, ty: Type) -> usize {
        self.columns.push(ProjectedColumn { expr, ty });
        self.columns.len() - 1
    }

    fn property(
        &mut self,
        property: &'a PropertyMapping,
        parent: &[&'a TableJoin],
    ) -> Result<ProjectedProperty> {
        let mut chain = parent.to_vec();
        chain.extend(property.joins.iter());

        let alias = self.aliases.alias(&chain)?.to_string();
        let owner = owning_table(self.ty, &chain);
        let first = self.columns.len();

        let kind = match &property.kind {
            PropertyKind::Primitive { expr, ty } => ProjectedKind::Primitive {
                column: self.push(qualify(expr, owner, &alias), *ty),
                ty: *ty,
            },
            PropertyKind::Geometry { expr, srid, .. } => ProjectedKind::Geometry {
                column: self.push(
                    Expr::func("as_binary", vec![qualify(expr, owner, &alias)]),
                    Type::Bytes,
                ),
                srid: *srid,
            },
            PropertyKind::Reference { fk, href, target } => {
                let fk = fk
                    .as_ref()
                    .map(|fk| self.push(qualify(fk, owner, &alias), Type::String));
                let href = href
                    .as_ref()
                    .map(|href| self.push(qualify(href, owner, &alias), Type::String));
                let prefix = target
                    .as_ref()
                    .and_then(|target| self.schema.feature_type(target))
                    .map(|target| target.id.prefix.clone())
                    .unwrap_or_default();

                ProjectedKind::Reference {
                    fk,
                    href,
                    target: target.clone(),
                    prefix,
                }
            }
            PropertyKind::Compound { properties } => ProjectedKind::Record(
                properties
                    .iter()
                    .map(|child| self.property(child, &chain))
                    .collect::<Result<_>>()?,
            ),
        };

        let joined = !property.joins.is_empty();
        let mut order = ElementOrder::Arrival;
        let mut key = vec![];

        match property.joins.last() {
            Some(join) if join.is_ordered() => {
                let ty = if join.numbered_order {
                    order = ElementOrder::Numbered;
                    Type::I64
                } else {
                    Type::String
                };
                for column in &join.order_columns {
                    key.push(self.push(Expr::qualified_column(&alias, &column.name), ty));
                }
            }
            Some(join) => self.row_key(property, join, &alias, &mut key)?,
            None => {}
        }

        Ok(ProjectedProperty {
            name: property.name.clone(),
            multi: property.is_multi_valued(),
            nillable: property.nillable,
            joined,
            key,
            order,
            columns: (first..self.columns.len()).collect(),
            kind,
        })
    }

    /// Identifies the rows of an unordered join, so that equal values from
    /// distinct rows stay distinct elements.
    fn row_key(
        &mut self,
        property: &PropertyMapping,
        join: &TableJoin,
        alias: &str,
        key: &mut Vec<usize>,
    ) -> Result<()> {
        if !join.key_columns.is_empty() {
            for column in &join.key_columns {
                key.push(self.push(Expr::qualified_column(alias, column), Type::String));
            }
            return Ok(());
        }

        let Some(column) = self.row_identity else {
            return Err(Error::unsupported_feature(format!(
                "property `{}` of `{}` is mapped through the unordered join `{join}`; \
                 the backend has no row identity, declare key columns on the join",
                property.name, self.ty.name
            )));
        };

        key.push(self.push(
            Expr::func("row_identity", vec![Expr::qualified_column(alias, column)]),
            Type::String,
        ));
        Ok(())
    }
}
