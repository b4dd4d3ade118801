use super::{joins::JoinAliases, joins::JoinSet, owning_table, qualify, Translator};
use crate::{engine::PlannedJoin, Result};

use geostore_core::{
    fid,
    filter::{Comparison, Operand, Spatial},
    geometry::Srid,
    schema::{FeatureTypeMapping, PropertyKind},
    stmt::{Expr, Type, Value},
    Error, Filter, Geometry,
};

/// SQL escape character used for every rendered `LIKE`
const LIKE_ESCAPE: char = '\\';

pub(super) fn lower(
    translator: &Translator<'_>,
    ty: &FeatureTypeMapping,
    filter: &Filter,
) -> Result<(Vec<PlannedJoin>, Expr)> {
    // First pass: every path the filter touches, so joins can be aliased
    // before any expression is built.
    let mut joins = JoinSet::default();
    let mut resolved = Ok(());

    filter.for_each_path(&mut |path| {
        if resolved.is_err() {
            return;
        }
        match ty.resolve(path) {
            Ok(path) => joins.add(&path.joins),
            Err(err) => resolved = Err(err),
        }
    });
    resolved?;

    let cx = Lower {
        translator,
        ty,
        aliases: joins.assign("F"),
    };

    let expr = cx.filter(filter)?;
    Ok((cx.aliases.into_joins(), expr))
}

struct Lower<'a> {
    translator: &'a Translator<'a>,
    ty: &'a FeatureTypeMapping,
    aliases: JoinAliases,
}

/// A lowered operand, with the column type when it is a primitive property.
struct Lowered {
    expr: Expr,
    ty: Option<Type>,
}

impl Lower<'_> {
    fn filter(&self, filter: &Filter) -> Result<Expr> {
        match filter {
            Filter::And(filters) => Ok(Expr::and_from_vec(self.filters(filters)?)),
            Filter::Or(filters) => Ok(Expr::or_from_vec(self.filters(filters)?)),
            Filter::Not(filter) => Ok(Expr::not(self.filter(filter)?)),
            Filter::Comparison(cmp) => self.comparison(cmp),
            Filter::Between {
                operand,
                lower,
                upper,
            } => {
                let operand = self.operand(operand)?;
                let lower = coerce(self.operand(lower)?, operand.ty)?;
                let upper = coerce(self.operand(upper)?, operand.ty)?;
                Ok(Expr::between(operand.expr, lower, upper))
            }
            Filter::Like {
                operand,
                pattern,
                match_case,
            } => {
                let operand = self.operand(operand)?.expr;
                let pattern = pattern.to_sql(LIKE_ESCAPE);

                if *match_case {
                    Ok(Expr::like(operand, pattern, LIKE_ESCAPE))
                } else {
                    Ok(Expr::like(
                        Expr::func("lower", vec![operand]),
                        pattern.to_lowercase(),
                        LIKE_ESCAPE,
                    ))
                }
            }
            Filter::IsNull(operand) => Ok(Expr::is_null(self.operand(operand)?.expr)),
            Filter::Spatial(spatial) => self.spatial(spatial),
            Filter::ResourceIds(ids) => Ok(self.resource_ids(ids)),
        }
    }

    fn filters(&self, filters: &[Filter]) -> Result<Vec<Expr>> {
        filters.iter().map(|filter| self.filter(filter)).collect()
    }

    fn comparison(&self, cmp: &Comparison) -> Result<Expr> {
        let lhs = self.operand(&cmp.lhs)?;
        let rhs = self.operand(&cmp.rhs)?;

        let (lhs_ty, rhs_ty) = (lhs.ty, rhs.ty);
        let mut lhs = coerce(lhs, rhs_ty)?;
        let mut rhs = coerce(rhs, lhs_ty)?;

        if !cmp.match_case {
            lhs = Expr::func("lower", vec![lhs]);
            rhs = Expr::func("lower", vec![rhs]);
        }

        Ok(Expr::binary_op(lhs, cmp.op.into(), rhs))
    }

    fn operand(&self, operand: &Operand) -> Result<Lowered> {
        match operand {
            Operand::Property(path) => {
                let resolved = self.ty.resolve(path)?;
                let expr = resolved.value_expr().ok_or_else(|| {
                    Error::invalid_filter(format!(
                        "`{path}` is a {} property and has no single value to compare",
                        resolved.property.kind_name()
                    ))
                })?;

                let alias = self.aliases.alias(&resolved.joins)?;
                let ty = match &resolved.property.kind {
                    PropertyKind::Primitive { ty, .. } => Some(*ty),
                    _ => None,
                };

                Ok(Lowered {
                    expr: qualify(expr, owning_table(self.ty, &resolved.joins), alias),
                    ty,
                })
            }
            Operand::Literal(value) => Ok(Lowered {
                expr: Expr::Value(value.clone()),
                ty: None,
            }),
            Operand::Function { name, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.operand(arg).map(|arg| arg.expr))
                    .collect::<Result<_>>()?;
                Ok(Lowered {
                    expr: Expr::func(name.clone(), args),
                    ty: None,
                })
            }
        }
    }

    fn spatial(&self, spatial: &Spatial) -> Result<Expr> {
        let resolved = self.ty.resolve(&spatial.property)?;

        let (expr, srid) = match &resolved.property.kind {
            PropertyKind::Geometry { expr, srid, .. } => (expr, *srid),
            _ => {
                return Err(Error::invalid_filter(format!(
                    "`{}` is a {} property; `{}` needs a geometry",
                    spatial.property,
                    resolved.property.kind_name(),
                    spatial.op.function_name()
                )))
            }
        };

        let alias = self.aliases.alias(&resolved.joins)?;
        let column = qualify(expr, owning_table(self.ty, &resolved.joins), alias);
        let geometry = self.literal_geometry(&spatial.geometry, srid)?;

        let mut args = vec![column, Expr::Value(Value::Geometry(geometry))];

        if spatial.op.takes_distance() {
            let distance = spatial.distance.as_ref().ok_or_else(|| {
                Error::invalid_filter(format!(
                    "`{}` requires a distance",
                    spatial.op.function_name()
                ))
            })?;
            let distance = self.translator.units.to_storage_units(distance, srid)?;
            args.push(Expr::Value(Value::F64(distance)));
        }

        Ok(Expr::func(spatial.op.function_name(), args))
    }

    /// Brings a literal into the spatial reference of the column it is
    /// compared with.
    fn literal_geometry(&self, geometry: &Geometry, stored: Option<Srid>) -> Result<Geometry> {
        match (geometry.srid, stored) {
            (Some(from), Some(to)) if from != to => match self.translator.crs {
                Some(crs) => {
                    tracing::debug!(%from, %to, "transforming geometry literal");
                    crs.transform(geometry, to)
                }
                None => Err(Error::unsupported_feature(format!(
                    "geometry literal in {from} must be transformed to {to}, but no CRS transformer is configured"
                ))),
            },
            (None, Some(to)) => Ok(geometry.clone().with_srid(Some(to))),
            _ => Ok(geometry.clone()),
        }
    }

    fn resource_ids(&self, ids: &[String]) -> Expr {
        let id = &self.ty.id;
        let column = Expr::qualified_column(self.aliases.base(), &id.column);

        let keys = ids
            .iter()
            .filter_map(|requested| {
                let fid = fid::decode(requested).fid;

                // Ids of other feature types can never match
                let key = id.key(&fid)?;

                match Value::from(key).cast(id.ty) {
                    Ok(key) => Some(Expr::Value(key)),
                    Err(_) => {
                        tracing::debug!(fid = %requested, "id does not fit the id column, ignoring");
                        None
                    }
                }
            })
            .collect();

        Expr::in_list(column, keys)
    }
}

/// Casts a literal to the type of the property it is compared with.
fn coerce(operand: Lowered, ty: Option<Type>) -> Result<Expr> {
    match (operand.expr, ty) {
        (Expr::Value(value), Some(ty)) if operand.ty.is_none() => Ok(Expr::Value(value.cast(ty)?)),
        (expr, _) => Ok(expr),
    }
}
