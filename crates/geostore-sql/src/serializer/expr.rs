use super::{Comma, Delimited, Formatter, Params, Period, ToSql};
use crate::function::{Fragment, FunctionCx};

use geostore_core::{
    stmt::{self, Expr},
    Result,
};

impl ToSql for &Expr {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        use stmt::Expr::*;

        match self {
            And(expr) if expr.operands.is_empty() => fmt!(f, "1 = 1"),
            And(expr) => {
                fmt!(f, "(" Delimited(&expr.operands, " AND ") ")");
            }
            Between(expr) => {
                fmt!(f, "(" expr.lower " <= " expr.expr " AND " expr.expr " <= " expr.upper ")");
            }
            BinaryOp(expr) => {
                fmt!(f, expr.lhs " " expr.op.as_sql() " " expr.rhs);
            }
            Column(expr) => {
                let parts = [&expr.schema, &expr.table]
                    .into_iter()
                    .flatten()
                    .chain(Some(&expr.column));
                fmt!(f, Period(parts));
            }
            Count(expr) => match &expr.arg {
                None => fmt!(f, "COUNT(*)"),
                Some(arg) if expr.distinct => fmt!(f, "COUNT(DISTINCT " arg ")"),
                Some(arg) => fmt!(f, "COUNT(" arg ")"),
            },
            Func(func) if func.passthrough => fmt!(f, &func.name),
            Func(func) => {
                let cx = FunctionCx {
                    dialect: f.serializer.dialect(),
                    legacy_spatial: f.serializer.legacy_spatial,
                };
                let template = f
                    .serializer
                    .functions
                    .template(&func.name, func.args.len(), &cx)?;

                for fragment in &template.fragments {
                    match fragment {
                        Fragment::Sql(sql) => fmt!(f, &**sql),
                        Fragment::Arg(i) => match func.args.get(*i) {
                            Some(arg) => fmt!(f, arg),
                            None => {
                                return Err(geostore_core::Error::invalid_filter(format!(
                                    "function `{}` is missing argument {i}",
                                    func.name
                                )))
                            }
                        },
                        Fragment::Args => fmt!(f, Comma(&func.args)),
                    }
                }
            }
            InList(expr) if expr.list.is_empty() => fmt!(f, "1 = 0"),
            InList(expr) => {
                fmt!(f, expr.expr " IN (" Comma(&expr.list) ")");
            }
            InSubquery(expr) => {
                // MySQL rejects LIMIT inside an IN subquery unless it is
                // wrapped in a derived table
                if f.serializer.is_mysql() && expr.query.limit.is_some() {
                    fmt!(f, expr.expr " IN (SELECT * FROM (" expr.query ") AS page)");
                } else {
                    fmt!(f, expr.expr " IN (" expr.query ")");
                }
            }
            IsNull(expr) => {
                if expr.negate {
                    fmt!(f, expr.expr " IS NOT NULL");
                } else {
                    fmt!(f, expr.expr " IS NULL");
                }
            }
            Like(expr) => {
                fmt!(f, expr.expr " LIKE " expr.pattern " ESCAPE '" expr.escape "'");
            }
            Not(expr) => {
                fmt!(f, "NOT (" expr.expr ")");
            }
            Or(expr) if expr.operands.is_empty() => fmt!(f, "1 = 0"),
            Or(expr) => {
                fmt!(f, "(" Delimited(&expr.operands, " OR ") ")");
            }
            Value(value) => value.to_sql(f)?,
        }

        Ok(())
    }
}
