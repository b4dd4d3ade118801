use super::{Formatter, Params, ToSql};

use geostore_core::{
    stmt::{Expr, Value},
    Result,
};

impl ToSql for &Value {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        match self {
            // Geometries are bound as WKB and converted by the backend
            Value::Geometry(geometry) => {
                let mut args = vec![Expr::Value(Value::Bytes(geometry.to_wkb()))];
                if let Some(srid) = geometry.srid {
                    args.push(Expr::Value(Value::I64(srid.0.into())));
                }
                let call = Expr::func("geom_from_wkb", args);
                fmt!(f, &call);
            }
            value => {
                let placeholder = f.params.push(value);
                fmt!(f, placeholder);
            }
        }

        Ok(())
    }
}
