use geostore_core::{
    stmt::{Type as CoreType, Value as CoreValue},
    Error, Result,
};
use jiff::{
    civil::{self, DateTime},
    SignedDuration, Span,
};
use postgres::{
    types::{private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql, Type},
    Column, Row,
};

type BoxError = Box<dyn std::error::Error + Sync + Send>;

/// Origin of PostgreSQL's binary date and timestamp encodings.
const PG_EPOCH: DateTime = civil::date(2000, 1, 1).at(0, 0, 0, 0);

#[derive(Debug)]
pub struct Value(pub(crate) CoreValue);

impl From<CoreValue> for Value {
    fn from(value: CoreValue) -> Self {
        Self(value)
    }
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> std::result::Result<IsNull, BoxError>
    where
        Self: Sized,
    {
        match &self.0 {
            CoreValue::Null => Ok(IsNull::Yes),
            CoreValue::Bool(value) => value.to_sql(ty, out),
            CoreValue::I64(value) => match *ty {
                Type::INT2 => i16::try_from(*value)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*value)?.to_sql(ty, out),
                Type::INT8 => value.to_sql(ty, out),
                Type::FLOAT4 => (*value as f32).to_sql(ty, out),
                Type::FLOAT8 => (*value as f64).to_sql(ty, out),
                _ if is_text(ty) => value.to_string().to_sql(ty, out),
                _ => Err(mismatch(&self.0, ty)),
            },
            CoreValue::F64(value) => match *ty {
                Type::FLOAT4 => (*value as f32).to_sql(ty, out),
                Type::FLOAT8 => value.to_sql(ty, out),
                _ if is_text(ty) => value.to_string().to_sql(ty, out),
                _ => Err(mismatch(&self.0, ty)),
            },
            CoreValue::String(value) => match *ty {
                Type::INT2 => value.trim().parse::<i16>()?.to_sql(ty, out),
                Type::INT4 => value.trim().parse::<i32>()?.to_sql(ty, out),
                Type::INT8 => value.trim().parse::<i64>()?.to_sql(ty, out),
                _ => value.as_str().to_sql(ty, out),
            },
            CoreValue::Bytes(value) => value.as_slice().to_sql(ty, out),
            CoreValue::Geometry(value) => value.to_wkb().as_slice().to_sql(ty, out),
            CoreValue::DateTime(value) => match *ty {
                Type::TIMESTAMP | Type::TIMESTAMPTZ => {
                    let micros = i64::try_from(value.duration_since(PG_EPOCH).as_micros())?;
                    micros.to_sql(&Type::INT8, out)
                }
                Type::DATE => {
                    let days = PG_EPOCH.date().until(value.date())?.get_days();
                    days.to_sql(&Type::INT4, out)
                }
                _ if is_text(ty) => value.to_string().to_sql(ty, out),
                _ => Err(mismatch(&self.0, ty)),
            },
        }
    }

    fn accepts(_: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

fn is_text(ty: &Type) -> bool {
    matches!(*ty, Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME)
}

fn mismatch(value: &CoreValue, ty: &Type) -> BoxError {
    format!("cannot bind {} as `{ty}`", value.kind_name()).into()
}

/// A `timestamp`, `timestamptz` or `date` column read as a civil
/// date-time.
struct Civil(DateTime);

impl<'a> FromSql<'a> for Civil {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> std::result::Result<Self, BoxError> {
        let datetime = match *ty {
            Type::DATE => {
                let days = i32::from_sql(&Type::INT4, raw)?;
                PG_EPOCH.checked_add(Span::new().try_days(days)?)?
            }
            _ => {
                let micros = i64::from_sql(&Type::INT8, raw)?;
                PG_EPOCH.checked_add(SignedDuration::from_micros(micros))?
            }
        };
        Ok(Civil(datetime))
    }

    fn accepts(ty: &Type) -> bool {
        matches!(*ty, Type::DATE | Type::TIMESTAMP | Type::TIMESTAMPTZ)
    }
}

/// Reads column `index` of `row` by its PostgreSQL type, then converts it
/// to `expected`.
pub(crate) fn from_row(row: &Row, index: usize, expected: CoreType) -> Result<CoreValue> {
    let column = &row.columns()[index];
    let value = read(row, index, column).map_err(Error::driver_operation_failed)?;
    value.cast(expected)
}

fn read(
    row: &Row,
    index: usize,
    column: &Column,
) -> std::result::Result<CoreValue, tokio_postgres::Error> {
    let ty = column.type_();

    let value = match *ty {
        Type::BOOL => row.try_get::<_, Option<bool>>(index)?.map(CoreValue::Bool),
        Type::INT2 => row
            .try_get::<_, Option<i16>>(index)?
            .map(|v| CoreValue::I64(v.into())),
        Type::INT4 => row
            .try_get::<_, Option<i32>>(index)?
            .map(|v| CoreValue::I64(v.into())),
        Type::INT8 => row.try_get::<_, Option<i64>>(index)?.map(CoreValue::I64),
        Type::FLOAT4 => row
            .try_get::<_, Option<f32>>(index)?
            .map(|v| CoreValue::F64(v.into())),
        Type::FLOAT8 => row.try_get::<_, Option<f64>>(index)?.map(CoreValue::F64),
        Type::BYTEA => row.try_get::<_, Option<Vec<u8>>>(index)?.map(CoreValue::Bytes),
        Type::DATE | Type::TIMESTAMP | Type::TIMESTAMPTZ => row
            .try_get::<_, Option<Civil>>(index)?
            .map(|v| CoreValue::DateTime(v.0)),
        // Text-like and anything with a text representation the driver accepts
        _ => row.try_get::<_, Option<String>>(index)?.map(CoreValue::String),
    };

    Ok(value.unwrap_or(CoreValue::Null))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binds_integers_to_the_inferred_width() {
        let mut out = BytesMut::new();
        Value(CoreValue::I64(7)).to_sql(&Type::INT4, &mut out).unwrap();
        assert_eq!(&out[..], &7i32.to_be_bytes());

        let mut out = BytesMut::new();
        let err = Value(CoreValue::I64(i64::MAX)).to_sql(&Type::INT2, &mut out);
        assert!(err.is_err());
    }

    #[test]
    fn timestamps_count_from_the_postgres_epoch() {
        let value = civil::date(2000, 1, 2).at(0, 0, 1, 0);
        let mut out = BytesMut::new();
        Value(CoreValue::DateTime(value))
            .to_sql(&Type::TIMESTAMP, &mut out)
            .unwrap();
        assert_eq!(&out[..], &86_401_000_000i64.to_be_bytes());

        let decoded = Civil::from_sql(&Type::TIMESTAMP, &out).unwrap();
        assert_eq!(decoded.0, value);
    }

    #[test]
    fn dates_count_days() {
        let raw = 31i32.to_be_bytes();
        let decoded = Civil::from_sql(&Type::DATE, &raw).unwrap();
        assert_eq!(decoded.0, civil::date(2000, 2, 1).at(0, 0, 0, 0));
    }
}
