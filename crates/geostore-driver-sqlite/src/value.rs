use geostore_core::{
    stmt::{Type, Value as CoreValue},
    Error, Result,
};
use rusqlite::{
    types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef},
    Row,
};

#[derive(Debug)]
pub struct Value(CoreValue);

impl From<CoreValue> for Value {
    fn from(value: CoreValue) -> Self {
        Self(value)
    }
}

impl Value {
    pub fn into_inner(self) -> CoreValue {
        self.0
    }

    /// Reads column `index` of `row` and converts it to `ty`.
    ///
    /// SQLite columns are dynamically typed, so the storage class decides
    /// the intermediate value and the cast does the rest.
    pub fn from_sql(row: &Row<'_>, index: usize, ty: Type) -> Result<Self> {
        let value = row
            .get_ref(index)
            .map_err(Error::driver_operation_failed)?;

        let raw = match value {
            ValueRef::Null => CoreValue::Null,
            ValueRef::Integer(value) => CoreValue::I64(value),
            ValueRef::Real(value) => CoreValue::F64(value),
            ValueRef::Text(value) => match std::str::from_utf8(value) {
                Ok(text) => CoreValue::String(text.to_string()),
                Err(err) => return Err(Error::driver_operation_failed(err)),
            },
            ValueRef::Blob(value) => CoreValue::Bytes(value.to_vec()),
        };

        Ok(Value(raw.cast(ty)?))
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let output = match &self.0 {
            CoreValue::Bool(v) => ToSqlOutput::Owned(SqlValue::Integer((*v).into())),
            CoreValue::I64(v) => ToSqlOutput::Owned(SqlValue::Integer(*v)),
            CoreValue::F64(v) => ToSqlOutput::Owned(SqlValue::Real(*v)),
            CoreValue::String(v) => ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes())),
            CoreValue::Bytes(v) => ToSqlOutput::Borrowed(ValueRef::Blob(&v[..])),
            CoreValue::DateTime(v) => ToSqlOutput::Owned(SqlValue::Text(v.to_string())),
            CoreValue::Geometry(v) => ToSqlOutput::Owned(SqlValue::Blob(v.to_wkb())),
            CoreValue::Null => ToSqlOutput::Owned(SqlValue::Null),
        };
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_by_requested_type() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let mut stmt = conn
            .prepare("SELECT 1, '2024-03-01T10:30:00', 2.5, NULL, '42'")
            .unwrap();
        let mut rows = stmt.query([]).unwrap();
        let row = rows.next().unwrap().unwrap();

        let decode = |index, ty| Value::from_sql(row, index, ty).unwrap().into_inner();

        assert_eq!(decode(0, Type::Bool), CoreValue::Bool(true));
        assert!(matches!(decode(1, Type::DateTime), CoreValue::DateTime(_)));
        assert_eq!(decode(2, Type::F64), CoreValue::F64(2.5));
        assert_eq!(decode(3, Type::I64), CoreValue::Null);
        assert_eq!(decode(4, Type::I64), CoreValue::I64(42));
    }
}
