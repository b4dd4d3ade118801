use super::Type;
use crate::{Error, Geometry, Result};

use std::cmp::Ordering;

/// A scalar value read from or bound to the backend.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum Value {
    /// Boolean value
    Bool(bool),

    /// Signed 64-bit integer
    I64(i64),

    /// Double precision floating point
    F64(f64),

    /// String value
    String(String),

    /// Raw bytes, e.g. a well-known binary geometry
    Bytes(Vec<u8>),

    /// Civil date-time without a time zone
    DateTime(jiff::civil::DateTime),

    /// A geometry literal. The serializer binds it as WKB wrapped in the
    /// dialect's geometry constructor.
    Geometry(Geometry),

    /// Null value
    #[default]
    Null,
}

impl Value {
    pub const fn null() -> Self {
        Self::Null
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::I64(v) => Some(v),
            _ => None,
        }
    }

    pub fn to_i64(&self) -> Result<i64> {
        match self {
            Self::I64(v) => Ok(*v),
            Self::F64(v) if v.fract() == 0.0 => Ok(*v as i64),
            Self::String(v) => v
                .trim()
                .parse()
                .map_err(|_| Error::type_conversion(self, "i64")),
            _ => Err(Error::type_conversion(self, "i64")),
        }
    }

    pub fn to_f64(&self) -> Result<f64> {
        match self {
            Self::I64(v) => Ok(*v as f64),
            Self::F64(v) => Ok(*v),
            Self::String(v) => v
                .trim()
                .parse()
                .map_err(|_| Error::type_conversion(self, "f64")),
            _ => Err(Error::type_conversion(self, "f64")),
        }
    }

    /// Converts the value to `ty`, parsing text where needed. Null stays
    /// null.
    pub fn cast(self, ty: Type) -> Result<Value> {
        let ret = match (ty, self) {
            (_, Self::Null) => Self::Null,
            (Type::Bool, Self::Bool(v)) => Self::Bool(v),
            (Type::Bool, Self::I64(v)) => Self::Bool(v != 0),
            (Type::Bool, Self::String(v)) => match v.trim() {
                "true" | "1" => Self::Bool(true),
                "false" | "0" => Self::Bool(false),
                _ => return Err(Error::type_conversion(&Self::String(v), ty.name())),
            },
            (Type::I64, Self::Bool(v)) => Self::I64(v.into()),
            (Type::I64, value) => Self::I64(value.to_i64()?),
            (Type::F64, value) => Self::F64(value.to_f64()?),
            (Type::String, Self::String(v)) => Self::String(v),
            (Type::String, value) => match value.to_text() {
                Some(text) => Self::String(text),
                None => return Err(Error::type_conversion(&value, ty.name())),
            },
            (Type::Bytes, Self::Bytes(v)) => Self::Bytes(v),
            (Type::Bytes, Self::Geometry(v)) => Self::Bytes(v.to_wkb()),
            (Type::DateTime, Self::DateTime(v)) => Self::DateTime(v),
            (Type::DateTime, Self::String(v)) => match parse_datetime(&v) {
                Some(dt) => Self::DateTime(dt),
                None => return Err(Error::type_conversion(&Self::String(v), ty.name())),
            },
            (_, value) => return Err(Error::type_conversion(&value, ty.name())),
        };
        Ok(ret)
    }

    /// Name of the variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "Bool",
            Self::I64(_) => "I64",
            Self::F64(_) => "F64",
            Self::String(_) => "String",
            Self::Bytes(_) => "Bytes",
            Self::DateTime(_) => "DateTime",
            Self::Geometry(_) => "Geometry",
            Self::Null => "Null",
        }
    }

    /// Renders the value as plain text, the way it would appear as an id or
    /// key suffix.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Bool(v) => Some(v.to_string()),
            Self::I64(v) => Some(v.to_string()),
            Self::F64(v) => Some(v.to_string()),
            Self::String(v) => Some(v.clone()),
            Self::DateTime(v) => Some(v.to_string()),
            _ => None,
        }
    }

    /// Total order used when sorting multi-valued elements by their order
    /// columns. Nulls sort last; values of different kinds compare by kind.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        use Value::*;

        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Null, _) => Ordering::Greater,
            (_, Null) => Ordering::Less,
            (I64(a), I64(b)) => a.cmp(b),
            (I64(a), F64(b)) => (*a as f64).total_cmp(b),
            (F64(a), I64(b)) => a.total_cmp(&(*b as f64)),
            (F64(a), F64(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            (Bool(a), Bool(b)) => a.cmp(b),
            (DateTime(a), DateTime(b)) => a.cmp(b),
            (Bytes(a), Bytes(b)) => a.cmp(b),
            (a, b) => a.kind_name().cmp(b.kind_name()),
        }
    }
}

/// Accepts a full civil date-time or a bare date (midnight).
fn parse_datetime(src: &str) -> Option<jiff::civil::DateTime> {
    let src = src.trim();
    src.parse::<jiff::civil::DateTime>().ok().or_else(|| {
        src.parse::<jiff::civil::Date>()
            .ok()
            .map(|date| date.to_datetime(jiff::civil::Time::midnight()))
    })
}

impl From<bool> for Value {
    fn from(src: bool) -> Self {
        Self::Bool(src)
    }
}

impl From<i64> for Value {
    fn from(src: i64) -> Self {
        Self::I64(src)
    }
}

impl From<i32> for Value {
    fn from(src: i32) -> Self {
        Self::I64(src.into())
    }
}

impl From<f64> for Value {
    fn from(src: f64) -> Self {
        Self::F64(src)
    }
}

impl From<String> for Value {
    fn from(src: String) -> Self {
        Self::String(src)
    }
}

impl From<&str> for Value {
    fn from(src: &str) -> Self {
        Self::String(src.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(src: Vec<u8>) -> Self {
        Self::Bytes(src)
    }
}

impl From<jiff::civil::DateTime> for Value {
    fn from(src: jiff::civil::DateTime) -> Self {
        Self::DateTime(src)
    }
}

impl From<Geometry> for Value {
    fn from(src: Geometry) -> Self {
        Self::Geometry(src)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(src: Option<T>) -> Self {
        match src {
            Some(value) => value.into(),
            None => Self::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_i64_accepts_integral_text() {
        assert_eq!(Value::from(" 42 ").to_i64().unwrap(), 42);
        assert_eq!(Value::F64(3.0).to_i64().unwrap(), 3);
        assert!(Value::F64(3.5).to_i64().is_err());
        assert!(Value::from("x").to_i64().unwrap_err().is_type_conversion());
    }

    #[test]
    fn cast_parses_text() {
        assert_eq!(Value::from("7").cast(Type::I64).unwrap(), Value::I64(7));
        assert_eq!(Value::I64(1).cast(Type::Bool).unwrap(), Value::Bool(true));
        assert_eq!(Value::I64(7).cast(Type::String).unwrap(), Value::from("7"));
        assert_eq!(
            Value::from("2024-03-01").cast(Type::DateTime).unwrap(),
            Value::DateTime(jiff::civil::date(2024, 3, 1).at(0, 0, 0, 0))
        );
        assert_eq!(Value::Null.cast(Type::F64).unwrap(), Value::Null);
        assert!(Value::Bytes(vec![1]).cast(Type::I64).is_err());
    }

    #[test]
    fn nulls_sort_last() {
        let mut values = vec![Value::Null, Value::I64(2), Value::F64(0.5), Value::I64(1)];
        values.sort_by(Value::sort_cmp);
        assert_eq!(
            values,
            vec![Value::F64(0.5), Value::I64(1), Value::I64(2), Value::Null]
        );
    }
}
