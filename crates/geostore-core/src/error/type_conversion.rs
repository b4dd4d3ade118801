use super::Error;
use crate::stmt::Value;

/// Error when a stored value cannot be converted to the mapped type.
#[derive(Debug)]
pub(super) struct TypeConversionError {
    value: Box<str>,
    to_type: &'static str,
}

impl std::error::Error for TypeConversionError {}

impl core::fmt::Display for TypeConversionError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "cannot convert {} to {}", self.value, self.to_type)
    }
}

impl Error {
    /// Creates a type conversion error.
    pub fn type_conversion(value: &Value, to_type: &'static str) -> Error {
        Error::from(super::ErrorKind::TypeConversion(TypeConversionError {
            value: value.kind_name().into(),
            to_type,
        }))
    }

    /// Creates a type conversion error for a geometry blob that is not valid
    /// well-known binary.
    pub fn invalid_wkb(reason: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::TypeConversion(TypeConversionError {
            value: format!("malformed WKB ({})", reason.into()).into(),
            to_type: "geometry",
        }))
    }

    /// Returns `true` if this error is a type conversion error.
    pub fn is_type_conversion(&self) -> bool {
        self.any(|kind| matches!(kind, super::ErrorKind::TypeConversion(_)))
    }
}
