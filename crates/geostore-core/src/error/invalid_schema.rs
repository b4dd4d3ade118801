use super::Error;

/// Error when a mapping configuration is invalid.
///
/// This occurs when:
/// - Two sibling property mappings declare the same name (ambiguous mapping)
/// - A table join is malformed (empty or unequal column lists)
/// - Occurrence bounds are inconsistent (`min_occurs > max_occurs`)
/// - Two feature types share a name
///
/// These errors are detected while building the mapped schema and are fatal
/// to store startup.
#[derive(Debug)]
pub(super) struct InvalidSchema {
    message: Box<str>,
}

impl std::error::Error for InvalidSchema {}

impl core::fmt::Display for InvalidSchema {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid schema: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid schema error.
    pub fn invalid_schema(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidSchema(InvalidSchema {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid schema error.
    pub fn is_invalid_schema(&self) -> bool {
        self.any(|kind| matches!(kind, super::ErrorKind::InvalidSchema(_)))
    }
}
