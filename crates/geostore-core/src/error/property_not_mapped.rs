use super::Error;

/// Error when a property path does not resolve against a feature type mapping.
#[derive(Debug)]
pub(super) struct PropertyNotMapped {
    feature_type: Box<str>,
    path: Box<str>,
}

impl std::error::Error for PropertyNotMapped {}

impl core::fmt::Display for PropertyNotMapped {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "property not mapped: `{}` on feature type `{}`",
            self.path, self.feature_type
        )
    }
}

impl Error {
    /// Creates a property not mapped error.
    ///
    /// This is a user-facing error: the request referenced a property the
    /// feature type does not declare.
    pub fn property_not_mapped(
        feature_type: impl core::fmt::Display,
        path: impl core::fmt::Display,
    ) -> Error {
        Error::from(super::ErrorKind::PropertyNotMapped(PropertyNotMapped {
            feature_type: feature_type.to_string().into(),
            path: path.to_string().into(),
        }))
    }

    /// Returns `true` if this error is a property not mapped error.
    pub fn is_property_not_mapped(&self) -> bool {
        self.any(|kind| matches!(kind, super::ErrorKind::PropertyNotMapped(_)))
    }
}
