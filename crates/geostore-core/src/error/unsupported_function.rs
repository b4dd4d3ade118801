use super::Error;

/// Error when a function call has no provider, or no provider for the dialect.
#[derive(Debug)]
pub(super) struct UnsupportedFunction {
    name: Box<str>,
    dialect: Option<Box<str>>,
}

impl std::error::Error for UnsupportedFunction {}

impl core::fmt::Display for UnsupportedFunction {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "unsupported function: `{}`", self.name)?;
        if let Some(dialect) = &self.dialect {
            write!(f, " is not available for dialect {dialect}")?;
        }
        Ok(())
    }
}

impl Error {
    /// Creates an unsupported function error.
    ///
    /// `dialect` is `Some` when a provider exists but does not support the
    /// requested dialect, and `None` when no provider is registered.
    pub fn unsupported_function(name: impl Into<String>, dialect: Option<&str>) -> Error {
        Error::from(super::ErrorKind::UnsupportedFunction(UnsupportedFunction {
            name: name.into().into(),
            dialect: dialect.map(Into::into),
        }))
    }

    /// Returns `true` if this error is an unsupported function error.
    pub fn is_unsupported_function(&self) -> bool {
        self.any(|kind| matches!(kind, super::ErrorKind::UnsupportedFunction(_)))
    }
}
