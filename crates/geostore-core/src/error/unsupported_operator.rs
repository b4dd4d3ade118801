use super::Error;

/// Error when a filter operator has no rendering for the target dialect.
#[derive(Debug)]
pub(super) struct UnsupportedOperator {
    operator: Box<str>,
    dialect: Box<str>,
}

impl std::error::Error for UnsupportedOperator {}

impl core::fmt::Display for UnsupportedOperator {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "unsupported operator: `{}` for dialect {}",
            self.operator, self.dialect
        )
    }
}

impl Error {
    /// Creates an unsupported operator error.
    pub fn unsupported_operator(operator: impl Into<String>, dialect: &str) -> Error {
        Error::from(super::ErrorKind::UnsupportedOperator(UnsupportedOperator {
            operator: operator.into().into(),
            dialect: dialect.into(),
        }))
    }

    /// Returns `true` if this error is an unsupported operator error.
    pub fn is_unsupported_operator(&self) -> bool {
        self.any(|kind| matches!(kind, super::ErrorKind::UnsupportedOperator(_)))
    }
}
