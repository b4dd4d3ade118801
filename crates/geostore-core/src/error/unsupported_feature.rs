use super::Error;

/// Error when a backend or the engine does not support a requested feature.
///
/// This occurs when:
/// - An id generation strategy is not available for the backend (sequences
///   on SQLite)
/// - A mutation targets a property shape that cannot be written (nested
///   joins more than one level deep)
/// - A predicate operator has no rendering for the dialect
#[derive(Debug)]
pub(super) struct UnsupportedFeature {
    message: Box<str>,
}

impl std::error::Error for UnsupportedFeature {}

impl core::fmt::Display for UnsupportedFeature {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "unsupported feature: {}", self.message)
    }
}

impl Error {
    /// Creates an unsupported feature error.
    pub fn unsupported_feature(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::UnsupportedFeature(UnsupportedFeature {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an unsupported feature error.
    pub fn is_unsupported_feature(&self) -> bool {
        self.any(|kind| matches!(kind, super::ErrorKind::UnsupportedFeature(_)))
    }
}
