use super::Error;

/// Error when a local reference points at a feature that does not exist.
#[derive(Debug)]
pub(super) struct DanglingReference {
    target: Box<str>,
}

impl std::error::Error for DanglingReference {}

impl core::fmt::Display for DanglingReference {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "dangling reference: `{}`", self.target)
    }
}

impl Error {
    /// Creates a dangling reference error for the given target id or href.
    pub fn dangling_reference(target: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::DanglingReference(DanglingReference {
            target: target.into().into(),
        }))
    }

    /// Returns `true` if this error is a dangling reference error.
    pub fn is_dangling_reference(&self) -> bool {
        self.any(|kind| matches!(kind, super::ErrorKind::DanglingReference(_)))
    }
}
