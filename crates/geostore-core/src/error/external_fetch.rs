use super::Error;

/// Error when an out-of-store reference cannot be fetched.
#[derive(Debug)]
pub(super) struct ExternalFetchFailed {
    href: Box<str>,
    reason: Box<str>,
}

impl std::error::Error for ExternalFetchFailed {}

impl core::fmt::Display for ExternalFetchFailed {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "external fetch failed: `{}`: {}", self.href, self.reason)
    }
}

impl Error {
    /// Creates an external fetch error.
    pub fn external_fetch(href: impl Into<String>, reason: impl core::fmt::Display) -> Error {
        Error::from(super::ErrorKind::ExternalFetch(ExternalFetchFailed {
            href: href.into().into(),
            reason: reason.to_string().into(),
        }))
    }

    /// Returns `true` if this error is an external fetch error.
    pub fn is_external_fetch(&self) -> bool {
        self.any(|kind| matches!(kind, super::ErrorKind::ExternalFetch(_)))
    }
}
