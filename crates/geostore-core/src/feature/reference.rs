use super::Object;
use crate::{schema::QName, Error};

use std::{fmt, sync::Arc};

/// A reference-typed property value.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub handle: ReferenceHandle,
    pub state: ReferenceState,
}

impl Reference {
    pub fn unresolved(handle: ReferenceHandle) -> Self {
        Self {
            handle,
            state: ReferenceState::Unresolved,
        }
    }

    pub fn object(&self) -> Option<&Arc<Object>> {
        match &self.state {
            ReferenceState::Resolved(object) => Some(object),
            _ => None,
        }
    }
}

/// Points at another feature, either in this store or elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReferenceHandle {
    /// A feature of this store. `type_name` is `None` when the mapping does
    /// not restrict the referenced type.
    Local {
        type_name: Option<QName>,
        fid: String,
    },

    External { href: String },
}

impl ReferenceHandle {
    pub fn local(type_name: Option<QName>, fid: impl Into<String>) -> Self {
        ReferenceHandle::Local {
            type_name,
            fid: fid.into(),
        }
    }

    pub fn external(href: impl Into<String>) -> Self {
        ReferenceHandle::External { href: href.into() }
    }

    /// Global id the resolver caches the target under.
    pub fn cache_key(&self) -> &str {
        match self {
            ReferenceHandle::Local { fid, .. } => fid,
            ReferenceHandle::External { href } => href,
        }
    }
}

impl fmt::Display for ReferenceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceHandle::Local { fid, .. } => write!(f, "#{fid}"),
            ReferenceHandle::External { href } => f.write_str(href),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub enum ReferenceState {
    #[default]
    Unresolved,
    Resolved(Arc<Object>),

    /// Resolution was attempted and failed; recorded instead of aborting the
    /// result stream.
    Failed(Error),
}

impl ReferenceState {
    pub fn is_unresolved(&self) -> bool {
        matches!(self, ReferenceState::Unresolved)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ReferenceState::Failed(_))
    }
}

impl PartialEq for ReferenceState {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ReferenceState::Unresolved, ReferenceState::Unresolved) => true,
            (ReferenceState::Resolved(a), ReferenceState::Resolved(b)) => a == b,
            (ReferenceState::Failed(a), ReferenceState::Failed(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
