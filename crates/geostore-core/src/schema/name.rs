use std::{fmt, hash};

/// A qualified name.
///
/// Identity is the namespace URI plus local name; the prefix is kept only
/// for display.
#[derive(Debug, Clone, Eq)]
pub struct QName {
    pub namespace: Option<String>,
    pub prefix: Option<String>,
    pub local: String,
}

impl QName {
    pub fn new(namespace: Option<&str>, prefix: Option<&str>, local: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
            prefix: prefix.map(str::to_string),
            local: local.into(),
        }
    }

    pub fn local(local: impl Into<String>) -> Self {
        Self {
            namespace: None,
            prefix: None,
            local: local.into(),
        }
    }

    /// Parses `{uri}local`, `prefix:local` or `local`.
    pub fn parse(src: &str) -> Self {
        let src = src.trim();

        if let Some(rest) = src.strip_prefix('{') {
            if let Some((ns, local)) = rest.split_once('}') {
                return QName::new(Some(ns), None, local);
            }
        }

        match src.split_once(':') {
            Some((prefix, local)) if !prefix.is_empty() && !local.is_empty() => {
                QName::new(None, Some(prefix), local)
            }
            _ => QName::local(src),
        }
    }

    /// Lenient comparison used when resolving names typed by a client:
    /// namespaces are compared when both sides have one, otherwise prefixes
    /// when both sides have one, otherwise only local names.
    pub fn matches(&self, other: &QName) -> bool {
        if self.local != other.local {
            return false;
        }

        match (&self.namespace, &other.namespace) {
            (Some(a), Some(b)) => a == b,
            _ => match (&self.prefix, &other.prefix) {
                (Some(a), Some(b)) => a == b,
                _ => true,
            },
        }
    }
}

impl PartialEq for QName {
    fn eq(&self, other: &Self) -> bool {
        self.namespace == other.namespace && self.local == other.local
    }
}

impl hash::Hash for QName {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.namespace.hash(state);
        self.local.hash(state);
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.prefix, &self.namespace) {
            (Some(prefix), _) => write!(f, "{prefix}:{}", self.local),
            (None, Some(ns)) => write!(f, "{{{ns}}}{}", self.local),
            (None, None) => f.write_str(&self.local),
        }
    }
}

impl From<&str> for QName {
    fn from(src: &str) -> Self {
        QName::parse(src)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_forms() {
        let q = QName::parse("{http://example.com/app}Road");
        assert_eq!(q.namespace.as_deref(), Some("http://example.com/app"));
        assert_eq!(q.local, "Road");

        let q = QName::parse("app:Road");
        assert_eq!(q.prefix.as_deref(), Some("app"));
        assert_eq!(q.to_string(), "app:Road");

        assert_eq!(QName::parse("Road").local, "Road");
    }

    #[test]
    fn lenient_matching() {
        let declared = QName::new(Some("urn:app"), Some("app"), "name");
        assert!(declared.matches(&QName::local("name")));
        assert!(declared.matches(&QName::parse("app:name")));
        assert!(!declared.matches(&QName::parse("other:name")));
        assert!(!declared.matches(&QName::parse("{urn:other}name")));
        assert!(!declared.matches(&QName::local("title")));
    }
}
