use crate::stmt::Type;

#[derive(Debug, Clone, PartialEq)]
pub struct IdMapping {
    /// Prepended to the stored key to form the feature id
    pub prefix: String,

    pub column: String,

    /// Type of the key column
    pub ty: Type,

    pub generator: IdGenerator,
}

/// How new ids are produced on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdGenerator {
    /// The caller supplies the id
    Client,

    /// The backend assigns the key (auto-increment / identity column)
    AutoIncrement,

    /// The key is drawn from the named backend sequence
    Sequence(String),
}

impl IdMapping {
    /// Builds the feature id for a stored key.
    pub fn fid(&self, key: &str) -> String {
        format!("{}{key}", self.prefix)
    }

    /// Strips the prefix from a feature id, returning the stored key.
    pub fn key<'a>(&self, fid: &'a str) -> Option<&'a str> {
        fid.strip_prefix(self.prefix.as_str())
    }
}
