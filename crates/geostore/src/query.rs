use geostore_core::{schema::PropertyPath, Filter};
use serde::Deserialize;

/// A feature query as handed over by the protocol layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Target feature type, `prefix:local`, `{ns}local` or `local`
    pub type_name: String,

    pub filter: Option<Filter>,

    /// Properties to return. Empty returns every top-level property.
    pub properties: Vec<PropertyPath>,

    /// Restricts the result to these feature ids
    pub ids: Vec<String>,

    pub offset: Option<u64>,

    pub limit: Option<u64>,

    /// Reference resolution; `None` uses the store default
    pub resolve: Option<ResolveMode>,
}

/// How reference-typed properties are treated while streaming.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolveMode {
    /// Leave handles unresolved
    #[default]
    None,

    /// Resolve, recording failures on the reference
    Lenient,

    /// Resolve; the first failure ends the stream with an error
    Strict,
}

impl Query {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            filter: None,
            properties: vec![],
            ids: vec![],
            offset: None,
            limit: None,
            resolve: None,
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn property(mut self, path: impl Into<PropertyPath>) -> Self {
        self.properties.push(path.into());
        self
    }

    pub fn ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn resolve(mut self, mode: ResolveMode) -> Self {
        self.resolve = Some(mode);
        self
    }
}
