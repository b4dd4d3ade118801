//! Store configuration.
//!
//! Both documents are JSON. The store configuration names the backend and
//! tunes the engine; the mapping document describes the feature types, see
//! [`MappingDocument`].

use crate::{query::ResolveMode, Result};

use geostore_core::{
    geometry::Srid,
    schema::{Builder, MappingDocument},
    Error, MappedSchema,
};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Connection URL, e.g. `sqlite::memory:` or `postgresql://host/db`
    pub url: String,

    /// Upper bound on pooled connections
    #[serde(default)]
    pub pool_max_size: Option<usize>,

    /// Upper bound on connections used to resolve references
    #[serde(default)]
    pub lookup_pool_max_size: Option<usize>,

    /// How long a checkout waits for a free connection
    #[serde(default)]
    pub pool_wait_timeout_ms: Option<u64>,

    /// Reference cache capacity, in objects
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Rows buffered ahead of the consumer by streaming drivers
    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,

    /// Forces paging to happen in the engine instead of the backend
    #[serde(default)]
    pub paging: Option<Paging>,

    /// Resolution applied when a query does not choose one
    #[serde(default)]
    pub resolve: ResolveMode,

    /// PostGIS: render spatial predicates without the `ST_` prefix
    #[serde(default)]
    pub legacy_spatial: bool,

    /// Spatial reference assumed for geometry mappings without one
    #[serde(default)]
    pub default_srid: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Paging {
    /// `LIMIT`/`OFFSET` rendered into the query
    Native,

    /// Features are skipped and truncated as they stream
    Client,
}

fn default_cache_capacity() -> usize {
    1024
}

fn default_fetch_size() -> usize {
    256
}

impl StoreConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            pool_max_size: None,
            lookup_pool_max_size: None,
            pool_wait_timeout_ms: None,
            cache_capacity: default_cache_capacity(),
            fetch_size: default_fetch_size(),
            paging: None,
            resolve: ResolveMode::default(),
            legacy_spatial: false,
            default_srid: None,
        }
    }

    pub fn from_json(src: &str) -> Result<Self> {
        let config: StoreConfig = serde_json::from_str(src)
            .map_err(|err| Error::invalid_config(format!("store configuration: {err}")))?;

        if config.cache_capacity == 0 {
            return Err(Error::invalid_config("cache_capacity must be at least 1"));
        }

        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let src = std::fs::read_to_string(path)?;
        Self::from_json(&src)
    }

    /// Parses and verifies a mapping document with this configuration's
    /// defaults.
    pub fn load_mapping(&self, src: &str) -> Result<MappedSchema> {
        let document: MappingDocument = serde_json::from_str(src)
            .map_err(|err| Error::invalid_config(format!("mapping document: {err}")))?;

        let mut builder = Builder::new();
        if let Some(srid) = self.default_srid {
            builder.default_srid(Srid(srid));
        }
        builder.build(&document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = StoreConfig::from_json(r#"{ "url": "sqlite::memory:" }"#).unwrap();
        assert_eq!(config.cache_capacity, 1024);
        assert_eq!(config.fetch_size, 256);
        assert_eq!(config.paging, None);
        assert_eq!(config.resolve, ResolveMode::None);
    }

    #[test]
    fn overrides() {
        let config = StoreConfig::from_json(
            r#"{
                "url": "postgresql://localhost/gis",
                "pool_max_size": 4,
                "lookup_pool_max_size": 2,
                "pool_wait_timeout_ms": 500,
                "paging": "client",
                "resolve": "strict",
                "legacy_spatial": true
            }"#,
        )
        .unwrap();
        assert_eq!(config.pool_max_size, Some(4));
        assert_eq!(config.lookup_pool_max_size, Some(2));
        assert_eq!(config.pool_wait_timeout_ms, Some(500));
        assert_eq!(config.paging, Some(Paging::Client));
        assert_eq!(config.resolve, ResolveMode::Strict);
        assert!(config.legacy_spatial);
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = StoreConfig::from_json(r#"{ "url": "x", "colour": 1 }"#).unwrap_err();
        assert!(err.is_invalid_config());

        let err = StoreConfig::from_json(r#"{ "url": "x", "cache_capacity": 0 }"#).unwrap_err();
        assert!(err.is_invalid_config());
    }
}
