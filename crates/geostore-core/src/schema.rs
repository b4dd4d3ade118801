//! The mapping model.
//!
//! A [`MappedSchema`] describes how each feature type maps onto tables,
//! columns and joins. It is built once from a [`MappingDocument`] by the
//! [`Builder`], verified, and then shared read-only for the lifetime of the
//! store.

mod builder;
pub use builder::Builder;

pub mod document;
pub use document::MappingDocument;

mod feature_type;
pub use feature_type::FeatureTypeMapping;

mod id;
pub use id::{IdGenerator, IdMapping};

mod join;
pub use join::{OrderColumn, TableJoin};

mod name;
pub use name::QName;

mod path;
pub use path::PropertyPath;

mod property;
pub use property::{PropertyKind, PropertyMapping};

mod resolve;
pub use resolve::ResolvedPath;

mod verify;

use crate::{Error, Result};

use indexmap::IndexMap;

#[derive(Debug, Clone, Default)]
pub struct MappedSchema {
    /// Feature types, in configuration order
    types: IndexMap<QName, FeatureTypeMapping>,

    /// Namespace bindings declared by the configuration, prefix to URI
    prefixes: IndexMap<String, String>,
}

impl MappedSchema {
    pub fn feature_types(&self) -> impl ExactSizeIterator<Item = &FeatureTypeMapping> {
        self.types.values()
    }

    /// Looks up a feature type. Names that carry only a prefix (or nothing)
    /// match leniently, see [`QName::matches`].
    pub fn feature_type(&self, name: &QName) -> Option<&FeatureTypeMapping> {
        let name = self.qualify(name);
        self.types
            .get(&name)
            .or_else(|| self.types.values().find(|ty| ty.name.matches(&name)))
    }

    pub fn feature_type_by_name(&self, name: &str) -> Result<&FeatureTypeMapping> {
        let qname = QName::parse(name);
        self.feature_type(&qname)
            .ok_or_else(|| Error::invalid_filter(format!("unknown feature type `{name}`")))
    }

    /// Finds the feature type whose id prefix starts `fid`. The longest
    /// matching prefix wins, so `ROAD_` and `ROAD_SEGMENT_` can coexist.
    pub fn type_for_fid(&self, fid: &str) -> Option<&FeatureTypeMapping> {
        self.types
            .values()
            .filter(|ty| fid.starts_with(&ty.id.prefix))
            .max_by_key(|ty| ty.id.prefix.len())
    }

    pub fn namespace_for_prefix(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }

    /// Fills in the namespace of a prefixed name from the declared bindings.
    pub fn qualify(&self, name: &QName) -> QName {
        match (&name.namespace, &name.prefix) {
            (None, Some(prefix)) => match self.namespace_for_prefix(prefix) {
                Some(ns) => QName {
                    namespace: Some(ns.to_string()),
                    ..name.clone()
                },
                None => name.clone(),
            },
            _ => name.clone(),
        }
    }

    pub(crate) fn from_parts(
        types: IndexMap<QName, FeatureTypeMapping>,
        prefixes: IndexMap<String, String>,
    ) -> Result<MappedSchema> {
        let schema = MappedSchema { types, prefixes };
        schema.verify()?;
        Ok(schema)
    }
}
