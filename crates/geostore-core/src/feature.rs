//! Materialized features.

mod property_value;
pub use property_value::PropertyValue;

mod reference;
pub use reference::{Reference, ReferenceHandle, ReferenceState};

use crate::schema::QName;

use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Feature id, including the type's id prefix
    pub id: String,

    pub type_name: QName,

    /// Properties in projection order. Properties without a value are
    /// omitted unless they are nillable and explicitly null.
    pub properties: IndexMap<QName, PropertyValue>,
}

impl Feature {
    pub fn new(id: impl Into<String>, type_name: QName) -> Self {
        Self {
            id: id.into(),
            type_name,
            properties: IndexMap::new(),
        }
    }

    /// Looks up a property by (leniently matched) name.
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        let name = QName::parse(name);
        self.properties
            .iter()
            .find(|(key, _)| key.matches(&name))
            .map(|(_, value)| value)
    }

    /// Visits every reference in the feature, including nested ones.
    pub fn references_mut(&mut self) -> impl Iterator<Item = &mut Reference> {
        let mut out = vec![];
        for value in self.properties.values_mut() {
            value.collect_references(&mut out);
        }
        out.into_iter()
    }
}

/// The target of a resolved reference.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    /// A feature from this store
    Feature(Feature),

    /// A document fetched from outside the store, as returned by the fetcher
    External { href: String, bytes: Vec<u8> },
}

impl Object {
    pub fn as_feature(&self) -> Option<&Feature> {
        match self {
            Object::Feature(feature) => Some(feature),
            Object::External { .. } => None,
        }
    }
}
