//! Serializable form of the mapping configuration.
//!
//! The document is what operators write; [`Builder`](super::Builder) turns it
//! into a verified [`MappedSchema`](super::MappedSchema).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MappingDocument {
    /// Namespace bindings, prefix to URI
    #[serde(default)]
    pub namespaces: IndexMap<String, String>,

    pub feature_types: Vec<FeatureTypeDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeatureTypeDocument {
    /// `prefix:Local`, `{uri}Local` or `Local`
    pub name: String,

    pub table: String,

    pub id: IdDocument,

    #[serde(default)]
    pub properties: Vec<PropertyDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdDocument {
    pub column: String,

    #[serde(default)]
    pub prefix: String,

    /// Key column type; defaults to `string`
    #[serde(rename = "type", default)]
    pub ty: Option<String>,

    /// `client`, `auto` or `sequence:<name>`; defaults to `auto`
    #[serde(default)]
    pub generator: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKindDocument {
    Primitive,
    Geometry,
    Reference,
    Compound,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertyDocument {
    pub name: String,

    pub kind: PropertyKindDocument,

    /// Mapping expression: the value column, or for references the foreign
    /// key column
    #[serde(default)]
    pub mapping: Option<String>,

    /// Primitive type name
    #[serde(rename = "type", default)]
    pub ty: Option<String>,

    #[serde(default)]
    pub srid: Option<String>,

    /// Coordinate dimension, 2 or 3
    #[serde(default)]
    pub dimension: Option<u8>,

    /// Reference href column
    #[serde(default)]
    pub href: Option<String>,

    /// Referenced feature type; absent for any type
    #[serde(default)]
    pub target: Option<String>,

    #[serde(default)]
    pub joins: Vec<JoinDocument>,

    #[serde(default)]
    pub min_occurs: Option<u32>,

    #[serde(default)]
    pub max_occurs: Option<MaxOccurs>,

    #[serde(default)]
    pub nillable: bool,

    #[serde(default)]
    pub properties: Vec<PropertyDocument>,
}

/// Upper occurrence bound: a number, or the string `unbounded`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MaxOccurs {
    Bounded(u32),
    Keyword(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JoinDocument {
    pub from: String,
    pub to: String,
    pub from_columns: Vec<String>,
    pub to_columns: Vec<String>,

    /// Column names; a trailing `-` sorts descending
    #[serde(default)]
    pub order_columns: Vec<String>,

    #[serde(default)]
    pub numbered_order: bool,

    #[serde(default)]
    pub key_columns: Vec<String>,
}
