use super::{IdMapping, PropertyMapping, QName};

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTypeMapping {
    pub name: QName,

    /// Primary table
    pub table: String,

    pub id: IdMapping,

    /// Top-level properties. Order is the default projection order.
    pub properties: Vec<PropertyMapping>,
}

impl FeatureTypeMapping {
    pub fn property(&self, name: &QName) -> Option<&PropertyMapping> {
        self.properties.iter().find(|p| p.name.matches(name))
    }
}
