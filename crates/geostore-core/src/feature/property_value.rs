use super::Reference;
use crate::{geometry::Geometry, schema::QName, stmt::Value};

use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Explicitly null
    Nil,

    Primitive(Value),

    Geometry(Geometry),

    Reference(Reference),

    /// A structured value built from a compound mapping
    Record(IndexMap<QName, PropertyValue>),

    /// Values of a multi-valued property, in element order
    List(Vec<PropertyValue>),
}

impl PropertyValue {
    pub fn is_nil(&self) -> bool {
        matches!(self, PropertyValue::Nil)
    }

    pub fn as_primitive(&self) -> Option<&Value> {
        match self {
            PropertyValue::Primitive(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_primitive().and_then(Value::as_str)
    }

    pub fn as_geometry(&self) -> Option<&Geometry> {
        match self {
            PropertyValue::Geometry(geometry) => Some(geometry),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            PropertyValue::Reference(reference) => Some(reference),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&IndexMap<QName, PropertyValue>> {
        match self {
            PropertyValue::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[PropertyValue]> {
        match self {
            PropertyValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Looks up a field of a record value by local name.
    pub fn field(&self, local: &str) -> Option<&PropertyValue> {
        self.as_record()?
            .iter()
            .find(|(name, _)| name.local == local)
            .map(|(_, value)| value)
    }

    pub(super) fn collect_references<'a>(&'a mut self, out: &mut Vec<&'a mut Reference>) {
        match self {
            PropertyValue::Reference(reference) => out.push(reference),
            PropertyValue::Record(record) => {
                for value in record.values_mut() {
                    value.collect_references(out);
                }
            }
            PropertyValue::List(items) => {
                for value in items {
                    value.collect_references(out);
                }
            }
            _ => {}
        }
    }
}

impl From<Value> for PropertyValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => PropertyValue::Nil,
            Value::Geometry(geometry) => PropertyValue::Geometry(geometry),
            value => PropertyValue::Primitive(value),
        }
    }
}
