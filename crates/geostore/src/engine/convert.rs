//! Particle converters: one column value (or a few) to a property value.

use crate::Result;

use geostore_core::{
    feature::{PropertyValue, Reference, ReferenceHandle},
    geometry::Srid,
    schema::QName,
    stmt::{Type, Value},
    Error, Geometry,
};

pub(crate) fn primitive(value: &Value, ty: Type) -> Result<PropertyValue> {
    match value {
        Value::Null => Ok(PropertyValue::Nil),
        value => Ok(PropertyValue::Primitive(value.clone().cast(ty)?)),
    }
}

/// Decodes a geometry column. The column holds WKB; a driver may also hand
/// back an already decoded geometry.
pub(crate) fn geometry(value: &Value, srid: Option<Srid>) -> Result<PropertyValue> {
    match value {
        Value::Null => Ok(PropertyValue::Nil),
        Value::Bytes(bytes) => Ok(PropertyValue::Geometry(Geometry::from_wkb(bytes, srid)?)),
        Value::Geometry(geometry) => Ok(PropertyValue::Geometry(geometry.clone())),
        value => Err(Error::type_conversion(value, "geometry")),
    }
}

/// Builds an unresolved reference from a foreign key and/or an href.
///
/// The foreign key wins when both are present. An href of the form `#fid`
/// points into this store.
pub(crate) fn reference(
    fk: Option<&Value>,
    href: Option<&Value>,
    target: Option<&QName>,
    prefix: &str,
) -> Result<PropertyValue> {
    if let Some(key) = fk.filter(|key| !key.is_null()) {
        let key = key
            .to_text()
            .ok_or_else(|| Error::type_conversion(key, "string"))?;

        return Ok(PropertyValue::Reference(Reference::unresolved(
            ReferenceHandle::local(target.cloned(), format!("{prefix}{key}")),
        )));
    }

    match href {
        Some(Value::String(href)) => {
            let handle = match href.strip_prefix('#') {
                Some(fid) => ReferenceHandle::local(target.cloned(), fid),
                None => ReferenceHandle::external(href.as_str()),
            };
            Ok(PropertyValue::Reference(Reference::unresolved(handle)))
        }
        None | Some(Value::Null) => Ok(PropertyValue::Nil),
        Some(value) => Err(Error::type_conversion(value, "string")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foreign_keys_carry_the_target_prefix() {
        let target = QName::local("Junction");
        let value = reference(Some(&Value::I64(12)), None, Some(&target), "JCT_").unwrap();

        assert_eq!(
            value.as_reference().unwrap().handle,
            ReferenceHandle::local(Some(target), "JCT_12")
        );
    }

    #[test]
    fn hrefs_are_local_or_external() {
        let local = reference(None, Some(&Value::from("#ROAD_1")), None, "").unwrap();
        assert_eq!(
            local.as_reference().unwrap().handle,
            ReferenceHandle::local(None, "ROAD_1")
        );

        let external = reference(
            Some(&Value::Null),
            Some(&Value::from("http://example.com/roads/7")),
            None,
            "",
        )
        .unwrap();
        assert_eq!(
            external.as_reference().unwrap().handle,
            ReferenceHandle::external("http://example.com/roads/7")
        );

        assert!(reference(None, Some(&Value::Null), None, "").unwrap().is_nil());
    }

    #[test]
    fn geometry_requires_wkb() {
        let point = Geometry::from_wkt("POINT(3 4)", None).unwrap();
        let value = geometry(&Value::Bytes(point.to_wkb()), Some(Srid(4326))).unwrap();

        let decoded = value.as_geometry().unwrap();
        assert_eq!(decoded.value, point.value);
        assert_eq!(decoded.srid, Some(Srid(4326)));

        assert!(geometry(&Value::I64(1), None).unwrap_err().is_type_conversion());
    }
}
