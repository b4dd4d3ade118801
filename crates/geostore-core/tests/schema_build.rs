use geostore_core::{
    geometry::Srid,
    schema::{Builder, IdGenerator, MappingDocument, OrderColumn, PropertyKind},
    stmt::{Expr, Type},
};

fn build(json: &str) -> geostore_core::Result<geostore_core::MappedSchema> {
    let document: MappingDocument = serde_json::from_str(json).unwrap();
    Builder::new().build(&document)
}

#[test]
fn builds_all_property_kinds() {
    let schema = build(
        r#"{
            "feature_types": [{
                "name": "Parcel",
                "table": "gis.parcels",
                "id": { "column": "id", "prefix": "P_", "generator": "sequence:parcel_seq" },
                "properties": [
                    { "name": "label", "kind": "primitive", "mapping": "CASE WHEN a > 0 THEN 'x' END" },
                    { "name": "area", "kind": "primitive", "mapping": "area", "type": "double", "nillable": true },
                    { "name": "shape", "kind": "geometry", "mapping": "shape", "srid": "25832", "dimension": 3 },
                    { "name": "owner", "kind": "reference", "mapping": "owner_id", "href": "owner_href", "target": "Person" }
                ]
            }]
        }"#,
    )
    .unwrap();

    let parcel = schema.feature_type_by_name("Parcel").unwrap();
    assert_eq!(parcel.table, "gis.parcels");
    assert_eq!(
        parcel.id.generator,
        IdGenerator::Sequence("parcel_seq".to_string())
    );
    assert_eq!(parcel.id.ty, Type::String);

    let PropertyKind::Primitive { expr, .. } = &parcel.properties[0].kind else {
        panic!("expected primitive");
    };
    assert!(expr.is_passthrough());
    assert_eq!(expr.to_string(), "CASE WHEN a > 0 THEN 'x' END");

    assert!(parcel.properties[1].nillable);

    let PropertyKind::Geometry { srid, .. } = &parcel.properties[2].kind else {
        panic!("expected geometry");
    };
    assert_eq!(*srid, Some(Srid(25832)));

    let PropertyKind::Reference { fk, href, target } = &parcel.properties[3].kind else {
        panic!("expected reference");
    };
    assert_eq!(fk.as_ref().unwrap(), &Expr::column("owner_id"));
    assert_eq!(href.as_ref().unwrap(), &Expr::column("owner_href"));
    assert_eq!(target.as_ref().unwrap().local, "Person");
}

#[test]
fn ambiguous_siblings_are_rejected() {
    let err = build(
        r#"{
            "feature_types": [{
                "name": "Road", "table": "roads", "id": { "column": "id" },
                "properties": [
                    { "name": "name", "kind": "primitive", "mapping": "name" },
                    { "name": "name", "kind": "primitive", "mapping": "alt_name" }
                ]
            }]
        }"#,
    )
    .unwrap_err();

    assert!(err.is_invalid_schema());
    assert!(err.to_string().contains("ambiguous"), "{err}");
}

#[test]
fn malformed_join_is_rejected() {
    let err = build(
        r#"{
            "feature_types": [{
                "name": "Road", "table": "roads", "id": { "column": "id" },
                "properties": [{
                    "name": "lanes", "kind": "primitive", "mapping": "width",
                    "max_occurs": "unbounded",
                    "joins": [{ "from": "roads", "to": "lanes", "from_columns": ["id", "x"], "to_columns": ["road_id"] }]
                }]
            }]
        }"#,
    )
    .unwrap_err();

    assert!(err.is_invalid_schema());
    assert!(err.to_string().contains("malformed join"), "{err}");
}

#[test]
fn order_columns_carry_a_direction() {
    let schema = build(
        r#"{
            "feature_types": [{
                "name": "Road", "table": "roads", "id": { "column": "id" },
                "properties": [{
                    "name": "surveys", "kind": "primitive", "mapping": "note",
                    "max_occurs": "unbounded",
                    "joins": [{
                        "from": "roads", "to": "surveys",
                        "from_columns": ["id"], "to_columns": ["road_id"],
                        "order_columns": ["surveyed_at-", "id"],
                        "key_columns": ["id"]
                    }]
                }]
            }]
        }"#,
    )
    .unwrap();

    let road = schema.feature_type_by_name("Road").unwrap();
    let join = &road.properties[0].joins[0];
    assert_eq!(
        join.order_columns,
        [
            OrderColumn {
                name: "surveyed_at".to_string(),
                descending: true
            },
            OrderColumn::asc("id"),
        ]
    );
    assert_eq!(join.key_columns, ["id"]);
}

#[test]
fn numbered_order_cannot_descend() {
    let err = build(
        r#"{
            "feature_types": [{
                "name": "Road", "table": "roads", "id": { "column": "id" },
                "properties": [{
                    "name": "lanes", "kind": "primitive", "mapping": "kind",
                    "max_occurs": "unbounded",
                    "joins": [{
                        "from": "roads", "to": "lanes",
                        "from_columns": ["id"], "to_columns": ["road_id"],
                        "order_columns": ["seq-"], "numbered_order": true
                    }]
                }]
            }]
        }"#,
    )
    .unwrap_err();

    assert!(err.is_invalid_schema());
    assert!(err.to_string().contains("cannot be descending"), "{err}");
}

#[test]
fn join_must_start_at_owning_table() {
    let err = build(
        r#"{
            "feature_types": [{
                "name": "Road", "table": "roads", "id": { "column": "id" },
                "properties": [{
                    "name": "lanes", "kind": "primitive", "mapping": "width",
                    "max_occurs": 4,
                    "joins": [{ "from": "rivers", "to": "lanes", "from_columns": ["id"], "to_columns": ["road_id"] }]
                }]
            }]
        }"#,
    )
    .unwrap_err();

    assert!(err.is_invalid_schema());
}

#[test]
fn occurrence_bounds_are_checked() {
    let err = build(
        r#"{
            "feature_types": [{
                "name": "Road", "table": "roads", "id": { "column": "id" },
                "properties": [
                    { "name": "name", "kind": "primitive", "mapping": "name", "min_occurs": 2, "max_occurs": 1 }
                ]
            }]
        }"#,
    )
    .unwrap_err();
    assert!(err.is_invalid_schema());

    let err = build(
        r#"{
            "feature_types": [{
                "name": "Road", "table": "roads", "id": { "column": "id" },
                "properties": [
                    { "name": "names", "kind": "primitive", "mapping": "name", "max_occurs": "unbounded" }
                ]
            }]
        }"#,
    )
    .unwrap_err();
    assert!(err.is_invalid_schema());
}

#[test]
fn duplicate_feature_types_are_rejected() {
    let err = build(
        r#"{
            "feature_types": [
                { "name": "Road", "table": "roads", "id": { "column": "id" } },
                { "name": "Road", "table": "roads2", "id": { "column": "id" } }
            ]
        }"#,
    )
    .unwrap_err();
    assert!(err.is_invalid_schema());
}

#[test]
fn unknown_generator_is_rejected() {
    let err = build(
        r#"{
            "feature_types": [
                { "name": "Road", "table": "roads", "id": { "column": "id", "generator": "uuid" } }
            ]
        }"#,
    )
    .unwrap_err();
    assert!(err.is_invalid_schema());
}
