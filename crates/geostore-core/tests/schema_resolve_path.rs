use geostore_core::schema::{Builder, MappingDocument, PropertyKind, PropertyPath, QName};

fn schema() -> geostore_core::MappedSchema {
    let document: MappingDocument = serde_json::from_str(
        r#"{
            "namespaces": { "app": "http://example.com/app" },
            "feature_types": [{
                "name": "app:Road",
                "table": "roads",
                "id": { "column": "id", "prefix": "ROAD_", "type": "integer" },
                "properties": [
                    { "name": "app:name", "kind": "primitive", "mapping": "name" },
                    { "name": "app:geom", "kind": "geometry", "mapping": "geom", "srid": "EPSG:4326" },
                    {
                        "name": "app:lanes",
                        "kind": "compound",
                        "max_occurs": "unbounded",
                        "joins": [{
                            "from": "roads", "to": "lanes",
                            "from_columns": ["id"], "to_columns": ["road_id"],
                            "order_columns": ["seq"], "numbered_order": true
                        }],
                        "properties": [
                            { "name": "app:width", "kind": "primitive", "mapping": "width", "type": "double" },
                            {
                                "name": "app:surface",
                                "kind": "compound",
                                "properties": [
                                    { "name": "app:material", "kind": "primitive", "mapping": "material" }
                                ]
                            }
                        ]
                    }
                ]
            }]
        }"#,
    )
    .unwrap();

    Builder::new().build(&document).unwrap()
}

#[test]
fn direct_column() {
    let schema = schema();
    let road = schema.feature_type_by_name("app:Road").unwrap();

    let resolved = road.resolve(&PropertyPath::parse("app:name")).unwrap();
    assert!(resolved.is_direct());
    assert_eq!(
        resolved.value_expr().unwrap(),
        &geostore_core::stmt::Expr::column("name")
    );
}

#[test]
fn leading_type_step_is_skipped() {
    let schema = schema();
    let road = schema.feature_type_by_name("app:Road").unwrap();

    let resolved = road.resolve(&PropertyPath::parse("app:Road/app:name")).unwrap();
    assert_eq!(resolved.property.name.local, "name");
}

#[test]
fn join_chain_through_compound() {
    let schema = schema();
    let road = schema.feature_type_by_name("app:Road").unwrap();

    let resolved = road
        .resolve(&PropertyPath::parse("app:lanes/app:width"))
        .unwrap();
    assert_eq!(resolved.joins.len(), 1);
    assert_eq!(resolved.joins[0].to_table, "lanes");
    assert_eq!(resolved.root().name.local, "lanes");
    assert!(matches!(
        resolved.property.kind,
        PropertyKind::Primitive { .. }
    ));

    // an inline compound contributes no joins of its own
    let resolved = road
        .resolve(&PropertyPath::parse("app:lanes/app:surface/app:material"))
        .unwrap();
    assert_eq!(resolved.joins.len(), 1);
    assert_eq!(resolved.ancestors.len(), 2);
}

#[test]
fn undeclared_paths_are_not_mapped() {
    let schema = schema();
    let road = schema.feature_type_by_name("app:Road").unwrap();

    for path in ["app:colour", "app:name/app:first", "app:lanes/app:colour", ""] {
        let err = road.resolve(&PropertyPath::parse(path)).unwrap_err();
        assert!(err.is_property_not_mapped(), "{path}: {err}");
    }
}

#[test]
fn every_declared_path_resolves() {
    let schema = schema();
    let road = schema.feature_type_by_name("app:Road").unwrap();

    fn walk(prefix: &str, properties: &[geostore_core::schema::PropertyMapping], out: &mut Vec<String>) {
        for property in properties {
            let path = if prefix.is_empty() {
                property.name.to_string()
            } else {
                format!("{prefix}/{}", property.name)
            };
            walk(&path, property.children(), out);
            out.push(path);
        }
    }

    let mut paths = vec![];
    walk("", &road.properties, &mut paths);
    assert_eq!(paths.len(), 6);

    for path in paths {
        let resolved = road.resolve(&PropertyPath::parse(&path)).unwrap();
        assert_eq!(resolved.property.name.to_string(), path.rsplit('/').next().unwrap());
    }
}

#[test]
fn names_resolve_leniently() {
    let schema = schema();
    assert!(schema.feature_type(&QName::local("Road")).is_some());
    assert!(schema
        .feature_type(&QName::parse("{http://example.com/app}Road"))
        .is_some());
    assert!(schema.feature_type_by_name("app:River").unwrap_err().is_invalid_filter());

    assert_eq!(schema.type_for_fid("ROAD_12").unwrap().table, "roads");
    assert!(schema.type_for_fid("RIVER_1").is_none());
}
