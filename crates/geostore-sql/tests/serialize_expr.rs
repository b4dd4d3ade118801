use geostore_core::{
    geometry::{Geometry, Srid},
    stmt::{Expr, Select, TableRef, Value},
};
use geostore_sql::{function::Builtin, FunctionRegistry, Serializer};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn col(name: &str) -> Expr {
    Expr::qualified_column("X1", name)
}

fn render(serializer: &Serializer, expr: &Expr) -> String {
    serializer.serialize_expr(expr).unwrap().0
}

#[test]
fn literals_are_bound() {
    let expr = Expr::eq(col("name"), "foo");

    let (sql, params) = Serializer::sqlite().serialize_expr(&expr).unwrap();
    assert_eq!(sql, "X1.name = ?1");
    assert_eq!(params, vec![Value::from("foo")]);

    let (sql, _) = Serializer::postgresql().serialize_expr(&expr).unwrap();
    assert_eq!(sql, "X1.name = $1");

    let (sql, _) = Serializer::mysql().serialize_expr(&expr).unwrap();
    assert_eq!(sql, "X1.name = ?");
}

#[test]
fn placeholders_follow_bind_order() {
    let expr = Expr::and_from_vec(vec![
        Expr::eq(col("a"), 1i64),
        Expr::between(col("b"), 2i64, 3i64),
    ]);

    let (sql, params) = Serializer::postgresql().serialize_expr(&expr).unwrap();
    assert_eq!(sql, "(X1.a = $1 AND ($2 <= X1.b AND X1.b <= $3))");
    assert_eq!(
        params,
        vec![Value::I64(1), Value::I64(2), Value::I64(3)]
    );
}

#[test]
fn boolean_grouping() {
    let s = Serializer::sqlite();

    let expr = Expr::not(Expr::or_from_vec(vec![
        Expr::is_null(col("a")),
        Expr::is_not_null(col("b")),
    ]));
    assert_eq!(render(&s, &expr), "NOT ((X1.a IS NULL OR X1.b IS NOT NULL))");

    assert_eq!(render(&s, &Expr::and_from_vec(vec![])), "1 = 1");
    assert_eq!(render(&s, &Expr::or_from_vec(vec![])), "1 = 0");
    assert_eq!(render(&s, &Expr::in_list(col("id"), vec![])), "1 = 0");
}

#[test]
fn like_carries_its_escape() {
    let expr = Expr::like(col("name"), "Main%", '\\');
    let (sql, params) = Serializer::sqlite().serialize_expr(&expr).unwrap();
    assert_eq!(sql, "X1.name LIKE ?1 ESCAPE '\\'");
    assert_eq!(params, vec![Value::from("Main%")]);
}

#[test]
fn passthrough_is_verbatim() {
    let expr = Expr::eq(
        Expr::passthrough("CASE WHEN kind = 1 THEN 'a' ELSE 'b' END"),
        "a",
    );
    assert_eq!(
        render(&Serializer::postgresql(), &expr),
        "CASE WHEN kind = 1 THEN 'a' ELSE 'b' END = $1"
    );
}

#[test]
fn functions_render_per_dialect() {
    let area = Expr::func("area", vec![col("geom")]);
    assert_eq!(render(&Serializer::postgresql(), &area), "area(X1.geom)");
    assert_eq!(render(&Serializer::mysql(), &area), "ST_Area(X1.geom)");

    let err = Serializer::sqlite().serialize_expr(&area).unwrap_err();
    assert!(err.is_unsupported_function());
    assert_eq!(
        err.to_string(),
        "unsupported function: `area` is not available for dialect sqlite"
    );

    let lower = Expr::func("LOWER", vec![col("name")]);
    assert_eq!(render(&Serializer::sqlite(), &lower), "LOWER(X1.name)");
}

#[test]
fn unknown_functions_fail() {
    let expr = Expr::func("frobnicate", vec![col("geom")]);
    let err = Serializer::postgresql().serialize_expr(&expr).unwrap_err();
    assert!(err.is_unsupported_function());
    assert_eq!(err.to_string(), "unsupported function: `frobnicate`");
}

#[test]
fn wrong_arity_is_an_invalid_filter() {
    let expr = Expr::func("intersects", vec![col("geom")]);
    let err = Serializer::postgresql().serialize_expr(&expr).unwrap_err();
    assert!(err.is_invalid_filter());
}

#[test]
fn geometry_literals_bind_wkb() {
    let point = Geometry::new(geo_types::Point::new(1.0, 2.0), Some(Srid(4326)));
    let expr = Expr::func(
        "intersects",
        vec![col("geom"), Expr::Value(Value::Geometry(point.clone()))],
    );

    let (sql, params) = Serializer::postgresql().serialize_expr(&expr).unwrap();
    assert_eq!(sql, "ST_Intersects(X1.geom, ST_GeomFromWKB($1, $2))");
    assert_eq!(
        params,
        vec![Value::Bytes(point.to_wkb()), Value::I64(4326)]
    );

    let (sql, _) = Serializer::postgresql()
        .legacy_spatial(true)
        .serialize_expr(&expr)
        .unwrap();
    assert_eq!(sql, "intersects(X1.geom, GeomFromWKB($1, $2))");
}

#[test]
fn bbox_and_distance_operators() {
    let pg = Serializer::postgresql();
    let geom = || Expr::Value(Value::Bytes(vec![1]));

    let bbox = Expr::func("bbox", vec![col("geom"), geom()]);
    assert_eq!(
        render(&pg, &bbox),
        "(X1.geom && $1 AND ST_Intersects(X1.geom, $2))"
    );
    assert_eq!(
        render(&pg, &Expr::eq(bbox.clone(), true)),
        "(X1.geom && $1 AND ST_Intersects(X1.geom, $2)) = $3"
    );

    let beyond = Expr::func("beyond", vec![col("geom"), geom(), Expr::from(10.0)]);
    assert_eq!(render(&pg, &beyond), "NOT ST_DWithin(X1.geom, $1, $2)");
    assert_eq!(
        render(&pg.clone().legacy_spatial(true), &beyond),
        "distance(X1.geom, $1) > $2"
    );

    let dwithin = Expr::func("dwithin", vec![col("geom"), geom(), Expr::from(10.0)]);
    assert_eq!(render(&pg, &dwithin), "ST_DWithin(X1.geom, $1, $2)");
}

#[test]
fn row_identity_per_dialect() {
    let expr = Expr::func("row_identity", vec![Expr::qualified_column("X2", "ctid")]);
    assert_eq!(render(&Serializer::postgresql(), &expr), "X2.ctid::text");

    let expr = Expr::func("row_identity", vec![Expr::qualified_column("X2", "rowid")]);
    assert_eq!(render(&Serializer::sqlite(), &expr), "X2.rowid");

    let err = Serializer::mysql().serialize_expr(&expr).unwrap_err();
    assert!(err.is_unsupported_function());
}

#[test]
fn custom_providers_extend_the_registry() {
    let mut registry = FunctionRegistry::builtin();
    registry.register(Builtin {
        name: "simplify",
        arity: 2..=2,
        render: |_, _| Some("ST_Simplify({0}, {1})"),
    });

    let s = Serializer::sqlite().with_functions(Arc::new(registry));
    let expr = Expr::func("simplify", vec![col("geom"), Expr::from(0.5)]);
    assert_eq!(render(&s, &expr), "ST_Simplify(X1.geom, ?1)");
}

#[test]
fn subqueries_with_limit_are_wrapped_on_mysql() {
    let mut inner = Select::new(
        TableRef::aliased("roads", "F1"),
        vec![Expr::qualified_column("F1", "id")],
    );
    inner.limit = Some(geostore_core::stmt::Limit {
        limit: Some(10),
        offset: None,
    });

    let expr = Expr::in_subquery(col("id"), inner);
    assert_eq!(
        render(&Serializer::mysql(), &expr),
        "X1.id IN (SELECT * FROM (SELECT F1.id FROM roads F1 LIMIT 10) AS page)"
    );
    assert_eq!(
        render(&Serializer::sqlite(), &expr),
        "X1.id IN (SELECT F1.id FROM roads F1 LIMIT 10)"
    );
}
