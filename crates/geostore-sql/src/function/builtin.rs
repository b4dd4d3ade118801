use super::{FunctionCx, FunctionProvider, Template};

use geostore_core::driver::Dialect;
use std::ops::RangeInclusive;

type Render = fn(&FunctionCx, usize) -> Option<&'static str>;

/// A provider backed by per-dialect templates.
///
/// `render` returns `None` for dialects the function is not available on.
#[derive(Debug, Clone)]
pub struct Builtin {
    pub name: &'static str,
    pub arity: RangeInclusive<usize>,
    pub render: Render,
}

impl FunctionProvider for Builtin {
    fn name(&self) -> &str {
        self.name
    }

    fn arity(&self) -> RangeInclusive<usize> {
        self.arity.clone()
    }

    fn supports(&self, dialect: Dialect) -> bool {
        let cx = FunctionCx {
            dialect,
            legacy_spatial: false,
        };
        (self.render)(&cx, *self.arity.start()).is_some()
    }

    fn template(&self, cx: &FunctionCx, args: usize) -> Template {
        match (self.render)(cx, args) {
            Some(src) => Template::parse(src),
            None => Template::call(self.name),
        }
    }
}

/// Spatial predicate with an `ST_` name and an unprefixed legacy PostGIS
/// name. SQLite has no spatial functions without an extension.
macro_rules! spatial_predicate {
    ($name:literal, $st:literal, $legacy:literal) => {
        Builtin {
            name: $name,
            arity: 2..=2,
            render: |cx, _| match cx.dialect {
                Dialect::Postgresql if cx.legacy_spatial => Some($legacy),
                Dialect::Postgresql | Dialect::Mysql => Some($st),
                Dialect::Sqlite => None,
            },
        }
    };
}

impl Builtin {
    pub fn all() -> Vec<Builtin> {
        vec![
            Builtin {
                name: "area",
                arity: 1..=1,
                render: |cx, _| match cx.dialect {
                    Dialect::Postgresql => Some("area({0})"),
                    Dialect::Mysql => Some("ST_Area({0})"),
                    Dialect::Sqlite => None,
                },
            },
            Builtin {
                name: "length",
                arity: 1..=1,
                render: |cx, _| match cx.dialect {
                    Dialect::Postgresql if cx.legacy_spatial => Some("length({0})"),
                    Dialect::Postgresql | Dialect::Mysql => Some("ST_Length({0})"),
                    Dialect::Sqlite => None,
                },
            },
            Builtin {
                name: "lower",
                arity: 1..=1,
                render: |_, _| Some("LOWER({0})"),
            },
            Builtin {
                name: "upper",
                arity: 1..=1,
                render: |_, _| Some("UPPER({0})"),
            },
            spatial_predicate!("intersects", "ST_Intersects({0}, {1})", "intersects({0}, {1})"),
            spatial_predicate!("within", "ST_Within({0}, {1})", "within({0}, {1})"),
            spatial_predicate!("contains", "ST_Contains({0}, {1})", "contains({0}, {1})"),
            spatial_predicate!("disjoint", "ST_Disjoint({0}, {1})", "disjoint({0}, {1})"),
            spatial_predicate!("touches", "ST_Touches({0}, {1})", "touches({0}, {1})"),
            spatial_predicate!("crosses", "ST_Crosses({0}, {1})", "crosses({0}, {1})"),
            spatial_predicate!("overlaps", "ST_Overlaps({0}, {1})", "overlaps({0}, {1})"),
            spatial_predicate!("equals", "ST_Equals({0}, {1})", "equals({0}, {1})"),
            spatial_predicate!(
                "bbox",
                "({0} && {1} AND ST_Intersects({0}, {1}))",
                "({0} && {1} AND intersects({0}, {1}))"
            ),
            Builtin {
                name: "dwithin",
                arity: 3..=3,
                render: |cx, _| match cx.dialect {
                    Dialect::Postgresql if cx.legacy_spatial => Some("distance({0}, {1}) <= {2}"),
                    Dialect::Postgresql => Some("ST_DWithin({0}, {1}, {2})"),
                    Dialect::Mysql => Some("ST_Distance({0}, {1}) <= {2}"),
                    Dialect::Sqlite => None,
                },
            },
            Builtin {
                name: "beyond",
                arity: 3..=3,
                render: |cx, _| match cx.dialect {
                    Dialect::Postgresql if cx.legacy_spatial => Some("distance({0}, {1}) > {2}"),
                    Dialect::Postgresql => Some("NOT ST_DWithin({0}, {1}, {2})"),
                    Dialect::Mysql => Some("ST_Distance({0}, {1}) > {2}"),
                    Dialect::Sqlite => None,
                },
            },
            // Geometries are stored as plain WKB blobs on SQLite
            Builtin {
                name: "geom_from_wkb",
                arity: 1..=2,
                render: |cx, args| match (cx.dialect, args) {
                    (Dialect::Sqlite, _) => Some("{0}"),
                    (Dialect::Postgresql, 1) if cx.legacy_spatial => Some("GeomFromWKB({0})"),
                    (Dialect::Postgresql, _) if cx.legacy_spatial => Some("GeomFromWKB({0}, {1})"),
                    (_, 1) => Some("ST_GeomFromWKB({0})"),
                    (_, _) => Some("ST_GeomFromWKB({0}, {1})"),
                },
            },
            Builtin {
                name: "as_binary",
                arity: 1..=1,
                render: |cx, _| match cx.dialect {
                    Dialect::Sqlite => Some("{0}"),
                    Dialect::Postgresql if cx.legacy_spatial => Some("AsBinary({0})"),
                    Dialect::Postgresql | Dialect::Mysql => Some("ST_AsBinary({0})"),
                },
            },
            // `ctid` has no text-compatible wire type
            Builtin {
                name: "row_identity",
                arity: 1..=1,
                render: |cx, _| match cx.dialect {
                    Dialect::Sqlite => Some("{0}"),
                    Dialect::Postgresql => Some("{0}::text"),
                    Dialect::Mysql => None,
                },
            },
        ]
    }
}
