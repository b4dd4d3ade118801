use crate::{geometry::Geometry, schema::PropertyPath};

#[derive(Debug, Clone, PartialEq)]
pub struct Spatial {
    pub op: SpatialOp,
    pub property: PropertyPath,

    /// Literal operand, in its own spatial reference
    pub geometry: Geometry,

    /// Required for `DWithin` and `Beyond`
    pub distance: Option<Distance>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpatialOp {
    Intersects,
    Within,
    Contains,
    Disjoint,
    Touches,
    Crosses,
    Overlaps,
    Equals,
    BBox,
    DWithin,
    Beyond,
}

impl SpatialOp {
    /// Name of the function provider rendering this operator.
    pub fn function_name(self) -> &'static str {
        match self {
            SpatialOp::Intersects => "intersects",
            SpatialOp::Within => "within",
            SpatialOp::Contains => "contains",
            SpatialOp::Disjoint => "disjoint",
            SpatialOp::Touches => "touches",
            SpatialOp::Crosses => "crosses",
            SpatialOp::Overlaps => "overlaps",
            SpatialOp::Equals => "equals",
            SpatialOp::BBox => "bbox",
            SpatialOp::DWithin => "dwithin",
            SpatialOp::Beyond => "beyond",
        }
    }

    pub fn takes_distance(self) -> bool {
        matches!(self, SpatialOp::DWithin | SpatialOp::Beyond)
    }
}

/// A distance with its unit of measure, e.g. `(250.0, "m")`.
#[derive(Debug, Clone, PartialEq)]
pub struct Distance {
    pub value: f64,
    pub uom: String,
}

impl Distance {
    pub fn new(value: f64, uom: impl Into<String>) -> Self {
        Self {
            value,
            uom: uom.into(),
        }
    }
}
