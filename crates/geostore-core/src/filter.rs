//! Predicate trees over feature properties.
//!
//! A [`Filter`] is what the protocol layer hands to the engine. Leaves name
//! properties by [`PropertyPath`]; the translator resolves them against the
//! mapping and renders the tree into a `WHERE` clause with the same shape.

mod comparison;
pub use comparison::{Comparison, ComparisonOp};

mod like;
pub use like::LikePattern;

mod operand;
pub use operand::Operand;

mod spatial;
pub use spatial::{Distance, Spatial, SpatialOp};

use crate::{geometry::Geometry, schema::PropertyPath};

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),

    Comparison(Comparison),

    /// `lower <= operand <= upper`
    Between {
        operand: Operand,
        lower: Operand,
        upper: Operand,
    },

    Like {
        operand: Operand,
        pattern: LikePattern,
        match_case: bool,
    },

    /// Property is null (or absent, for joined properties)
    IsNull(Operand),

    Spatial(Spatial),

    /// Matches features whose id is one of the listed feature ids
    ResourceIds(Vec<String>),
}

impl Filter {
    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Filter {
        Filter::And(filters.into_iter().collect())
    }

    pub fn or(filters: impl IntoIterator<Item = Filter>) -> Filter {
        Filter::Or(filters.into_iter().collect())
    }

    pub fn not(filter: Filter) -> Filter {
        Filter::Not(Box::new(filter))
    }

    pub fn compare(lhs: impl Into<Operand>, op: ComparisonOp, rhs: impl Into<Operand>) -> Filter {
        Filter::Comparison(Comparison {
            op,
            lhs: lhs.into(),
            rhs: rhs.into(),
            match_case: true,
        })
    }

    pub fn eq(lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> Filter {
        Filter::compare(lhs, ComparisonOp::Eq, rhs)
    }

    pub fn ne(lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> Filter {
        Filter::compare(lhs, ComparisonOp::Ne, rhs)
    }

    pub fn lt(lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> Filter {
        Filter::compare(lhs, ComparisonOp::Lt, rhs)
    }

    pub fn gt(lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> Filter {
        Filter::compare(lhs, ComparisonOp::Gt, rhs)
    }

    pub fn between(
        operand: impl Into<Operand>,
        lower: impl Into<Operand>,
        upper: impl Into<Operand>,
    ) -> Filter {
        Filter::Between {
            operand: operand.into(),
            lower: lower.into(),
            upper: upper.into(),
        }
    }

    pub fn like(operand: impl Into<Operand>, pattern: LikePattern) -> Filter {
        Filter::Like {
            operand: operand.into(),
            pattern,
            match_case: true,
        }
    }

    pub fn is_null(operand: impl Into<Operand>) -> Filter {
        Filter::IsNull(operand.into())
    }

    pub fn spatial(op: SpatialOp, property: impl Into<PropertyPath>, geometry: Geometry) -> Filter {
        Filter::Spatial(Spatial {
            op,
            property: property.into(),
            geometry,
            distance: None,
        })
    }

    pub fn within_distance(
        property: impl Into<PropertyPath>,
        geometry: Geometry,
        distance: Distance,
    ) -> Filter {
        Filter::Spatial(Spatial {
            op: SpatialOp::DWithin,
            property: property.into(),
            geometry,
            distance: Some(distance),
        })
    }

    pub fn beyond(
        property: impl Into<PropertyPath>,
        geometry: Geometry,
        distance: Distance,
    ) -> Filter {
        Filter::Spatial(Spatial {
            op: SpatialOp::Beyond,
            property: property.into(),
            geometry,
            distance: Some(distance),
        })
    }

    pub fn resource_ids<I, S>(ids: I) -> Filter
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Filter::ResourceIds(ids.into_iter().map(Into::into).collect())
    }

    /// Makes comparison and like leaves case-insensitive.
    pub fn ignore_case(mut self) -> Filter {
        match &mut self {
            Filter::Comparison(cmp) => cmp.match_case = false,
            Filter::Like { match_case, .. } => *match_case = false,
            _ => {}
        }
        self
    }

    /// Visits every property path referenced by the filter, in tree order.
    pub fn for_each_path(&self, f: &mut impl FnMut(&PropertyPath)) {
        match self {
            Filter::And(filters) | Filter::Or(filters) => {
                filters.iter().for_each(|filter| filter.for_each_path(f))
            }
            Filter::Not(filter) => filter.for_each_path(f),
            Filter::Comparison(cmp) => {
                cmp.lhs.for_each_path(f);
                cmp.rhs.for_each_path(f);
            }
            Filter::Between {
                operand,
                lower,
                upper,
            } => {
                operand.for_each_path(f);
                lower.for_each_path(f);
                upper.for_each_path(f);
            }
            Filter::Like { operand, .. } | Filter::IsNull(operand) => operand.for_each_path(f),
            Filter::Spatial(spatial) => f(&spatial.property),
            Filter::ResourceIds(_) => {}
        }
    }
}
