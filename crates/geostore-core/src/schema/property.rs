use super::{QName, TableJoin};
use crate::{
    geometry::{Dimension, Srid},
    stmt::{Expr, Type},
};

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyMapping {
    pub name: QName,

    pub min_occurs: u32,

    /// `None` is unbounded
    pub max_occurs: Option<u32>,

    pub nillable: bool,

    /// Joins from the owning table to the table holding this property. Empty
    /// when the property lives in the owning table.
    pub joins: Vec<TableJoin>,

    pub kind: PropertyKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind {
    Primitive {
        expr: Expr,
        ty: Type,
    },

    Geometry {
        expr: Expr,
        srid: Option<Srid>,
        dim: Dimension,
    },

    /// A reference to another feature, stored as a foreign key, an href, or
    /// both. `target` is `None` when any feature type may be referenced.
    Reference {
        fk: Option<Expr>,
        href: Option<Expr>,
        target: Option<QName>,
    },

    /// A structured value whose properties live in the joined table, or in
    /// the owning table when there are no joins.
    Compound { properties: Vec<PropertyMapping> },
}

impl PropertyMapping {
    pub fn is_multi_valued(&self) -> bool {
        self.max_occurs != Some(1)
    }

    pub fn is_compound(&self) -> bool {
        matches!(self.kind, PropertyKind::Compound { .. })
    }

    pub fn children(&self) -> &[PropertyMapping] {
        match &self.kind {
            PropertyKind::Compound { properties } => properties,
            _ => &[],
        }
    }

    /// The expression a filter compares against.
    ///
    /// References compare on the foreign key when there is one, else on the
    /// href. Compound properties have no single value.
    pub fn value_expr(&self) -> Option<&Expr> {
        match &self.kind {
            PropertyKind::Primitive { expr, .. } => Some(expr),
            PropertyKind::Geometry { expr, .. } => Some(expr),
            PropertyKind::Reference { fk, href, .. } => fk.as_ref().or(href.as_ref()),
            PropertyKind::Compound { .. } => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            PropertyKind::Primitive { .. } => "primitive",
            PropertyKind::Geometry { .. } => "geometry",
            PropertyKind::Reference { .. } => "reference",
            PropertyKind::Compound { .. } => "compound",
        }
    }
}
