use super::{
    document::{
        FeatureTypeDocument, IdDocument, JoinDocument, MaxOccurs, PropertyDocument,
        PropertyKindDocument,
    },
    FeatureTypeMapping, IdGenerator, IdMapping, MappedSchema, MappingDocument, OrderColumn,
    PropertyKind, PropertyMapping, QName, TableJoin,
};
use crate::{
    geometry::{Dimension, Srid},
    stmt::{parse_mapping_expr, Type},
    Error, Result,
};

use indexmap::IndexMap;

/// Builds a [`MappedSchema`] from a mapping document.
#[derive(Debug, Default)]
pub struct Builder {
    /// Spatial reference assumed for geometry properties that declare none
    default_srid: Option<Srid>,
}

struct BuildSchema<'a> {
    namespaces: &'a IndexMap<String, String>,
    default_srid: Option<Srid>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_srid(&mut self, srid: Srid) -> &mut Self {
        self.default_srid = Some(srid);
        self
    }

    pub fn build(&self, document: &MappingDocument) -> Result<MappedSchema> {
        let cx = BuildSchema {
            namespaces: &document.namespaces,
            default_srid: self.default_srid,
        };

        let mut types = IndexMap::new();

        for doc in &document.feature_types {
            let mapping = cx
                .build_feature_type(doc)
                .map_err(|err| err.context(Error::invalid_schema(format!("feature type `{}`", doc.name))))?;

            if types.contains_key(&mapping.name) {
                return Err(Error::invalid_schema(format!(
                    "feature type `{}` is declared more than once",
                    doc.name
                )));
            }

            types.insert(mapping.name.clone(), mapping);
        }

        MappedSchema::from_parts(types, document.namespaces.clone())
    }
}

impl BuildSchema<'_> {
    fn qname(&self, src: &str) -> QName {
        let mut name = QName::parse(src);
        if let (None, Some(prefix)) = (&name.namespace, &name.prefix) {
            name.namespace = self.namespaces.get(prefix).cloned();
        }
        name
    }

    fn build_feature_type(&self, doc: &FeatureTypeDocument) -> Result<FeatureTypeMapping> {
        let name = self.qname(&doc.name);
        let id = self.build_id(&doc.id)?;

        let properties = doc
            .properties
            .iter()
            .map(|p| self.build_property(p))
            .collect::<Result<_>>()?;

        Ok(FeatureTypeMapping {
            name,
            table: doc.table.clone(),
            id,
            properties,
        })
    }

    fn build_id(&self, doc: &IdDocument) -> Result<IdMapping> {
        let generator = match doc.generator.as_deref().map(str::trim) {
            None | Some("auto") => IdGenerator::AutoIncrement,
            Some("client") => IdGenerator::Client,
            Some(other) => match other.strip_prefix("sequence:") {
                Some(seq) => IdGenerator::Sequence(seq.trim().to_string()),
                None => {
                    return Err(Error::invalid_schema(format!(
                        "unknown id generator `{other}`"
                    )))
                }
            },
        };

        Ok(IdMapping {
            prefix: doc.prefix.clone(),
            column: doc.column.clone(),
            ty: parse_type(doc.ty.as_deref().unwrap_or("string"))?,
            generator,
        })
    }

    fn build_property(&self, doc: &PropertyDocument) -> Result<PropertyMapping> {
        let context = || Error::invalid_schema(format!("property `{}`", doc.name));

        let kind = self.build_kind(doc).map_err(|err| err.context(context()))?;

        let max_occurs = match &doc.max_occurs {
            None => Some(1),
            Some(MaxOccurs::Bounded(n)) => Some(*n),
            Some(MaxOccurs::Keyword(k)) if k.eq_ignore_ascii_case("unbounded") => None,
            Some(MaxOccurs::Keyword(k)) => {
                return Err(
                    Error::invalid_schema(format!("invalid max_occurs `{k}`")).context(context())
                )
            }
        };

        Ok(PropertyMapping {
            name: self.qname(&doc.name),
            min_occurs: doc.min_occurs.unwrap_or(0),
            max_occurs,
            nillable: doc.nillable,
            joins: doc.joins.iter().map(build_join).collect(),
            kind,
        })
    }

    fn build_kind(&self, doc: &PropertyDocument) -> Result<PropertyKind> {
        let mapping = || {
            doc.mapping
                .as_deref()
                .map(parse_mapping_expr)
                .ok_or_else(|| Error::invalid_schema("missing `mapping` expression"))
        };

        Ok(match doc.kind {
            PropertyKindDocument::Primitive => PropertyKind::Primitive {
                expr: mapping()?,
                ty: parse_type(doc.ty.as_deref().unwrap_or("string"))?,
            },
            PropertyKindDocument::Geometry => PropertyKind::Geometry {
                expr: mapping()?,
                srid: match &doc.srid {
                    Some(srid) => Some(srid.parse()?),
                    None => self.default_srid,
                },
                dim: match doc.dimension {
                    None | Some(2) => Dimension::Xy,
                    Some(3) => Dimension::Xyz,
                    Some(other) => {
                        return Err(Error::invalid_schema(format!(
                            "invalid coordinate dimension {other}"
                        )))
                    }
                },
            },
            PropertyKindDocument::Reference => {
                let fk = doc.mapping.as_deref().map(parse_mapping_expr);
                let href = doc.href.as_deref().map(parse_mapping_expr);
                if fk.is_none() && href.is_none() {
                    return Err(Error::invalid_schema(
                        "a reference needs a `mapping` (foreign key) or an `href` column",
                    ));
                }
                PropertyKind::Reference {
                    fk,
                    href,
                    target: doc
                        .target
                        .as_deref()
                        .filter(|t| *t != "*")
                        .map(|t| self.qname(t)),
                }
            }
            PropertyKindDocument::Compound => PropertyKind::Compound {
                properties: doc
                    .properties
                    .iter()
                    .map(|p| self.build_property(p))
                    .collect::<Result<_>>()?,
            },
        })
    }
}

fn build_join(doc: &JoinDocument) -> TableJoin {
    TableJoin {
        from_table: doc.from.clone(),
        to_table: doc.to.clone(),
        from_columns: doc.from_columns.clone(),
        to_columns: doc.to_columns.clone(),
        order_columns: doc
            .order_columns
            .iter()
            .map(|column| OrderColumn::parse(column))
            .collect(),
        numbered_order: doc.numbered_order,
        key_columns: doc.key_columns.clone(),
    }
}

fn parse_type(name: &str) -> Result<Type> {
    Ok(match name.to_ascii_lowercase().as_str() {
        "string" | "text" => Type::String,
        "integer" | "int" | "i64" => Type::I64,
        "double" | "decimal" | "number" | "f64" => Type::F64,
        "boolean" | "bool" => Type::Bool,
        "datetime" | "timestamp" => Type::DateTime,
        "bytes" | "binary" => Type::Bytes,
        _ => return Err(Error::invalid_schema(format!("unknown type `{name}`"))),
    })
}
