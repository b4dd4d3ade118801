use super::{FeatureTypeMapping, IdGenerator, MappedSchema, PropertyKind, PropertyMapping};
use crate::{Error, Result};

use std::collections::HashSet;

struct Verify<'a> {
    schema: &'a MappedSchema,
}

impl MappedSchema {
    pub(super) fn verify(&self) -> Result<()> {
        Verify { schema: self }.verify()
    }
}

impl Verify<'_> {
    fn verify(&self) -> Result<()> {
        self.verify_id_prefixes_are_unique()?;

        for ty in self.schema.feature_types() {
            self.verify_id(ty)?;
            self.verify_properties(ty, &ty.table, &ty.properties)?;
        }

        Ok(())
    }

    fn verify_id_prefixes_are_unique(&self) -> Result<()> {
        let mut prefixes = HashSet::new();

        for ty in self.schema.feature_types() {
            if !ty.id.prefix.is_empty() && !prefixes.insert(&ty.id.prefix) {
                return Err(Error::invalid_schema(format!(
                    "id prefix `{}` is used by more than one feature type",
                    ty.id.prefix
                )));
            }
        }

        Ok(())
    }

    fn verify_id(&self, ty: &FeatureTypeMapping) -> Result<()> {
        if ty.id.column.is_empty() {
            return Err(Error::invalid_schema(format!(
                "feature type `{}` has no id column",
                ty.name
            )));
        }

        if let IdGenerator::Sequence(name) = &ty.id.generator {
            if name.is_empty() {
                return Err(Error::invalid_schema(format!(
                    "feature type `{}` uses a sequence id generator without a sequence name",
                    ty.name
                )));
            }
        }

        Ok(())
    }

    /// `table` is the table the properties are read from.
    fn verify_properties(
        &self,
        ty: &FeatureTypeMapping,
        table: &str,
        properties: &[PropertyMapping],
    ) -> Result<()> {
        let mut names = HashSet::new();

        for property in properties {
            if !names.insert(&property.name) {
                return Err(Error::invalid_schema(format!(
                    "ambiguous mapping: property `{}` is declared twice on `{}`",
                    property.name, ty.name
                )));
            }

            let table = self.verify_joins(ty, property, table)?;
            self.verify_occurrence(ty, property)?;

            if let PropertyKind::Compound { properties } = &property.kind {
                self.verify_properties(ty, table, properties)?;
            }
        }

        Ok(())
    }

    /// Returns the table the property's values live in.
    fn verify_joins<'a>(
        &self,
        ty: &FeatureTypeMapping,
        property: &'a PropertyMapping,
        mut table: &'a str,
    ) -> Result<&'a str> {
        for join in &property.joins {
            let malformed = |reason: &str| {
                Error::invalid_schema(format!(
                    "malformed join `{join}` on property `{}` of `{}`: {reason}",
                    property.name, ty.name
                ))
            };

            if join.from_columns.is_empty() || join.from_columns.len() != join.to_columns.len() {
                return Err(malformed(
                    "source and target column lists must be non-empty and of equal length",
                ));
            }

            if join.from_table != table {
                return Err(malformed(&format!("expected the join to start at `{table}`")));
            }

            if join.numbered_order && join.order_columns.len() != 1 {
                return Err(malformed("a numbered order needs exactly one order column"));
            }

            if join.numbered_order && join.order_columns[0].descending {
                return Err(malformed("a numbered order cannot be descending"));
            }

            table = &join.to_table;
        }

        Ok(table)
    }

    fn verify_occurrence(&self, ty: &FeatureTypeMapping, property: &PropertyMapping) -> Result<()> {
        if let Some(max) = property.max_occurs {
            if property.min_occurs > max {
                return Err(Error::invalid_schema(format!(
                    "property `{}` of `{}` has min_occurs {} greater than max_occurs {max}",
                    property.name, ty.name, property.min_occurs
                )));
            }
        }

        if property.is_multi_valued() && property.joins.is_empty() {
            return Err(Error::invalid_schema(format!(
                "multi-valued property `{}` of `{}` must be mapped through a join",
                property.name, ty.name
            )));
        }

        Ok(())
    }
}
