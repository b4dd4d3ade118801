use super::{FeatureTypeMapping, PropertyMapping, PropertyPath, QName, TableJoin};
use crate::{stmt::Expr, Error, Result};

/// The outcome of resolving a property path against a feature type.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPath<'a> {
    /// Joins from the primary table to the table holding the property, in
    /// traversal order. Empty for a column of the primary table.
    pub joins: Vec<&'a TableJoin>,

    /// The property the last step resolved to
    pub property: &'a PropertyMapping,

    /// Enclosing compound properties, outermost first
    pub ancestors: Vec<&'a PropertyMapping>,
}

impl<'a> ResolvedPath<'a> {
    /// The column-or-expression the path terminates in.
    pub fn value_expr(&self) -> Option<&'a Expr> {
        self.property.value_expr()
    }

    pub fn is_direct(&self) -> bool {
        self.joins.is_empty()
    }

    /// The top-level property the path starts at.
    pub fn root(&self) -> &'a PropertyMapping {
        self.ancestors.first().copied().unwrap_or(self.property)
    }
}

impl FeatureTypeMapping {
    /// Resolves `path` to exactly one mapped property.
    ///
    /// A leading step naming the feature type itself is skipped, so both
    /// `app:Road/app:name` and `app:name` resolve.
    pub fn resolve(&self, path: &PropertyPath) -> Result<ResolvedPath<'_>> {
        let mut steps = &path.steps[..];

        if steps.len() > 1 && steps[0].matches(&self.name) && self.property(&steps[0]).is_none() {
            steps = &steps[1..];
        }

        let not_mapped = || Error::property_not_mapped(&self.name, path);

        let (first, rest) = steps.split_first().ok_or_else(not_mapped)?;

        let mut joins = vec![];
        let mut ancestors = vec![];
        let mut property = self.find_unique(&self.properties, first, path)?;

        for step in rest {
            if !property.is_compound() {
                return Err(not_mapped());
            }
            joins.extend(property.joins.iter());
            ancestors.push(property);
            property = self.find_unique(property.children(), step, path)?;
        }

        joins.extend(property.joins.iter());

        Ok(ResolvedPath {
            joins,
            property,
            ancestors,
        })
    }

    fn find_unique<'a>(
        &self,
        candidates: &'a [PropertyMapping],
        step: &QName,
        path: &PropertyPath,
    ) -> Result<&'a PropertyMapping> {
        let mut matches = candidates.iter().filter(|p| p.name.matches(step));

        let found = matches
            .next()
            .ok_or_else(|| Error::property_not_mapped(&self.name, path))?;

        if matches.next().is_some() {
            return Err(Error::invalid_filter(format!(
                "property path `{path}` is ambiguous on feature type `{}`; qualify `{step}` with a namespace",
                self.name
            )));
        }

        Ok(found)
    }
}
