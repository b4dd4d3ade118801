use super::Expr;

use std::fmt;

/// A column reference, qualified by optional schema and table.
///
/// Mapping expressions usually carry only the column name; the translator
/// fills in `table` with the alias it assigns to the owning table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprColumn {
    pub schema: Option<String>,
    pub table: Option<String>,
    pub column: String,
}

impl ExprColumn {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            schema: None,
            table: None,
            column: column.into(),
        }
    }

    pub fn qualified(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            schema: None,
            table: Some(table.into()),
            column: column.into(),
        }
    }

    /// Returns the same column re-qualified by `alias`, discarding any schema.
    pub fn with_alias(&self, alias: &str) -> Self {
        Self {
            schema: None,
            table: Some(alias.to_string()),
            column: self.column.clone(),
        }
    }
}

impl Expr {
    pub fn column(column: impl Into<String>) -> Self {
        ExprColumn::new(column).into()
    }

    pub fn qualified_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        ExprColumn::qualified(table, column).into()
    }
}

impl From<ExprColumn> for Expr {
    fn from(value: ExprColumn) -> Self {
        Self::Column(value)
    }
}

impl fmt::Display for ExprColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(schema) = &self.schema {
            write!(f, "{schema}.")?;
        }
        if let Some(table) = &self.table {
            write!(f, "{table}.")?;
        }
        f.write_str(&self.column)
    }
}
