use super::Join;

/// A table in a `FROM` clause or a mutation target.
///
/// `name` is the table name as configured and may carry a schema qualifier
/// (`gis.roads`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableRef {
    pub name: String,
    pub alias: Option<String>,
}

impl TableRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    pub fn aliased(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: Some(alias.into()),
        }
    }

    /// The name other clauses use to refer to this table.
    pub fn qualifier(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableWithJoins {
    /// Identify a table
    pub table: TableRef,

    /// Joins to apply
    pub joins: Vec<Join>,
}

impl From<TableRef> for TableWithJoins {
    fn from(table: TableRef) -> Self {
        Self {
            table,
            joins: vec![],
        }
    }
}
