use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Sqlite,
    Postgresql,
    Mysql,
}

impl Dialect {
    pub fn name(self) -> &'static str {
        match self {
            Dialect::Sqlite => "sqlite",
            Dialect::Postgresql => "postgresql",
            Dialect::Mysql => "mysql",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capability {
    pub dialect: Dialect,

    /// Supports `LIMIT`/`OFFSET`. When false, the executor skips and
    /// truncates rows itself.
    pub native_paging: bool,

    /// Supports `INSERT ... RETURNING`, required for backend-generated ids.
    pub returning: bool,

    /// Supports named sequences for id generation.
    pub sequences: bool,

    /// System column identifying a table row, e.g. `rowid`. Rendered through
    /// the `row_identity` function.
    pub row_identity: Option<&'static str>,
}

impl Capability {
    /// SQLite capabilities.
    pub const SQLITE: Self = Self {
        dialect: Dialect::Sqlite,
        native_paging: true,
        returning: true,
        sequences: false,
        row_identity: Some("rowid"),
    };

    /// PostgreSQL / PostGIS capabilities
    pub const POSTGRESQL: Self = Self {
        dialect: Dialect::Postgresql,
        sequences: true,
        row_identity: Some("ctid"),
        ..Self::SQLITE
    };

    /// MySQL capabilities
    pub const MYSQL: Self = Self {
        dialect: Dialect::Mysql,
        returning: false,
        row_identity: None,
        ..Self::SQLITE
    };
}
