#[macro_use]
mod fmt;
use fmt::ToSql;

mod delim;
use delim::{Comma, Delimited, Period};

mod flavor;
use flavor::Flavor;

mod params;
pub use params::{Params, Placeholder};

// Fragment serializers
mod expr;
mod statement;
mod value;

use crate::function::FunctionRegistry;

use geostore_core::{
    driver::{operation::Transaction, Dialect},
    stmt::{Expr, Statement, Value},
    Result,
};
use std::sync::Arc;

/// Rendered SQL text with the values bound to its placeholders, in
/// placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct Sql {
    pub text: String,
    pub params: Vec<Value>,
}

/// Serialize a statement to a SQL string
#[derive(Debug, Clone)]
pub struct Serializer {
    /// The database flavor handles the differences between SQL dialects and
    /// supported features.
    flavor: Flavor,

    /// Renders function calls and spatial operators
    functions: Arc<FunctionRegistry>,

    /// PostGIS: render spatial predicates without the `ST_` prefix
    legacy_spatial: bool,
}

struct Formatter<'a, T> {
    /// Handle to the serializer
    serializer: &'a Serializer,

    /// Where to write the serialized SQL
    dst: &'a mut String,

    /// Where to store parameters
    params: &'a mut T,
}

impl Serializer {
    pub fn for_dialect(dialect: Dialect) -> Serializer {
        match dialect {
            Dialect::Sqlite => Serializer::sqlite(),
            Dialect::Postgresql => Serializer::postgresql(),
            Dialect::Mysql => Serializer::mysql(),
        }
    }

    /// Replaces the function provider registry.
    pub fn with_functions(mut self, functions: Arc<FunctionRegistry>) -> Serializer {
        self.functions = functions;
        self
    }

    pub fn legacy_spatial(mut self, legacy: bool) -> Serializer {
        self.legacy_spatial = legacy;
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.flavor.dialect()
    }

    pub fn serialize(&self, stmt: &Statement) -> Result<Sql> {
        let mut params = vec![];
        let text = self.serialize_with(stmt, &mut params)?;
        tracing::debug!(sql = %text, params = params.len(), "serialized statement");
        Ok(Sql { text, params })
    }

    pub fn serialize_with(&self, stmt: &Statement, params: &mut impl Params) -> Result<String> {
        let mut ret = String::new();

        let mut fmt = Formatter {
            serializer: self,
            dst: &mut ret,
            params,
        };

        stmt.to_sql(&mut fmt)?;

        ret.push(';');
        Ok(ret)
    }

    /// Renders a single expression, e.g. a `WHERE` clause fragment.
    pub fn serialize_expr(&self, expr: &Expr) -> Result<(String, Vec<Value>)> {
        let mut ret = String::new();
        let mut params = vec![];

        let mut fmt = Formatter {
            serializer: self,
            dst: &mut ret,
            params: &mut params,
        };

        expr.to_sql(&mut fmt)?;
        Ok((ret, params))
    }

    /// Serialize a transaction control operation to a SQL string.
    ///
    /// MySQL uses `START TRANSACTION` while the other databases use `BEGIN`.
    pub fn serialize_transaction(&self, op: &Transaction) -> String {
        match op {
            Transaction::Start => match self.flavor {
                Flavor::Mysql => "START TRANSACTION".to_string(),
                Flavor::Postgresql | Flavor::Sqlite => "BEGIN".to_string(),
            },
            Transaction::Commit => "COMMIT".to_string(),
            Transaction::Rollback => "ROLLBACK".to_string(),
        }
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }
}
