use super::Serializer;
use crate::function::FunctionRegistry;

use geostore_core::driver::Dialect;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Flavor {
    Postgresql,
    Sqlite,
    Mysql,
}

impl Flavor {
    pub(super) fn dialect(self) -> Dialect {
        match self {
            Flavor::Postgresql => Dialect::Postgresql,
            Flavor::Sqlite => Dialect::Sqlite,
            Flavor::Mysql => Dialect::Mysql,
        }
    }
}

impl Serializer {
    pub fn sqlite() -> Serializer {
        Serializer::with_flavor(Flavor::Sqlite)
    }

    pub fn postgresql() -> Serializer {
        Serializer::with_flavor(Flavor::Postgresql)
    }

    pub fn mysql() -> Serializer {
        Serializer::with_flavor(Flavor::Mysql)
    }

    fn with_flavor(flavor: Flavor) -> Serializer {
        Serializer {
            flavor,
            functions: Arc::new(FunctionRegistry::builtin()),
            legacy_spatial: false,
        }
    }

    pub(super) fn is_mysql(&self) -> bool {
        self.flavor == Flavor::Mysql
    }

    pub(super) fn is_sqlite(&self) -> bool {
        self.flavor == Flavor::Sqlite
    }
}
