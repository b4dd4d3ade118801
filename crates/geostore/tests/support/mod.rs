#![allow(dead_code)]

use geostore::{
    driver::{operation::Operation, Capability, Connection, Driver, Response},
    schema::{Builder as SchemaBuilder, MappingDocument},
    Builder, MappedSchema, Result, Store,
};
use geostore_core::async_trait;
use geostore_driver_sqlite::Sqlite;
use std::sync::{Arc, Mutex};

pub const MAPPING: &str = r#"{
    "namespaces": { "app": "http://example.com/app" },
    "feature_types": [
        {
            "name": "app:Road",
            "table": "roads",
            "id": { "column": "id", "prefix": "ROAD_", "type": "integer" },
            "properties": [
                { "name": "app:name", "kind": "primitive", "mapping": "name" },
                { "name": "app:width", "kind": "primitive", "mapping": "width", "type": "double" },
                { "name": "app:geometry", "kind": "geometry", "mapping": "geom", "srid": "EPSG:4326" },
                { "name": "app:start", "kind": "reference", "mapping": "start_id", "target": "app:Junction" },
                {
                    "name": "app:lane",
                    "kind": "primitive",
                    "mapping": "kind",
                    "max_occurs": "unbounded",
                    "joins": [{
                        "from": "roads", "to": "lanes",
                        "from_columns": ["id"], "to_columns": ["road_id"],
                        "order_columns": ["seq"], "numbered_order": true
                    }]
                },
                {
                    "name": "app:tag",
                    "kind": "primitive",
                    "mapping": "label",
                    "max_occurs": "unbounded",
                    "joins": [{
                        "from": "roads", "to": "tags",
                        "from_columns": ["id"], "to_columns": ["road_id"]
                    }]
                }
            ]
        },
        {
            "name": "app:Junction",
            "table": "junctions",
            "id": { "column": "id", "prefix": "JCT_", "type": "integer", "generator": "client" },
            "properties": [
                { "name": "app:name", "kind": "primitive", "mapping": "name" }
            ]
        }
    ]
}"#;

pub const SCHEMA_SQL: &str = "
    CREATE TABLE junctions (id INTEGER PRIMARY KEY, name TEXT);
    CREATE TABLE roads (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT,
        width REAL,
        geom BLOB,
        start_id INTEGER
    );
    CREATE TABLE lanes (road_id INTEGER, seq INTEGER, kind TEXT);
    CREATE TABLE tags (road_id INTEGER, label TEXT);
";

/// Four roads. Road 3 starts at a junction that does not exist; road 4 has
/// neither lanes nor tags.
pub const SEED_SQL: &str = "
    INSERT INTO junctions (id, name) VALUES (1, 'North'), (2, 'South');
    INSERT INTO roads (id, name, width, start_id) VALUES
        (1, 'Main', 7.5, 1),
        (2, 'Side', 3.0, 2),
        (3, 'Lane', 2.0, 99),
        (4, 'Foo', NULL, 1);
    INSERT INTO lanes (road_id, seq, kind) VALUES
        (1, 2, 'bus'), (1, 0, 'car'), (1, 1, 'bike'),
        (2, 0, 'car'), (2, 1, 'car');
    INSERT INTO tags (road_id, label) VALUES
        (1, 'paved'), (1, 'lit'),
        (2, 'paved'), (2, 'gravel');
";

/// Installs a subscriber honoring `RUST_LOG`, once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn schema() -> MappedSchema {
    let document: MappingDocument = serde_json::from_str(MAPPING).unwrap();
    SchemaBuilder::new().build(&document).unwrap()
}

/// A seeded in-memory database.
pub fn database() -> Sqlite {
    let driver = Sqlite::in_memory().unwrap();
    driver.execute_batch(SCHEMA_SQL).unwrap();
    driver.execute_batch(SEED_SQL).unwrap();
    driver
}

pub fn store() -> Store {
    init_tracing();
    Store::builder().build(schema(), database()).unwrap()
}

pub fn store_with(configure: impl FnOnce(&mut Builder)) -> Store {
    init_tracing();
    let mut builder = Store::builder();
    configure(&mut builder);
    builder.build(schema(), database()).unwrap()
}

/// Wraps a driver and records the SQL of every query.
#[derive(Debug)]
pub struct LoggingDriver {
    driver: Sqlite,
    log: Arc<Mutex<Vec<String>>>,
}

impl LoggingDriver {
    pub fn new(driver: Sqlite) -> (Self, QueryLog) {
        let log = Arc::new(Mutex::new(vec![]));
        let driver = Self {
            driver,
            log: log.clone(),
        };
        (driver, QueryLog { log })
    }
}

#[async_trait]
impl Driver for LoggingDriver {
    async fn connect(&self) -> Result<Box<dyn Connection>> {
        Ok(Box::new(LoggingConnection {
            connection: self.driver.connect().await?,
            log: self.log.clone(),
        }))
    }

    fn capability(&self) -> &'static Capability {
        self.driver.capability()
    }
}

#[derive(Debug)]
struct LoggingConnection {
    connection: Box<dyn Connection>,
    log: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Connection for LoggingConnection {
    async fn exec(&mut self, op: Operation) -> Result<Response> {
        if let Operation::Query(query) = &op {
            self.log.lock().unwrap().push(query.sql.clone());
        }
        self.connection.exec(op).await
    }
}

#[derive(Debug, Clone)]
pub struct QueryLog {
    log: Arc<Mutex<Vec<String>>>,
}

impl QueryLog {
    /// Queries whose SQL reads from `table`.
    pub fn count_from(&self, table: &str) -> usize {
        let needle = format!("FROM {table} ");
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|sql| sql.contains(&needle))
            .count()
    }

    pub fn clear(&self) {
        self.log.lock().unwrap().clear();
    }
}

pub fn logged_store(configure: impl FnOnce(&mut Builder)) -> (Store, QueryLog) {
    init_tracing();
    let (driver, log) = LoggingDriver::new(database());
    let mut builder = Store::builder();
    configure(&mut builder);
    (builder.build(schema(), driver).unwrap(), log)
}
