mod value;
pub(crate) use value::Value;

use geostore_core::{
    async_trait,
    driver::{
        operation::{ExecSql, Operation, QuerySql},
        Capability, Driver, Response, Row, RowStream,
    },
    stmt::Type,
    Error, Result,
};
use geostore_sql::Serializer;
use parking_lot::Mutex;
use rusqlite::{Connection as RusqliteConnection, OpenFlags};
use std::{
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::sync::{mpsc, oneshot};
use url::Url;

/// Rows buffered ahead of the consumer when none is configured.
const DEFAULT_FETCH_SIZE: usize = 256;

/// How long a statement waits on a lock held by another connection.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

static MEMORY_DATABASES: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug)]
pub struct Sqlite {
    target: Target,
    fetch_size: usize,
}

#[derive(Debug)]
enum Target {
    File(PathBuf),

    /// A named in-memory database in shared-cache mode, so that every pooled
    /// connection sees the same data. The keeper connection holds the
    /// database open for as long as the driver lives.
    InMemory {
        uri: String,
        _keeper: Mutex<RusqliteConnection>,
    },
}

impl Sqlite {
    /// Create a new SQLite driver from a connection URL, either
    /// `sqlite::memory:` or `sqlite:<path>`.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url_str = url.into();
        let url = Url::parse(&url_str).map_err(Error::driver_operation_failed)?;

        if url.scheme() != "sqlite" {
            return Err(Error::invalid_config(format!(
                "connection URL does not have a `sqlite` scheme; url={url_str}"
            )));
        }

        if url.path() == ":memory:" {
            Self::in_memory()
        } else {
            Ok(Self::open(url.path()))
        }
    }

    /// Create a fresh in-memory database.
    pub fn in_memory() -> Result<Self> {
        let n = MEMORY_DATABASES.fetch_add(1, Ordering::Relaxed);
        let uri = format!(
            "file:geostore_mem_{}_{n}?mode=memory&cache=shared",
            std::process::id()
        );
        let keeper = open(&uri)?;

        Ok(Self {
            target: Target::InMemory {
                uri,
                _keeper: Mutex::new(keeper),
            },
            fetch_size: DEFAULT_FETCH_SIZE,
        })
    }

    /// Open a SQLite database at the specified file path
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self {
            target: Target::File(path.as_ref().to_path_buf()),
            fetch_size: DEFAULT_FETCH_SIZE,
        }
    }

    /// Bounds the rows read ahead of the consumer of a query.
    pub fn fetch_size(mut self, fetch_size: usize) -> Self {
        self.fetch_size = fetch_size.max(1);
        self
    }

    /// Runs a script on a fresh connection, e.g. to create tables.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        let connection = self.open_connection()?;
        connection
            .execute_batch(sql)
            .map_err(Error::driver_operation_failed)
    }

    fn open_connection(&self) -> Result<RusqliteConnection> {
        match &self.target {
            Target::File(path) => {
                let connection =
                    RusqliteConnection::open(path).map_err(Error::driver_operation_failed)?;
                connection
                    .busy_timeout(BUSY_TIMEOUT)
                    .map_err(Error::driver_operation_failed)?;
                Ok(connection)
            }
            Target::InMemory { uri, .. } => open(uri),
        }
    }
}

fn open(uri: &str) -> Result<RusqliteConnection> {
    let connection = RusqliteConnection::open_with_flags(
        uri,
        OpenFlags::default() | OpenFlags::SQLITE_OPEN_URI,
    )
    .map_err(Error::driver_operation_failed)?;
    connection
        .busy_timeout(BUSY_TIMEOUT)
        .map_err(Error::driver_operation_failed)?;
    Ok(connection)
}

#[async_trait]
impl Driver for Sqlite {
    async fn connect(&self) -> Result<Box<dyn geostore_core::Connection>> {
        let connection = self.open_connection()?;
        tracing::trace!(database = self.target_name(), "sqlite connection opened");
        Ok(Box::new(Connection::new(connection, self.fetch_size)))
    }

    fn capability(&self) -> &'static Capability {
        &Capability::SQLITE
    }
}

impl Sqlite {
    fn target_name(&self) -> &str {
        match &self.target {
            Target::File(path) => path.to_str().unwrap_or("<non-utf8 path>"),
            Target::InMemory { uri, .. } => uri,
        }
    }
}

#[derive(Debug)]
pub struct Connection {
    connection: Arc<Mutex<RusqliteConnection>>,
    fetch_size: usize,
    serializer: Serializer,
}

impl Connection {
    pub fn new(connection: RusqliteConnection, fetch_size: usize) -> Self {
        Self {
            connection: Arc::new(Mutex::new(connection)),
            fetch_size,
            serializer: Serializer::sqlite(),
        }
    }

    /// Starts reading rows on a blocking thread. Returns once the statement
    /// is prepared and bound, so that SQL errors surface here rather than as
    /// the first row.
    async fn query(&self, op: QuerySql) -> Result<Response> {
        let connection = self.connection.clone();
        let (tx, mut rx) = mpsc::channel::<Result<Row>>(self.fetch_size);
        let (started_tx, started_rx) = oneshot::channel::<Result<()>>();

        tokio::task::spawn_blocking(move || {
            let connection = connection.lock();
            read_rows(&connection, op, started_tx, tx);
        });

        started_rx
            .await
            .map_err(|_| Error::driver_operation_failed(Disconnected))??;

        let rows = async_stream::stream! {
            while let Some(row) = rx.recv().await {
                yield row;
            }
        };

        Ok(Response::rows(RowStream::new(rows)))
    }

    async fn execute(&self, ops: Vec<ExecSql>) -> Result<u64> {
        let connection = self.connection.clone();

        tokio::task::spawn_blocking(move || {
            let connection = connection.lock();
            let mut count = 0;

            for op in ops {
                let mut stmt = connection
                    .prepare_cached(&op.sql)
                    .map_err(Error::driver_operation_failed)?;
                let params = op.params.into_iter().map(Value::from).collect::<Vec<_>>();
                count += stmt
                    .execute(rusqlite::params_from_iter(params.iter()))
                    .map_err(Error::driver_operation_failed)? as u64;
            }

            Ok(count)
        })
        .await
        .map_err(Error::driver_operation_failed)?
    }

    async fn execute_batch(&self, sql: String) -> Result<()> {
        let connection = self.connection.clone();

        tokio::task::spawn_blocking(move || {
            connection
                .lock()
                .execute_batch(&sql)
                .map_err(Error::driver_operation_failed)
        })
        .await
        .map_err(Error::driver_operation_failed)?
    }
}

#[async_trait]
impl geostore_core::driver::Connection for Connection {
    async fn exec(&mut self, op: Operation) -> Result<Response> {
        match op {
            Operation::Query(op) => self.query(op).await,
            Operation::Execute(op) => Ok(Response::count(self.execute(vec![op]).await?)),
            Operation::Batch(ops) => Ok(Response::count(self.execute(ops).await?)),
            Operation::Transaction(op) => {
                let sql = self.serializer.serialize_transaction(&op);
                self.execute_batch(sql).await?;
                Ok(Response::count(0))
            }
        }
    }
}

/// Steps through the result of `op`, sending rows until the consumer goes
/// away.
fn read_rows(
    connection: &RusqliteConnection,
    op: QuerySql,
    started: oneshot::Sender<Result<()>>,
    tx: mpsc::Sender<Result<Row>>,
) {
    let mut stmt = match connection.prepare_cached(&op.sql) {
        Ok(stmt) => stmt,
        Err(err) => {
            let _ = started.send(Err(Error::driver_operation_failed(err)));
            return;
        }
    };

    let width = stmt.column_count();
    if width != op.ret.len() {
        let _ = started.send(Err(Error::driver_operation_failed(ColumnMismatch {
            expected: op.ret.len(),
            actual: width,
        })));
        return;
    }

    let params = op.params.into_iter().map(Value::from).collect::<Vec<_>>();
    let mut rows = match stmt.query(rusqlite::params_from_iter(params.iter())) {
        Ok(rows) => rows,
        Err(err) => {
            let _ = started.send(Err(Error::driver_operation_failed(err)));
            return;
        }
    };

    if started.send(Ok(())).is_err() {
        return;
    }

    loop {
        let item = match rows.next() {
            Ok(Some(row)) => decode_row(row, &op.ret),
            Ok(None) => break,
            Err(err) => Err(Error::driver_operation_failed(err)),
        };

        let failed = item.is_err();
        if tx.blocking_send(item).is_err() {
            tracing::trace!("row consumer dropped, abandoning query");
            break;
        }
        if failed {
            break;
        }
    }
}

fn decode_row(row: &rusqlite::Row<'_>, ret: &[Type]) -> Result<Row> {
    ret.iter()
        .enumerate()
        .map(|(index, ty)| Value::from_sql(row, index, *ty).map(Value::into_inner))
        .collect()
}

#[derive(Debug)]
struct Disconnected;

impl std::error::Error for Disconnected {}

impl std::fmt::Display for Disconnected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("sqlite worker exited before the query started")
    }
}

#[derive(Debug)]
struct ColumnMismatch {
    expected: usize,
    actual: usize,
}

impl std::error::Error for ColumnMismatch {}

impl std::fmt::Display for ColumnMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "query returns {} columns, {} were described",
            self.actual, self.expected
        )
    }
}
