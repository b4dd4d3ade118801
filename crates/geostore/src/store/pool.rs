//! Connection pooling.

use crate::Result;

use geostore_core::{
    driver::{operation::Transaction, Capability, Connection, Driver},
    Error,
};
use std::{
    fmt,
    ops::{Deref, DerefMut},
    sync::Arc,
    time::Duration,
};

pub use deadpool::managed::Timeouts;

/// How long a checkout waits for a connection before failing.
const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Get the default maximum size of a pool, which is `cpu_core_count * 2`
/// including logical cores (Hyper-Threading).
fn get_default_pool_max_size() -> usize {
    deadpool::managed::PoolConfig::default().max_size
}

/// Configuration for connection pool behavior.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_size: usize,
    pub timeouts: Timeouts,
}

impl PoolConfig {
    pub fn new() -> Self {
        let mut timeouts = Timeouts::default();
        timeouts.wait = Some(DEFAULT_WAIT_TIMEOUT);

        Self {
            max_size: get_default_pool_max_size(),
            timeouts,
        }
    }

    pub fn max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// Bounds the wait for a free connection. An exhausted pool then fails
    /// the checkout with a `connection_pool` error.
    pub fn wait_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.wait = Some(timeout);
        self
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// The only shared mutable resource on the query path. Connections are
/// checked out per request and return on drop.
#[derive(Debug)]
pub struct Pool {
    inner: deadpool::managed::Pool<Manager>,
    capability: &'static Capability,
}

impl Pool {
    /// Creates a new connection pool from the given driver.
    ///
    /// The driver's own connection limit wins over `config.max_size` when it
    /// is lower.
    pub fn new(driver: impl Driver, config: PoolConfig) -> Result<Self> {
        Self::with_driver(Arc::new(driver), config)
    }

    /// Creates a pool over a driver that other pools may share.
    pub fn with_driver(driver: Arc<dyn Driver>, config: PoolConfig) -> Result<Self> {
        let capability = driver.capability();
        let max_size = match driver.max_connections() {
            Some(max_connections) => max_connections.min(config.max_size),
            None => config.max_size,
        };

        let inner = deadpool::managed::Pool::builder(Manager { driver })
            .runtime(deadpool::Runtime::Tokio1)
            .max_size(max_size)
            .timeouts(config.timeouts)
            .build()
            .map_err(Error::connection_pool)?;

        Ok(Self { inner, capability })
    }

    /// Retrieves a connection from the pool.
    pub async fn get(&self) -> Result<PoolConnection> {
        let connection = self.inner.get().await.map_err(Error::connection_pool)?;
        tracing::trace!(
            available = self.inner.status().available,
            "connection checked out"
        );
        Ok(PoolConnection { inner: connection })
    }

    /// Returns the database driver's capabilities.
    pub fn capability(&self) -> &'static Capability {
        self.capability
    }

    /// Connections currently idle in the pool.
    pub fn idle(&self) -> usize {
        self.inner.status().available
    }
}

#[derive(Debug)]
struct Manager {
    driver: Arc<dyn Driver>,
}

#[derive(Debug)]
struct Pooled {
    connection: Box<dyn Connection>,

    /// A transaction was started and not yet ended
    in_transaction: bool,
}

impl deadpool::managed::Manager for Manager {
    type Type = Pooled;
    type Error = Error;

    async fn create(&self) -> Result<Self::Type> {
        Ok(Pooled {
            connection: self.driver.connect().await?,
            in_transaction: false,
        })
    }

    async fn recycle(
        &self,
        obj: &mut Self::Type,
        _metrics: &deadpool::managed::Metrics,
    ) -> deadpool::managed::RecycleResult<Self::Error> {
        if obj.in_transaction {
            tracing::warn!("connection returned with an open transaction, rolling back");
            obj.connection.exec(Transaction::Rollback.into()).await?;
            obj.in_transaction = false;
        }
        Ok(())
    }
}

/// A connection retrieved from a pool.
///
/// When dropped, the connection is returned to the pool for reuse. This
/// holds on every exit path: completion, error, and a dropped stream.
pub struct PoolConnection {
    inner: deadpool::managed::Object<Manager>,
}

impl Drop for PoolConnection {
    fn drop(&mut self) {
        tracing::trace!("connection released");
    }
}

impl fmt::Debug for PoolConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PoolConnection").field(&*self.inner).finish()
    }
}

impl PoolConnection {
    /// Records that a transaction is open, so that the connection is rolled
    /// back before reuse if it is released without commit or rollback.
    pub(crate) fn set_in_transaction(&mut self, in_transaction: bool) {
        self.inner.in_transaction = in_transaction;
    }

    pub(crate) fn in_transaction(&self) -> bool {
        self.inner.in_transaction
    }
}

impl Deref for PoolConnection {
    type Target = Box<dyn Connection>;

    fn deref(&self) -> &Self::Target {
        &self.inner.connection
    }
}

impl DerefMut for PoolConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner.connection
    }
}
