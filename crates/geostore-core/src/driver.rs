mod capability;
pub use capability::{Capability, Dialect};

mod response;
pub use response::{Response, Row, RowStream};

pub mod operation;
pub use operation::Operation;

use crate::{async_trait, Result};

use std::fmt::Debug;

#[async_trait]
pub trait Driver: Debug + Send + Sync + 'static {
    /// Opens a new connection. Called by the pool whenever it needs one.
    async fn connect(&self) -> Result<Box<dyn Connection>>;

    /// Describes the backend, which informs statement rendering and paging.
    fn capability(&self) -> &'static Capability;

    /// Upper bound on open connections, if the backend imposes one.
    fn max_connections(&self) -> Option<usize> {
        None
    }
}

#[async_trait]
pub trait Connection: Debug + Send + 'static {
    /// Executes an operation.
    ///
    /// A returned row stream does not borrow the connection, but the
    /// connection must stay checked out until the stream is dropped.
    async fn exec(&mut self, op: Operation) -> Result<Response>;
}
