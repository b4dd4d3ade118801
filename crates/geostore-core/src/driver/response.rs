use crate::{stmt::Value, Result};

use std::{fmt, pin::Pin};
use tokio_stream::Stream;

/// One result row, decoded according to the requested column types.
pub type Row = Vec<Value>;

/// A forward-only stream of rows.
pub struct RowStream {
    inner: Pin<Box<dyn Stream<Item = Result<Row>> + Send + 'static>>,
}

impl RowStream {
    pub fn new(stream: impl Stream<Item = Result<Row>> + Send + 'static) -> Self {
        Self {
            inner: Box::pin(stream),
        }
    }

    pub fn from_vec(rows: Vec<Row>) -> Self {
        Self::new(tokio_stream::iter(rows.into_iter().map(Ok)))
    }

    /// Collects the whole stream. Only for small, bounded results.
    pub async fn collect(mut self) -> Result<Vec<Row>> {
        use tokio_stream::StreamExt;

        let mut rows = vec![];
        while let Some(row) = self.next().await {
            rows.push(row?);
        }
        Ok(rows)
    }
}

impl Stream for RowStream {
    type Item = Result<Row>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl fmt::Debug for RowStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowStream").finish()
    }
}

#[derive(Debug)]
pub enum Response {
    /// Number of rows impacted by the operation
    Count(u64),

    /// Operation result, as a stream of rows
    Rows(RowStream),
}

impl Response {
    pub fn count(count: u64) -> Self {
        Self::Count(count)
    }

    pub fn rows(rows: RowStream) -> Self {
        Self::Rows(rows)
    }

    pub fn is_count(&self) -> bool {
        matches!(self, Self::Count(_))
    }

    pub fn into_count(self) -> Result<u64> {
        match self {
            Self::Count(count) => Ok(count),
            Self::Rows(_) => Err(crate::err!("expected a row count, got a row stream")),
        }
    }

    pub fn into_rows(self) -> Result<RowStream> {
        match self {
            Self::Rows(rows) => Ok(rows),
            Self::Count(_) => Err(crate::err!("expected a row stream, got a row count")),
        }
    }
}
