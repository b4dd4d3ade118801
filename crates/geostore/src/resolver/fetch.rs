use crate::Result;

use async_trait::async_trait;
use std::fmt::Debug;

/// Retrieves objects that do not live in this store, by href.
///
/// The bytes are returned as-is; interpreting the document is up to the
/// caller.
#[async_trait]
pub trait ExternalFetcher: Debug + Send + Sync + 'static {
    async fn fetch(&self, href: &str) -> Result<Vec<u8>>;
}
