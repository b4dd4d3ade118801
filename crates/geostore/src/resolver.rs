//! Lazy resolution of references between features.

mod cache;
pub use cache::FeatureCache;

mod fetch;
pub use fetch::ExternalFetcher;

use crate::{Query, ResolveMode, Result, Store};

use async_recursion::async_recursion;
use geostore_core::{
    feature::{Object, ReferenceHandle},
    Error,
};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Loads the targets of references, through the store's cache.
///
/// Concurrent misses on the same target share a single load.
#[derive(Debug, Clone)]
pub struct Resolver {
    store: Store,
}

impl Resolver {
    pub(crate) fn new(store: Store) -> Self {
        Self { store }
    }

    #[async_recursion]
    pub async fn resolve(&self, handle: &ReferenceHandle) -> Result<Arc<Object>> {
        let shared = &self.store.shared;
        let key = handle.cache_key();

        if let Some(object) = shared.cache.get(key) {
            tracing::trace!(reference = %handle, "reference cache hit");
            return Ok(object);
        }

        let cell = shared
            .in_flight
            .lock()
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        let result = cell.get_or_try_init(|| self.load(handle)).await.cloned();

        if let Ok(object) = &result {
            shared.cache.insert(key, object.clone());
        }

        // Only the entry this call waited on; a later miss may have started
        // a new load already.
        {
            let mut in_flight = shared.in_flight.lock();
            if in_flight
                .get(key)
                .is_some_and(|current| Arc::ptr_eq(current, &cell))
            {
                in_flight.remove(key);
            }
        }

        result
    }

    async fn load(&self, handle: &ReferenceHandle) -> Result<Arc<Object>> {
        tracing::debug!(reference = %handle, "resolving reference");

        match handle {
            ReferenceHandle::Local { type_name, fid } => {
                let schema = self.store.schema();
                let ty = match type_name {
                    Some(name) => schema.feature_type(name),
                    None => schema.type_for_fid(fid),
                }
                .ok_or_else(|| Error::dangling_reference(handle.to_string()))?;

                let query = Query::new(ty.name.to_string())
                    .ids([fid.as_str()])
                    .resolve(ResolveMode::None);

                let mut features = self.store.lookup(query).await?;
                match features.next().await {
                    Some(feature) => Ok(Arc::new(Object::Feature(feature?))),
                    None => Err(Error::dangling_reference(handle.to_string())),
                }
            }
            ReferenceHandle::External { href } => {
                let Some(fetcher) = &self.store.shared.fetcher else {
                    return Err(Error::external_fetch(
                        href.as_str(),
                        "no external fetcher is configured",
                    ));
                };

                let bytes = fetcher
                    .fetch(href)
                    .await
                    .map_err(|err| Error::external_fetch(href.as_str(), err))?;

                Ok(Arc::new(Object::External {
                    href: href.clone(),
                    bytes,
                }))
            }
        }
    }
}
