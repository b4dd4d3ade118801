use super::{Connect, Pool, PoolConfig, Shared, Store};
use crate::{
    config::{Paging, StoreConfig},
    resolver::{ExternalFetcher, FeatureCache},
    services::{CrsTransformer, MetreConverter, UnitConverter},
    ResolveMode, Result,
};

use geostore_core::{driver::Driver, Error, MappedSchema};
use geostore_sql::{FunctionRegistry, Serializer};
use parking_lot::Mutex;
use std::{collections::HashMap, num::NonZeroUsize, sync::Arc, time::Duration};

#[derive(Debug)]
pub struct Builder {
    pool: PoolConfig,

    /// Connections for reference lookups
    lookup_pool: PoolConfig,

    cache_capacity: usize,
    resolve: ResolveMode,

    /// Overrides the backend's paging capability
    paging: Option<Paging>,

    legacy_spatial: bool,
    functions: Option<Arc<FunctionRegistry>>,
    fetcher: Option<Arc<dyn ExternalFetcher>>,
    units: Arc<dyn UnitConverter>,
    crs: Option<Arc<dyn CrsTransformer>>,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            pool: PoolConfig::default(),
            lookup_pool: PoolConfig::default(),
            cache_capacity: 1024,
            resolve: ResolveMode::default(),
            paging: None,
            legacy_spatial: false,
            functions: None,
            fetcher: None,
            units: Arc::new(MetreConverter),
            crs: None,
        }
    }
}

impl Builder {
    /// Starts from the engine settings of a store configuration.
    pub fn from_config(config: &StoreConfig) -> Self {
        let mut builder = Self::default();
        builder
            .cache_capacity(config.cache_capacity)
            .resolve(config.resolve)
            .legacy_spatial(config.legacy_spatial);

        if let Some(paging) = config.paging {
            builder.paging(paging);
        }

        if let Some(max_size) = config.pool_max_size {
            builder.pool_max_size(max_size);
        }

        if let Some(max_size) = config.lookup_pool_max_size {
            builder.lookup_pool(PoolConfig::new().max_size(max_size));
        }

        if let Some(millis) = config.pool_wait_timeout_ms {
            builder.pool_wait_timeout(Duration::from_millis(millis));
        }

        builder
    }

    pub fn pool(&mut self, config: PoolConfig) -> &mut Self {
        self.pool = config;
        self
    }

    pub fn pool_max_size(&mut self, max_size: usize) -> &mut Self {
        self.pool.max_size = max_size;
        self
    }

    /// Pool that resolved references are loaded through, apart from the
    /// connections held by feature streams.
    pub fn lookup_pool(&mut self, config: PoolConfig) -> &mut Self {
        self.lookup_pool = config;
        self
    }

    /// Bounds the wait for a connection, in both pools.
    pub fn pool_wait_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.pool.timeouts.wait = Some(timeout);
        self.lookup_pool.timeouts.wait = Some(timeout);
        self
    }

    /// Number of resolved reference targets kept in memory.
    pub fn cache_capacity(&mut self, capacity: usize) -> &mut Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn resolve(&mut self, mode: ResolveMode) -> &mut Self {
        self.resolve = mode;
        self
    }

    pub fn paging(&mut self, paging: Paging) -> &mut Self {
        self.paging = Some(paging);
        self
    }

    pub fn legacy_spatial(&mut self, legacy: bool) -> &mut Self {
        self.legacy_spatial = legacy;
        self
    }

    /// Replaces the builtin function providers.
    pub fn functions(&mut self, functions: FunctionRegistry) -> &mut Self {
        self.functions = Some(Arc::new(functions));
        self
    }

    pub fn fetcher(&mut self, fetcher: impl ExternalFetcher) -> &mut Self {
        self.fetcher = Some(Arc::new(fetcher));
        self
    }

    pub fn units(&mut self, units: impl UnitConverter) -> &mut Self {
        self.units = Arc::new(units);
        self
    }

    pub fn crs(&mut self, crs: impl CrsTransformer) -> &mut Self {
        self.crs = Some(Arc::new(crs));
        self
    }

    pub fn build(&self, schema: MappedSchema, driver: impl Driver) -> Result<Store> {
        let capacity = NonZeroUsize::new(self.cache_capacity)
            .ok_or_else(|| Error::invalid_config("cache_capacity must be at least 1"))?;

        let capability = driver.capability();
        let native_paging = match self.paging {
            Some(Paging::Native) => true,
            Some(Paging::Client) => false,
            None => capability.native_paging,
        };

        let mut serializer =
            Serializer::for_dialect(capability.dialect).legacy_spatial(self.legacy_spatial);
        if let Some(functions) = &self.functions {
            serializer = serializer.with_functions(functions.clone());
        }

        let driver: Arc<dyn Driver> = Arc::new(driver);
        let pool = Pool::with_driver(driver.clone(), self.pool.clone())?;
        let lookup_pool = Pool::with_driver(driver, self.lookup_pool.clone())?;

        tracing::debug!(
            dialect = ?capability.dialect,
            native_paging,
            cache_capacity = self.cache_capacity,
            feature_types = schema.feature_types().len(),
            "store built"
        );

        Ok(Store {
            shared: Arc::new(Shared {
                schema,
                pool,
                lookup_pool,
                serializer,
                cache: FeatureCache::new(capacity),
                in_flight: Mutex::new(HashMap::new()),
                fetcher: self.fetcher.clone(),
                units: self.units.clone(),
                crs: self.crs.clone(),
                resolve: self.resolve,
                native_paging,
            }),
        })
    }

    /// Builds a store over the backend named by a connection URL.
    pub fn connect(&self, schema: MappedSchema, url: &str, fetch_size: usize) -> Result<Store> {
        self.build(schema, Connect::new(url, fetch_size)?)
    }
}
