mod builder;
pub use builder::Builder;

mod connect;
pub use connect::Connect;

pub mod pool;
pub use pool::{Pool, PoolConfig, PoolConnection};

mod session;
pub use session::Session;

use crate::{
    engine::{QueryPlan, Translator},
    resolver::{ExternalFetcher, FeatureCache},
    services::{CrsTransformer, UnitConverter},
    FeatureStream, FeatureUpdate, Query, ResolveMode, Resolver, Result,
};

use geostore_core::{
    driver::{operation::QuerySql, Capability},
    err,
    feature::Object,
    stmt::Type,
    Error, Feature, Filter, MappedSchema,
};
use geostore_sql::Serializer;
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::OnceCell;

/// Shared state between all `Store` clones.
#[derive(Debug)]
pub(crate) struct Shared {
    pub(crate) schema: MappedSchema,
    pub(crate) pool: Pool,

    /// Reference lookups. A lookup never waits on another connection, so
    /// streams resolving references cannot starve each other here.
    pub(crate) lookup_pool: Pool,

    pub(crate) serializer: Serializer,

    /// Resolved reference targets
    pub(crate) cache: FeatureCache,

    /// Loads in progress, by cache key
    pub(crate) in_flight: Mutex<HashMap<String, Arc<OnceCell<Arc<Object>>>>>,

    pub(crate) fetcher: Option<Arc<dyn ExternalFetcher>>,
    pub(crate) units: Arc<dyn UnitConverter>,
    pub(crate) crs: Option<Arc<dyn CrsTransformer>>,

    /// Resolution for queries that do not choose one
    pub(crate) resolve: ResolveMode,

    pub(crate) native_paging: bool,
}

/// A feature store over one backend. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Store {
    pub(crate) shared: Arc<Shared>,
}

impl Store {
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Connects to the backend named by `config.url`. The backend's driver
    /// must be enabled as a crate feature.
    pub fn from_config(config: &crate::StoreConfig, schema: MappedSchema) -> Result<Store> {
        Builder::from_config(config).connect(schema, &config.url, config.fetch_size)
    }

    pub fn schema(&self) -> &MappedSchema {
        &self.shared.schema
    }

    pub fn capability(&self) -> &'static Capability {
        self.shared.pool.capability()
    }

    pub fn pool(&self) -> &Pool {
        &self.shared.pool
    }

    pub fn lookup_pool(&self) -> &Pool {
        &self.shared.lookup_pool
    }

    pub fn cache(&self) -> &FeatureCache {
        &self.shared.cache
    }

    pub fn serializer(&self) -> &Serializer {
        &self.shared.serializer
    }

    pub fn resolver(&self) -> Resolver {
        Resolver::new(self.clone())
    }

    pub fn translator(&self) -> Translator<'_> {
        Translator::new(&self.shared.schema, &*self.shared.units)
            .crs(self.shared.crs.as_deref())
            .native_paging(self.shared.native_paging)
            .row_identity(self.capability().row_identity)
    }

    /// Translates a query without running it.
    pub fn plan(&self, query: &Query) -> Result<QueryPlan> {
        self.translator().translate(query)
    }

    /// Runs a query, streaming the matching features.
    pub async fn query(&self, query: Query) -> Result<FeatureStream> {
        self.run(query, &self.shared.pool).await
    }

    /// Runs a reference lookup on the lookup pool.
    pub(crate) async fn lookup(&self, query: Query) -> Result<FeatureStream> {
        self.run(query, &self.shared.lookup_pool).await
    }

    async fn run(&self, query: Query, pool: &Pool) -> Result<FeatureStream> {
        let plan = Arc::new(self.plan(&query)?);
        let sql = self.shared.serializer.serialize(&plan.select_statement())?;

        let mut connection = pool.get().await?;
        let rows = connection
            .exec(
                QuerySql {
                    sql: sql.text,
                    params: sql.params,
                    ret: plan.column_types(),
                }
                .into(),
            )
            .await?
            .into_rows()?;

        Ok(FeatureStream::new(
            connection,
            rows,
            plan,
            query.resolve.unwrap_or(self.shared.resolve),
            self.resolver(),
        ))
    }

    pub async fn get_by_id(&self, type_name: &str, fid: &str) -> Result<Feature> {
        let query = Query::new(type_name).ids([fid]);

        match self.query(query).await?.next().await {
            Some(feature) => feature,
            None => Err(Error::record_not_found(format!(
                "type={type_name} fid={fid}"
            ))),
        }
    }

    /// Counts the features matching a query, ignoring its paging.
    pub async fn hits(&self, query: &Query) -> Result<u64> {
        let plan = self.plan(query)?;
        let sql = self.shared.serializer.serialize(&plan.count_statement())?;

        let mut connection = self.shared.pool.get().await?;
        let rows = connection
            .exec(
                QuerySql {
                    sql: sql.text,
                    params: sql.params,
                    ret: vec![Type::I64],
                }
                .into(),
            )
            .await?
            .into_rows()?
            .collect()
            .await?;

        let count = rows
            .first()
            .and_then(|row| row.first())
            .ok_or_else(|| err!("count query returned no rows"))?
            .to_i64()?;

        Ok(count.max(0) as u64)
    }

    /// Checks out a connection for a sequence of mutations.
    pub async fn session(&self) -> Result<Session> {
        let connection = self.shared.pool.get().await?;
        Ok(Session::new(self.clone(), connection))
    }

    /// Runs `f` in a transaction, committing when it succeeds and rolling
    /// back when it fails.
    pub async fn transaction<O>(
        &self,
        f: impl AsyncFnOnce(&mut Session) -> Result<O>,
    ) -> Result<O> {
        let mut session = self.session().await?;
        session.begin().await?;

        match f(&mut session).await {
            Ok(ret) => {
                session.commit().await?;
                Ok(ret)
            }
            Err(err) => {
                if let Err(rollback) = session.rollback().await {
                    tracing::warn!(error = %rollback, "rollback failed");
                }
                Err(err)
            }
        }
    }

    /// Inserts a feature with its child rows, returning the feature id.
    pub async fn insert(&self, feature: &Feature) -> Result<String> {
        self.transaction(async |session| session.insert(feature).await)
            .await
    }

    /// Returns the number of features updated, zero or one.
    pub async fn update(&self, update: &FeatureUpdate) -> Result<u64> {
        self.transaction(async |session| session.update(update).await)
            .await
    }

    /// Deletes the matching features, returning how many primary rows were
    /// removed.
    pub async fn delete(&self, type_name: &str, filter: &Filter) -> Result<u64> {
        self.transaction(async |session| session.delete(type_name, filter).await)
            .await
    }
}
