use super::{PoolConnection, Store};
use crate::{engine::MutationPlanner, FeatureUpdate, Result};

use geostore_core::{
    driver::operation::{ExecSql, QuerySql, Transaction},
    err,
    stmt::Statement,
    Error, Feature, Filter,
};

/// A checked-out connection for mutations.
///
/// Statements run in the order they are issued. The transaction is under
/// the caller's control; a session released with an open transaction is
/// rolled back before its connection is reused.
#[derive(Debug)]
pub struct Session {
    store: Store,
    connection: PoolConnection,
}

impl Session {
    pub(super) fn new(store: Store, connection: PoolConnection) -> Self {
        Self { store, connection }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn in_transaction(&self) -> bool {
        self.connection.in_transaction()
    }

    pub async fn begin(&mut self) -> Result<()> {
        self.connection.exec(Transaction::Start.into()).await?;
        self.connection.set_in_transaction(true);
        Ok(())
    }

    pub async fn commit(&mut self) -> Result<()> {
        self.connection.exec(Transaction::Commit.into()).await?;
        self.connection.set_in_transaction(false);
        Ok(())
    }

    pub async fn rollback(&mut self) -> Result<()> {
        self.connection.set_in_transaction(false);
        self.connection.exec(Transaction::Rollback.into()).await?;
        Ok(())
    }

    /// Inserts a feature and its child rows, returning the feature id.
    pub async fn insert(&mut self, feature: &Feature) -> Result<String> {
        let store = self.store.clone();
        let translator = store.translator();
        let rows = MutationPlanner::new(&translator, store.capability()).insert(feature)?;

        let key = match &rows.key {
            Some(key) => {
                self.execute(&rows.parent_statement()).await?;
                key.clone()
            }
            None => {
                let sql = store.serializer().serialize(&rows.parent_statement())?;
                let returned = self
                    .connection
                    .exec(
                        QuerySql {
                            sql: sql.text,
                            params: sql.params,
                            ret: vec![rows.id_ty],
                        }
                        .into(),
                    )
                    .await?
                    .into_rows()?
                    .collect()
                    .await?;

                returned
                    .into_iter()
                    .next()
                    .and_then(|row| row.into_iter().next())
                    .filter(|key| !key.is_null())
                    .ok_or_else(|| err!("insert into `{}` returned no key", rows.table))?
            }
        };

        for statement in rows.child_statements(&key)? {
            self.execute(&statement).await?;
        }

        let key = key
            .to_text()
            .ok_or_else(|| Error::type_conversion(&key, "string"))?;
        let fid = format!("{}{key}", rows.id_prefix);

        store.cache().remove(&fid);
        Ok(fid)
    }

    pub async fn update(&mut self, update: &FeatureUpdate) -> Result<u64> {
        let store = self.store.clone();
        let translator = store.translator();
        let statement = MutationPlanner::new(&translator, store.capability()).update(update)?;

        let count = self.execute(&statement).await?;
        store.cache().remove(&update.fid);
        Ok(count)
    }

    /// Deletes matching features, child rows first. Returns the number of
    /// primary rows removed.
    pub async fn delete(&mut self, type_name: &str, filter: &Filter) -> Result<u64> {
        let store = self.store.clone();
        let translator = store.translator();
        let planner = MutationPlanner::new(&translator, store.capability());

        let keyed;
        let filter = match planner.delete_keys(type_name, filter)? {
            Some(select) => {
                keyed = Filter::ResourceIds(self.keys(type_name, &select).await?);
                &keyed
            }
            None => filter,
        };

        let statements = planner.delete(type_name, filter)?;

        let mut count = 0;
        for statement in &statements {
            count = self.execute(statement).await?;
        }

        // Any cached feature may have been among the deleted ones
        store.cache().clear();
        Ok(count)
    }

    /// Runs a key select, returning the feature ids.
    async fn keys(&mut self, type_name: &str, select: &Statement) -> Result<Vec<String>> {
        let ty = self.store.schema().feature_type_by_name(type_name)?;
        let sql = self.store.serializer().serialize(select)?;

        let rows = self
            .connection
            .exec(
                QuerySql {
                    sql: sql.text,
                    params: sql.params,
                    ret: vec![ty.id.ty],
                }
                .into(),
            )
            .await?
            .into_rows()?
            .collect()
            .await?;

        let mut fids = vec![];
        for row in &rows {
            let Some(key) = row.first() else { continue };
            let key = key
                .to_text()
                .ok_or_else(|| Error::type_conversion(key, "string"))?;
            fids.push(format!("{}{key}", ty.id.prefix));
        }

        tracing::debug!(type_name, matched = fids.len(), "selected features to delete");
        Ok(fids)
    }

    async fn execute(&mut self, statement: &Statement) -> Result<u64> {
        let sql = self.store.serializer().serialize(statement)?;
        self.connection
            .exec(
                ExecSql {
                    sql: sql.text,
                    params: sql.params,
                }
                .into(),
            )
            .await?
            .into_count()
    }
}
