use crate::{
    engine::{Materializer, QueryPlan},
    store::pool::PoolConnection,
    ResolveMode, Resolver, Result,
};

use geostore_core::{driver::RowStream, err, feature::ReferenceState, Feature};
use std::{fmt, pin::Pin, sync::Arc};
use tokio_stream::{Stream, StreamExt};

/// Features of a query, materialized as rows arrive.
///
/// The stream owns the pooled connection the query runs on. The connection
/// goes back to the pool when the stream is exhausted, fails or is dropped.
pub struct FeatureStream {
    inner: Pin<Box<dyn Stream<Item = Result<Feature>> + Send + 'static>>,
}

impl FeatureStream {
    pub(crate) fn new(
        connection: PoolConnection,
        rows: RowStream,
        plan: Arc<QueryPlan>,
        resolve: ResolveMode,
        resolver: Resolver,
    ) -> Self {
        Self {
            inner: Box::pin(features(connection, rows, plan, resolve, resolver)),
        }
    }

    pub async fn next(&mut self) -> Option<Result<Feature>> {
        StreamExt::next(&mut self.inner).await
    }

    /// Collects the remaining features.
    pub async fn collect(mut self) -> Result<Vec<Feature>> {
        let mut ret = vec![];
        while let Some(feature) = self.next().await {
            ret.push(feature?);
        }
        Ok(ret)
    }
}

impl Stream for FeatureStream {
    type Item = Result<Feature>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl fmt::Debug for FeatureStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureStream").finish()
    }
}

fn features(
    connection: PoolConnection,
    rows: RowStream,
    plan: Arc<QueryPlan>,
    resolve: ResolveMode,
    resolver: Resolver,
) -> impl Stream<Item = Result<Feature>> + Send + 'static {
    async_stream::try_stream! {
        // Held until the stream completes
        let _connection = connection;

        let mut rows = rows;
        let mut paging = ClientPaging::new(&plan);
        let mut materializer = Materializer::new(plan);

        while !paging.exhausted() {
            let Some(row) = rows.next().await else {
                if let Some(mut feature) = materializer.finish()? {
                    if paging.admit() {
                        resolve_references(&resolver, &mut feature, resolve).await?;
                        yield feature;
                    }
                }
                break;
            };

            if let Some(mut feature) = materializer.push_row(row?)? {
                if paging.admit() {
                    resolve_references(&resolver, &mut feature, resolve).await?;
                    yield feature;
                }
            }
        }
    }
}

/// Offset and limit applied to features, for backends (or configurations)
/// that do not page natively.
#[derive(Debug)]
struct ClientPaging {
    skip: u64,
    remaining: Option<u64>,
}

impl ClientPaging {
    fn new(plan: &QueryPlan) -> Self {
        if plan.native_paging || !plan.has_paging() {
            return Self {
                skip: 0,
                remaining: None,
            };
        }

        tracing::debug!(
            offset = plan.offset,
            limit = plan.limit,
            "backend does not page, paging while streaming"
        );

        Self {
            skip: plan.offset.unwrap_or(0),
            remaining: plan.limit,
        }
    }

    /// Whether the next feature belongs to the page.
    fn admit(&mut self) -> bool {
        if self.skip > 0 {
            self.skip -= 1;
            return false;
        }

        match &mut self.remaining {
            Some(0) => false,
            Some(remaining) => {
                *remaining -= 1;
                true
            }
            None => true,
        }
    }

    fn exhausted(&self) -> bool {
        self.remaining == Some(0)
    }
}

async fn resolve_references(
    resolver: &Resolver,
    feature: &mut Feature,
    mode: ResolveMode,
) -> Result<()> {
    if mode == ResolveMode::None {
        return Ok(());
    }

    let id = feature.id.clone();

    for reference in feature.references_mut() {
        if !reference.state.is_unresolved() {
            continue;
        }

        match resolver.resolve(&reference.handle).await {
            Ok(object) => reference.state = ReferenceState::Resolved(object),
            Err(error) if mode == ResolveMode::Lenient => {
                tracing::warn!(
                    feature = %id,
                    reference = %reference.handle,
                    %error,
                    "could not resolve reference"
                );
                reference.state = ReferenceState::Failed(error);
            }
            Err(error) => {
                return Err(error.context(err!(
                    "resolving `{}` on feature `{id}`",
                    reference.handle
                )))
            }
        }
    }

    Ok(())
}
