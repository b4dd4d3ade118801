mod support;

use geostore::{
    feature::{Object, PropertyValue, Reference, ReferenceHandle, ReferenceState},
    schema::QName,
    store::PoolConfig,
    ExternalFetcher, Feature, FeatureUpdate, Query, ResolveMode, Result,
};
use geostore_core::async_trait;
use pretty_assertions::assert_eq;
use std::time::Duration;

fn start(feature: &Feature) -> &Reference {
    feature
        .get("app:start")
        .and_then(PropertyValue::as_reference)
        .unwrap()
}

fn junction(fid: &str) -> ReferenceHandle {
    ReferenceHandle::local(Some(QName::parse("app:Junction")), fid)
}

fn resolved_name(reference: &Reference) -> Option<&str> {
    reference
        .object()?
        .as_feature()?
        .get("app:name")
        .and_then(PropertyValue::as_str)
}

#[tokio::test]
async fn references_stay_unresolved_by_default() {
    let (store, log) = support::logged_store(|_| {});

    let road = store.get_by_id("app:Road", "ROAD_1").await.unwrap();

    let reference = start(&road);
    assert!(reference.state.is_unresolved());
    assert_eq!(reference.handle.cache_key(), "JCT_1");
    assert_eq!(log.count_from("junctions"), 0);
}

#[tokio::test]
async fn lenient_resolution_records_failures() {
    let store = support::store_with(|builder| {
        builder.resolve(ResolveMode::Lenient);
    });

    let roads = store
        .query(Query::new("app:Road"))
        .await
        .unwrap()
        .collect()
        .await
        .unwrap();
    assert_eq!(roads.len(), 4);

    assert_eq!(resolved_name(start(&roads[0])), Some("North"));
    assert_eq!(resolved_name(start(&roads[1])), Some("South"));

    // ROAD_3 starts at a junction that does not exist
    let dangling = start(&roads[2]);
    assert!(dangling.state.is_failed());
    assert!(dangling.object().is_none());
}

#[tokio::test]
async fn strict_resolution_fails_the_stream() {
    let store = support::store();

    let err = store
        .query(Query::new("app:Road").resolve(ResolveMode::Strict))
        .await
        .unwrap()
        .collect()
        .await
        .unwrap_err();
    assert!(err.is_dangling_reference());

    let ok = store
        .query(
            Query::new("app:Road")
                .ids(["ROAD_1"])
                .resolve(ResolveMode::Strict),
        )
        .await
        .unwrap()
        .collect()
        .await
        .unwrap();
    assert_eq!(resolved_name(start(&ok[0])), Some("North"));
}

#[tokio::test]
async fn streams_resolve_with_a_single_pooled_connection() {
    let store = support::store_with(|builder| {
        builder.pool_max_size(1).resolve(ResolveMode::Lenient);
    });

    let roads = tokio::time::timeout(Duration::from_secs(5), async {
        store
            .query(Query::new("app:Road").ids(["ROAD_1"]))
            .await?
            .collect()
            .await
    })
    .await
    .expect("resolution waited on the stream's pool")
    .unwrap();

    assert_eq!(resolved_name(start(&roads[0])), Some("North"));
}

#[tokio::test]
async fn concurrent_resolving_streams_fill_the_pool() {
    let store = support::store_with(|builder| {
        builder.pool_max_size(2).resolve(ResolveMode::Lenient);
    });

    let collect = || async {
        store.query(Query::new("app:Road")).await?.collect().await
    };

    let (a, b) = tokio::time::timeout(Duration::from_secs(5), async {
        tokio::join!(collect(), collect())
    })
    .await
    .expect("resolving streams starved each other");

    let (a, b) = (a.unwrap(), b.unwrap());
    assert_eq!(a.len(), 4);
    assert_eq!(b.len(), 4);
    assert_eq!(resolved_name(start(&a[1])), Some("South"));
    assert_eq!(resolved_name(start(&b[1])), Some("South"));
}

#[tokio::test]
async fn exhausted_lookup_pool_fails_the_reference() {
    let store = support::store_with(|builder| {
        builder
            .lookup_pool(
                PoolConfig::new()
                    .max_size(1)
                    .wait_timeout(Duration::from_millis(50)),
            )
            .resolve(ResolveMode::Lenient);
    });

    let held = store.lookup_pool().get().await.unwrap();

    let roads = store
        .query(Query::new("app:Road").ids(["ROAD_1"]))
        .await
        .unwrap()
        .collect()
        .await
        .unwrap();

    match &start(&roads[0]).state {
        ReferenceState::Failed(error) => assert!(error.is_connection_pool(), "{error}"),
        state => panic!("expected a failed reference, got {state:?}"),
    }
    assert!(!store.cache().contains("JCT_1"));

    drop(held);
    let road = store.get_by_id("app:Road", "ROAD_1").await.unwrap();
    assert_eq!(resolved_name(start(&road)), Some("North"));
}

#[tokio::test]
async fn resolved_targets_are_cached() {
    let (store, log) = support::logged_store(|builder| {
        builder.resolve(ResolveMode::Lenient);
    });

    // ROAD_1 and ROAD_4 share a junction; JCT_99 fails and is not cached
    store
        .query(Query::new("app:Road"))
        .await
        .unwrap()
        .collect()
        .await
        .unwrap();
    assert_eq!(log.count_from("junctions"), 3);
    assert!(store.cache().contains("JCT_1"));
    assert!(store.cache().contains("JCT_2"));
    assert!(!store.cache().contains("JCT_99"));

    log.clear();
    store
        .query(Query::new("app:Road"))
        .await
        .unwrap()
        .collect()
        .await
        .unwrap();
    assert_eq!(log.count_from("junctions"), 1);
}

#[tokio::test]
async fn concurrent_misses_share_one_load() {
    let (store, log) = support::logged_store(|_| {});
    let resolver = store.resolver();
    let handle = junction("JCT_2");

    let (a, b) = tokio::join!(resolver.resolve(&handle), resolver.resolve(&handle));

    let (a, b) = (a.unwrap(), b.unwrap());
    assert_eq!(a, b);
    assert_eq!(a.as_feature().unwrap().id, "JCT_2");
    assert_eq!(log.count_from("junctions"), 1);
}

#[tokio::test]
async fn least_recently_used_targets_are_evicted() {
    let (store, log) = support::logged_store(|builder| {
        builder.cache_capacity(1);
    });
    let resolver = store.resolver();

    resolver.resolve(&junction("JCT_1")).await.unwrap();
    resolver.resolve(&junction("JCT_2")).await.unwrap();
    assert_eq!(store.cache().len(), 1);
    assert!(store.cache().contains("JCT_2"));

    resolver.resolve(&junction("JCT_1")).await.unwrap();
    assert_eq!(log.count_from("junctions"), 3);
}

#[tokio::test]
async fn handles_without_a_type_are_routed_by_prefix() {
    let store = support::store();

    let object = store
        .resolver()
        .resolve(&ReferenceHandle::local(None, "JCT_1"))
        .await
        .unwrap();
    assert_eq!(object.as_feature().unwrap().id, "JCT_1");

    let err = store
        .resolver()
        .resolve(&ReferenceHandle::local(None, "RIVER_1"))
        .await
        .unwrap_err();
    assert!(err.is_dangling_reference());
}

#[tokio::test]
async fn external_references_need_a_fetcher() {
    let store = support::store();

    let err = store
        .resolver()
        .resolve(&ReferenceHandle::external("http://example.com/junctions/7"))
        .await
        .unwrap_err();
    assert!(err.is_external_fetch());
}

#[derive(Debug)]
struct Echo;

#[async_trait]
impl ExternalFetcher for Echo {
    async fn fetch(&self, href: &str) -> Result<Vec<u8>> {
        Ok(href.as_bytes().to_vec())
    }
}

#[tokio::test]
async fn external_references_go_through_the_fetcher() {
    let store = support::store_with(|builder| {
        builder.fetcher(Echo);
    });
    let href = "http://example.com/junctions/7";

    let object = store
        .resolver()
        .resolve(&ReferenceHandle::external(href))
        .await
        .unwrap();
    assert_eq!(
        *object,
        Object::External {
            href: href.to_string(),
            bytes: href.as_bytes().to_vec(),
        }
    );
    assert!(store.cache().contains(href));
}

#[tokio::test]
async fn updates_invalidate_cached_targets() {
    let store = support::store();
    let resolver = store.resolver();

    let before = resolver.resolve(&junction("JCT_1")).await.unwrap();
    assert_eq!(
        before.as_feature().unwrap().get("app:name").and_then(PropertyValue::as_str),
        Some("North")
    );

    let update = FeatureUpdate::new("app:Junction", "JCT_1")
        .set("app:name", geostore::stmt::Value::from("Northgate"));
    assert_eq!(store.update(&update).await.unwrap(), 1);
    assert!(!store.cache().contains("JCT_1"));

    let after = resolver.resolve(&junction("JCT_1")).await.unwrap();
    assert_eq!(
        after.as_feature().unwrap().get("app:name").and_then(PropertyValue::as_str),
        Some("Northgate")
    );
}
