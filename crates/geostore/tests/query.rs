mod support;

use geostore::{
    feature::PropertyValue,
    filter::Operand,
    stmt::Value,
    store::PoolConfig,
    Feature, Filter, Paging, Query, Store,
};
use pretty_assertions::assert_eq;
use std::time::Duration;

fn ids(features: &[Feature]) -> Vec<&str> {
    features.iter().map(|feature| feature.id.as_str()).collect()
}

fn strings(value: Option<&PropertyValue>) -> Vec<String> {
    value
        .and_then(PropertyValue::as_list)
        .unwrap_or_default()
        .iter()
        .map(|item| item.as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn streams_every_feature_in_id_order() {
    let store = support::store();

    let features = store
        .query(Query::new("app:Road"))
        .await
        .unwrap()
        .collect()
        .await
        .unwrap();

    assert_eq!(ids(&features), ["ROAD_1", "ROAD_2", "ROAD_3", "ROAD_4"]);

    let main = &features[0];
    assert_eq!(main.get("app:name").and_then(PropertyValue::as_str), Some("Main"));
    assert_eq!(
        main.get("app:width").and_then(PropertyValue::as_primitive),
        Some(&Value::F64(7.5))
    );

    // Null width and no child rows
    let foo = &features[3];
    assert!(foo.get("app:width").is_none());
    assert!(foo.get("app:lane").is_none());
    assert!(foo.get("app:tag").is_none());
}

#[tokio::test]
async fn numbered_elements_keep_their_position() {
    let store = support::store();

    let main = store.get_by_id("app:Road", "ROAD_1").await.unwrap();
    assert_eq!(strings(main.get("app:lane")), ["car", "bike", "bus"]);

    // Equal values at different positions stay separate elements
    let side = store.get_by_id("app:Road", "ROAD_2").await.unwrap();
    assert_eq!(strings(side.get("app:lane")), ["car", "car"]);
}

#[tokio::test]
async fn two_multi_valued_joins_do_not_multiply_elements() {
    let store = support::store();

    let features = store
        .query(
            Query::new("app:Road")
                .property("app:lane")
                .property("app:tag")
                .ids(["ROAD_1", "ROAD_2"]),
        )
        .await
        .unwrap()
        .collect()
        .await
        .unwrap();

    assert_eq!(ids(&features), ["ROAD_1", "ROAD_2"]);

    assert_eq!(strings(features[0].get("app:lane")), ["car", "bike", "bus"]);
    let mut tags = strings(features[0].get("app:tag"));
    tags.sort();
    assert_eq!(tags, ["lit", "paved"]);

    let mut tags = strings(features[1].get("app:tag"));
    tags.sort();
    assert_eq!(tags, ["gravel", "paved"]);
}

#[tokio::test]
async fn unordered_elements_keep_repeated_values() {
    let driver = support::database();
    driver
        .execute_batch(
            "INSERT INTO tags (road_id, label) VALUES (4, 'x'), (4, 'x'), (4, 'y'), (1, 'lit');",
        )
        .unwrap();
    let store = Store::builder().build(support::schema(), driver).unwrap();

    let foo = store.get_by_id("app:Road", "ROAD_4").await.unwrap();
    let mut tags = strings(foo.get("app:tag"));
    tags.sort();
    assert_eq!(tags, ["x", "x", "y"]);

    // Lanes multiply the rows of road 1 by three
    let main = store
        .query(
            Query::new("app:Road")
                .property("app:lane")
                .property("app:tag")
                .ids(["ROAD_1"]),
        )
        .await
        .unwrap()
        .collect()
        .await
        .unwrap();
    assert_eq!(strings(main[0].get("app:lane")), ["car", "bike", "bus"]);
    let mut tags = strings(main[0].get("app:tag"));
    tags.sort();
    assert_eq!(tags, ["lit", "lit", "paved"]);
}

#[tokio::test]
async fn filters_on_joined_properties_return_whole_features() {
    let store = support::store();

    let features = store
        .query(
            Query::new("app:Road").filter(Filter::eq(Operand::property("app:lane"), "bus")),
        )
        .await
        .unwrap()
        .collect()
        .await
        .unwrap();

    assert_eq!(ids(&features), ["ROAD_1"]);
    assert_eq!(strings(features[0].get("app:lane")), ["car", "bike", "bus"]);
}

#[tokio::test]
async fn hits_count_distinct_features() {
    let store = support::store();

    let cars = Query::new("app:Road").filter(Filter::eq(Operand::property("app:lane"), "car"));
    assert_eq!(store.hits(&cars).await.unwrap(), 2);

    let wide = Query::new("app:Road")
        .filter(Filter::gt(Operand::property("app:width"), 3.0))
        .limit(0);
    assert_eq!(store.hits(&wide).await.unwrap(), 1);
}

#[tokio::test]
async fn native_and_client_paging_agree() {
    let query = Query::new("app:Road").offset(1).limit(2);

    for paging in [Paging::Native, Paging::Client] {
        let store = support::store_with(|builder| {
            builder.paging(paging);
        });

        let features = store
            .query(query.clone())
            .await
            .unwrap()
            .collect()
            .await
            .unwrap();

        assert_eq!(ids(&features), ["ROAD_2", "ROAD_3"], "{paging:?}");
        assert_eq!(strings(features[0].get("app:lane")), ["car", "car"]);
    }
}

#[tokio::test]
async fn dropping_a_stream_releases_its_connection() {
    let store = support::store_with(|builder| {
        builder.pool_max_size(1);
    });

    let mut features = store.query(Query::new("app:Road")).await.unwrap();
    let first = features.next().await.unwrap().unwrap();
    assert_eq!(first.id, "ROAD_1");
    drop(features);

    let again = tokio::time::timeout(
        Duration::from_secs(5),
        store.get_by_id("app:Road", "ROAD_4"),
    )
    .await
    .expect("connection was not released")
    .unwrap();
    assert_eq!(again.id, "ROAD_4");
}

#[tokio::test]
async fn exhausted_pools_fail_the_checkout() {
    let store = support::store_with(|builder| {
        builder.pool(
            PoolConfig::new()
                .max_size(1)
                .wait_timeout(Duration::from_millis(50)),
        );
    });

    let session = store.session().await.unwrap();
    let err = store.query(Query::new("app:Road")).await.unwrap_err();
    assert!(err.is_connection_pool(), "{err}");

    drop(session);
    assert!(store.query(Query::new("app:Road")).await.is_ok());
}

#[tokio::test]
async fn missing_features_are_not_found() {
    let store = support::store();

    let err = store.get_by_id("app:Road", "ROAD_42").await.unwrap_err();
    assert!(err.is_record_not_found());
    assert_eq!(err.to_string(), "record not found: type=app:Road fid=ROAD_42");
}

#[tokio::test]
async fn unknown_feature_types_fail_before_running() {
    let store = support::store();
    assert!(store.query(Query::new("app:River")).await.is_err());
}
