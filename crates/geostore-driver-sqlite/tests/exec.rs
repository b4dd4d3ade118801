use geostore_core::{
    driver::{
        operation::{ExecSql, QuerySql, Transaction},
        Driver,
    },
    stmt::{Type, Value},
};
use geostore_driver_sqlite::Sqlite;

fn query(sql: &str, ret: Vec<Type>) -> QuerySql {
    QuerySql {
        sql: sql.to_string(),
        params: vec![],
        ret,
    }
}

fn exec(sql: &str, params: Vec<Value>) -> ExecSql {
    ExecSql {
        sql: sql.to_string(),
        params,
    }
}

#[tokio::test]
async fn in_memory_connections_share_a_database() {
    let driver = Sqlite::in_memory().unwrap();
    driver
        .execute_batch("CREATE TABLE roads (id INTEGER PRIMARY KEY, name TEXT)")
        .unwrap();

    let mut writer = driver.connect().await.unwrap();
    let count = writer
        .exec(
            exec(
                "INSERT INTO roads (id, name) VALUES (?1, ?2)",
                vec![Value::I64(1), Value::from("Main")],
            )
            .into(),
        )
        .await
        .unwrap()
        .into_count()
        .unwrap();
    assert_eq!(count, 1);

    let mut reader = driver.connect().await.unwrap();
    let rows = reader
        .exec(query("SELECT id, name FROM roads", vec![Type::String, Type::String]).into())
        .await
        .unwrap()
        .into_rows()
        .unwrap()
        .collect()
        .await
        .unwrap();

    assert_eq!(
        rows,
        vec![vec![Value::from("1"), Value::from("Main")]]
    );
}

#[tokio::test]
async fn separate_in_memory_drivers_are_isolated() {
    let a = Sqlite::in_memory().unwrap();
    let b = Sqlite::in_memory().unwrap();

    a.execute_batch("CREATE TABLE only_in_a (id INTEGER)").unwrap();
    assert!(b.execute_batch("SELECT * FROM only_in_a").is_err());
}

#[tokio::test]
async fn streams_more_rows_than_the_fetch_size() {
    let driver = Sqlite::in_memory().unwrap().fetch_size(2);
    driver
        .execute_batch(
            "CREATE TABLE n (v INTEGER);
             INSERT INTO n VALUES (1), (2), (3), (4), (5);",
        )
        .unwrap();

    let mut connection = driver.connect().await.unwrap();
    let rows = connection
        .exec(query("SELECT v FROM n ORDER BY v", vec![Type::I64]).into())
        .await
        .unwrap()
        .into_rows()
        .unwrap()
        .collect()
        .await
        .unwrap();

    let values: Vec<_> = rows.into_iter().map(|row| row[0].clone()).collect();
    assert_eq!(values, (1..=5).map(Value::I64).collect::<Vec<_>>());
}

#[tokio::test]
async fn query_errors_surface_before_rows() {
    let driver = Sqlite::in_memory().unwrap();
    let mut connection = driver.connect().await.unwrap();

    let err = connection
        .exec(query("SELECT * FROM missing", vec![Type::I64]).into())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("missing"));

    // The connection stays usable
    let rows = connection
        .exec(query("SELECT 1", vec![Type::I64]).into())
        .await
        .unwrap()
        .into_rows()
        .unwrap()
        .collect()
        .await
        .unwrap();
    assert_eq!(rows, vec![vec![Value::I64(1)]]);
}

#[tokio::test]
async fn rollback_discards_writes() {
    let driver = Sqlite::in_memory().unwrap();
    driver.execute_batch("CREATE TABLE t (v INTEGER)").unwrap();

    let mut connection = driver.connect().await.unwrap();
    connection.exec(Transaction::Start.into()).await.unwrap();
    connection
        .exec(exec("INSERT INTO t VALUES (?1)", vec![Value::I64(7)]).into())
        .await
        .unwrap();
    connection.exec(Transaction::Rollback.into()).await.unwrap();

    let rows = connection
        .exec(query("SELECT COUNT(*) FROM t", vec![Type::I64]).into())
        .await
        .unwrap()
        .into_rows()
        .unwrap()
        .collect()
        .await
        .unwrap();
    assert_eq!(rows, vec![vec![Value::I64(0)]]);
}

#[tokio::test]
async fn insert_returning_yields_the_generated_key() {
    let driver = Sqlite::in_memory().unwrap();
    driver
        .execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY AUTOINCREMENT, v TEXT)")
        .unwrap();

    let mut connection = driver.connect().await.unwrap();
    let rows = connection
        .exec(
            QuerySql {
                sql: "INSERT INTO t (v) VALUES (?1) RETURNING id".to_string(),
                params: vec![Value::from("x")],
                ret: vec![Type::I64],
            }
            .into(),
        )
        .await
        .unwrap()
        .into_rows()
        .unwrap()
        .collect()
        .await
        .unwrap();
    assert_eq!(rows, vec![vec![Value::I64(1)]]);
}
