use pgquery::{
    Condition, Database, DbError, DbResult, PgDatabase, Registry, RegistryConfig, Statement, Value,
    qb,
};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

fn registry_from_env() -> Option<Registry> {
    let _ = dotenvy::dotenv();
    let config = match RegistryConfig::from_env() {
        Ok(config) => config,
        Err(_) => {
            eprintln!("DATABASE_URL is not set; skipping postgres round trip");
            return None;
        }
    };
    Registry::from_config(&config).ok()
}

fn unique_table(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before UNIX_EPOCH")
        .as_nanos();
    format!("{prefix}_{}_{}", std::process::id(), nanos)
}

#[tokio::test]
async fn crud_round_trip() -> DbResult<()> {
    let Some(mut registry) = registry_from_env() else {
        return Ok(());
    };
    let table = unique_table("pgquery_person");

    registry
        .execute(
            "main",
            &format!(
                "CREATE TABLE {table} (person_id BIGINT PRIMARY KEY, name VARCHAR(50), \
                 age INTEGER, score DOUBLE PRECISION, active BOOLEAN, created TIMESTAMP, tag UUID, price NUMERIC(10,2))"
            ),
            &[],
        )
        .await?;

    let inserted = qb::insert(&table)
        .add_data(
            pgquery::data! {
                "person_id" => 1,
                "name" => "John",
                "age" => "30",
                "score" => 4,
                "active" => "yes",
                "created" => "2010-03-04 05:06:07",
                "tag" => "67e55044-10b1-426f-9247-bb680e5fe0c8",
                "price" => 12.5,
            },
            None,
        )
        .execute(&registry)
        .await?;
    assert_eq!(inserted.count(), 1);

    qb::insert(&table)
        .add_data([("person_id", Value::Int(2)), ("name", Value::from("Mary")), ("age", Value::Null)], None)
        .execute(&registry)
        .await?;

    let rows = qb::select(&table)
        .add_condition(Condition::equals("person_id", 1))
        .execute(&registry)
        .await?
        .into_rows();
    assert_eq!(rows.len(), 1);
    let john = &rows[0];
    assert_eq!(john.get("personId"), Some(&Value::Int(1)));
    assert_eq!(john.get("age"), Some(&Value::Int(30)));
    assert_eq!(john.get("score"), Some(&Value::Float(4.0)));
    assert_eq!(john.get("active"), Some(&Value::Bool(true)));
    assert!(john.get("created").and_then(Value::as_timestamp).is_some());
    assert_eq!(
        john.get("tag"),
        Some(&Value::from("67e55044-10b1-426f-9247-bb680e5fe0c8"))
    );
    assert_eq!(john.get("price"), Some(&Value::from("12.50")));

    let updated = qb::update(&table)
        .add_data([("name", "Johnny")], None)
        .add_condition(Condition::or(vec![
            Condition::equals("person_id", 1),
            Condition::greater("age", 100),
        ]))
        .execute(&registry)
        .await?;
    assert_eq!(updated.count(), 1);

    let rows = qb::select(&table)
        .add_column("name")
        .add_condition(Condition::less_or_equals("person_id", 2))
        .execute(&registry)
        .await?
        .into_rows();
    let names: Vec<_> = rows.iter().filter_map(|r| r.get("name").cloned()).collect();
    assert!(names.contains(&Value::from("Johnny")));
    assert!(names.contains(&Value::from("Mary")));

    let mary = qb::select(&table)
        .add_data([("person_id", 2)], None)
        .execute(&registry)
        .await?
        .into_rows();
    assert_eq!(mary[0].get("age"), Some(&Value::Null));

    let deleted = qb::delete(&table)
        .add_condition(Condition::between("person_id", 1, 2))
        .execute(&registry)
        .await?;
    assert_eq!(deleted.count(), 2);

    registry.execute("main", &format!("DROP TABLE {table}"), &[]).await?;
    registry.close();
    Ok(())
}

#[tokio::test]
async fn driver_and_binding_errors_surface() -> DbResult<()> {
    let Some(mut registry) = registry_from_env() else {
        return Ok(());
    };

    let err = registry
        .execute("main", "SELECT * FROM pgquery_missing_table_xyz", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Database(msg) if msg.contains("42P01")));

    let err = registry
        .execute("main", "SELECT ?::int4", &[Value::Int(1), Value::Int(2)])
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::ParameterCountMismatch { expected: 1, actual: 2 }));

    let err = registry
        .execute("main", "SELECT ?::int2", &[Value::from("not a number")])
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Coercion { position: 1, .. }));

    registry.close();
    Ok(())
}

#[tokio::test]
async fn describes_parameters_and_fetch_limit() -> DbResult<()> {
    let _ = dotenvy::dotenv();
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL is not set; skipping describes_parameters_and_fetch_limit");
        return Ok(());
    };

    let db = PgDatabase::new("main", pgquery::create_pool(&url)?).fetch_limit(3);
    let types = db.describe_parameters("SELECT ?::int8, ?::text, ?::timestamptz").await?;
    assert_eq!(
        types,
        vec![pgquery::SqlType::BigInt, pgquery::SqlType::Text, pgquery::SqlType::TimestampTz]
    );

    let columns = db.describe_columns("SELECT 1::int4 AS person_id").await?;
    assert_eq!(pgquery::camel_case(&columns[0].name), "personId");

    let outcome = db
        .execute("SELECT g AS row_no FROM generate_series(1, 10) g", &[])
        .await?;
    assert_eq!(outcome.rows().len(), 3);
    assert_eq!(outcome.rows()[0].get("rowNo"), Some(&Value::Int(1)));

    let shared: Arc<dyn Database> = Arc::new(db);
    shared.close();
    assert!(shared.execute("SELECT 1", &[]).await.is_err());
    Ok(())
}
