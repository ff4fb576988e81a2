use async_trait::async_trait;
use pgquery::{
    Condition, Database, DbError, DbResult, Outcome, Record, Registry, Statement, Value, qb,
};
use std::sync::{Arc, Mutex};

/// Records every call and answers with a fixed outcome.
struct RecordingDatabase {
    name: String,
    reply: Outcome,
    calls: Mutex<Vec<(String, Vec<Value>)>>,
    closed: Mutex<bool>,
}

impl RecordingDatabase {
    fn new(name: &str, reply: Outcome) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            reply,
            calls: Mutex::new(Vec::new()),
            closed: Mutex::new(false),
        })
    }

    fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Database for RecordingDatabase {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> DbResult<Outcome> {
        if *self.closed.lock().unwrap() {
            return Err(DbError::Pool("closed".into()));
        }
        self.calls
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));
        Ok(self.reply.clone())
    }

    fn close(&self) {
        *self.closed.lock().unwrap() = true;
    }
}

fn person(id: i64, name: &str) -> Record {
    [("personId", Value::Int(id)), ("name", Value::from(name))]
        .into_iter()
        .collect()
}

#[tokio::test]
async fn select_runs_on_main_by_default() -> DbResult<()> {
    let main = RecordingDatabase::new("main", Outcome::Rows(vec![person(1, "John")]));
    let mut registry = Registry::new();
    registry.register("main", main.clone());

    let rows = qb::select("PERSON")
        .add_condition(Condition::equals("id", 1))
        .execute(&registry)
        .await?
        .into_rows();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("name"), Some(&Value::from("John")));
    assert_eq!(
        main.calls(),
        vec![("SELECT * FROM PERSON WHERE id = ?".to_string(), vec![Value::Int(1)])]
    );
    Ok(())
}

#[tokio::test]
async fn statements_target_named_databases() -> DbResult<()> {
    let main = RecordingDatabase::new("main", Outcome::Count(0));
    let archive = RecordingDatabase::new("archive", Outcome::Count(1));
    let mut registry = Registry::new();
    registry.register("main", main.clone());
    registry.register("archive", archive.clone());

    let outcome = qb::insert("MESSAGE")
        .database("archive")
        .add_data(pgquery::data! { "chatId" => 3, "body" => "hi" }, None)
        .execute(&registry)
        .await?;

    assert_eq!(outcome.count(), 1);
    assert!(main.calls().is_empty());
    assert_eq!(
        archive.calls(),
        vec![(
            "INSERT INTO MESSAGE (chatId,body) VALUES (?,?)".to_string(),
            vec![Value::Int(3), Value::from("hi")]
        )]
    );
    Ok(())
}

#[tokio::test]
async fn unknown_database_is_reported() {
    let registry = Registry::new();
    let err = qb::select("PERSON").execute(&registry).await.unwrap_err();
    assert!(matches!(err, DbError::UnknownDatabase(name) if name == "main"));
}

#[tokio::test]
async fn build_errors_never_reach_the_database() {
    let main = RecordingDatabase::new("main", Outcome::Count(0));
    let mut registry = Registry::new();
    registry.register("main", main.clone());

    let err = qb::update("PERSON")
        .add_condition(Condition::equals("id", 1))
        .execute(&registry)
        .await
        .unwrap_err();
    assert!(err.is_structural());

    let err = qb::delete("PERSON").execute(&registry).await.unwrap_err();
    assert!(matches!(err, DbError::UnconditionedDelete(_)));

    assert!(main.calls().is_empty());
}

#[tokio::test]
async fn execute_on_explicit_handle() -> DbResult<()> {
    let db = RecordingDatabase::new("scratch", Outcome::Count(2));
    let outcome = qb::update("PERSON")
        .add_data([("name", "Johnny")], None)
        .add_condition(Condition::between("age", 18, 30))
        .execute_on(db.as_ref())
        .await?;

    assert_eq!(outcome, Outcome::Count(2));
    assert_eq!(
        db.calls(),
        vec![(
            "UPDATE PERSON SET name = ? WHERE age BETWEEN ? AND ?".to_string(),
            vec![Value::from("Johnny"), Value::Int(18), Value::Int(30)]
        )]
    );
    Ok(())
}

#[tokio::test]
async fn raw_sql_through_the_registry() -> DbResult<()> {
    let main = RecordingDatabase::new("main", Outcome::Rows(vec![person(2, "Mary")]));
    let mut registry = Registry::new();
    registry.register("main", main.clone());

    let sql = "SELECT * FROM MESSAGE WHERE chatId = ? AND created > ?";
    let outcome = registry
        .execute("main", sql, &[Value::Int(7), Value::Int(1_000)])
        .await?;

    assert_eq!(outcome.rows().len(), 1);
    assert_eq!(main.calls()[0].0, sql);
    Ok(())
}

#[tokio::test]
async fn close_and_remove_release_handles() {
    let main = RecordingDatabase::new("main", Outcome::Count(0));
    let other = RecordingDatabase::new("other", Outcome::Count(0));
    let mut registry = Registry::new();
    registry.register("main", main.clone());
    registry.register("other", other.clone());

    assert!(registry.remove("other").is_some());
    assert!(!registry.contains("other"));
    assert!(*other.closed.lock().unwrap());

    registry.close();
    assert_eq!(registry.names().count(), 0);
    assert!(main.execute("SELECT 1", &[]).await.is_err());
}
