//! Integration tests for schema initialization using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

#[tokio::test]
async fn schema_migration_applies_successfully() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    novum_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info = info.expect("INFO FOR DB should return a value");
    let info_str = format!("{:?}", info);

    for table in [
        "tenant",
        "person",
        "compliance_document",
        "training_record",
        "right_to_work_check",
        "compliance_task",
        "notification",
        "user_profile",
        "audit_log",
    ] {
        assert!(info_str.contains(table), "missing {table} table");
    }
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    novum_db::run_migrations(&db).await.unwrap();
    novum_db::run_migrations(&db).await.unwrap();
}

#[tokio::test]
async fn enum_fields_reject_unknown_values() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    novum_db::run_migrations(&db).await.unwrap();

    let result = db
        .query(
            "CREATE person SET tenant_id = 't', first_name = 'A', \
             last_name = 'B', person_type = 'contractor', stage = 'ongoing'",
        )
        .await
        .unwrap()
        .check();
    assert!(result.is_err(), "unknown person_type must be rejected");
}
