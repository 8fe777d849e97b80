use sqlx::PgPool;

/// Full bootstrap test: connect, migrate, verify schema.
#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_full_bootstrap(pool: PgPool) {
    mdrrmo_db::health_check(&pool).await.unwrap();

    let tables = [
        "users",
        "responders",
        "admins",
        "alerts",
        "responder_sessions",
        "responder_location_history",
        "pcr_forms",
        "notifications",
        "security_logs",
        "app_settings",
        "municipalities",
        "barangays",
    ];

    for table in tables {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap_or_else(|e| panic!("{table} query failed: {e}"));
        assert_eq!(count.0, 0, "{table} should start empty");
    }
}

/// The updated_at trigger fires on UPDATE.
#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_updated_at_trigger(pool: PgPool) {
    let (id, created): (i64, chrono::DateTime<chrono::Utc>) = sqlx::query_as(
        "INSERT INTO users (name, email, password_hash)
         VALUES ('Ana', 'ana@example.com', 'x')
         RETURNING id, updated_at",
    )
    .fetch_one(&pool)
    .await
    .unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(10)).await;

    let (updated,): (chrono::DateTime<chrono::Utc>,) =
        sqlx::query_as("UPDATE users SET name = 'Ana B' WHERE id = $1 RETURNING updated_at")
            .bind(id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(updated > created);
}
