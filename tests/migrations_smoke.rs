use sqlx::Row;

fn database_url() -> String {
    // Integration tests do not load the app config, only the raw environment
    dotenvy::dotenv().ok();

    if let Ok(url) = std::env::var("DATABASE_URL") {
        if !url.trim().is_empty() {
            return url;
        }
    }

    let server = std::env::var("POSTGRES_SERVER").unwrap_or_else(|_| "localhost".into());
    let port = std::env::var("POSTGRES_PORT").unwrap_or_else(|_| "5432".into());
    let user = std::env::var("POSTGRES_USER").unwrap_or_else(|_| "exam_test".into());
    let password = std::env::var("POSTGRES_PASSWORD").unwrap_or_else(|_| "exam_test".into());
    let db = std::env::var("POSTGRES_DB").unwrap_or_else(|_| "exam_correction_test".into());

    format!("postgresql://{user}:{password}@{server}:{port}/{db}")
}

#[tokio::test]
async fn migrations_apply_and_tables_exist() -> anyhow::Result<()> {
    let pool =
        sqlx::postgres::PgPoolOptions::new().max_connections(1).connect(&database_url()).await?;

    let migrations_dir =
        std::env::var("EXAM_MIGRATIONS_DIR").unwrap_or_else(|_| "migrations".to_string());
    let migrator = sqlx::migrate::Migrator::new(std::path::Path::new(&migrations_dir)).await?;
    migrator.run(&pool).await?;

    for table in ["users", "exams", "copies", "claims"] {
        let row = sqlx::query("SELECT to_regclass($1)::text").bind(table).fetch_one(&pool).await?;
        let regclass: Option<String> = row.try_get(0)?;
        assert!(regclass.is_some(), "expected table {table} to exist after migrations");
    }

    let cascade: Option<String> = sqlx::query_scalar(
        "SELECT confdeltype::text FROM pg_constraint \
         WHERE conrelid = 'copies'::regclass AND contype = 'f'",
    )
    .fetch_optional(&pool)
    .await?;
    assert_eq!(cascade.as_deref(), Some("c"), "copies must cascade on exam delete");

    Ok(())
}
