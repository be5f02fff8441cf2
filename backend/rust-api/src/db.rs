//! SQLite pool construction and schema creation.

use std::{path::Path, time::Duration};

use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};
use tracing::info;

use crate::error::CatalogResult;

const MAX_CONNECTIONS: u32 = 10;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open (creating if needed) the catalog database and ensure all tables exist.
pub async fn init_database(db_path: &Path) -> CatalogResult<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;

    Ok(pool)
}

/// Idempotent; safe to run on every start.
pub async fn create_schema(pool: &SqlitePool) -> CatalogResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS words (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            text TEXT NOT NULL,
            difficulty TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS images (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            file_path TEXT NOT NULL,
            description TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS combos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            word_id INTEGER NOT NULL REFERENCES words (id),
            image_id INTEGER NOT NULL REFERENCES images (id),
            UNIQUE (word_id, image_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER,
            combo_id INTEGER NOT NULL REFERENCES combos (id),
            date TEXT NOT NULL,
            completed BOOLEAN NOT NULL DEFAULT 0,
            correct BOOLEAN NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_tasks_user_date ON tasks (user_id, date)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT,
            consecutive_correct INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    migrate_users_streak_column(pool).await?;

    Ok(())
}

/// Databases created before streak tracking have a `users` table without
/// `consecutive_correct`.
async fn migrate_users_streak_column(pool: &SqlitePool) -> CatalogResult<()> {
    let present: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM pragma_table_info('users') WHERE name = 'consecutive_correct'",
    )
    .fetch_one(pool)
    .await?;

    if present == 0 {
        sqlx::query(
            "ALTER TABLE users ADD COLUMN consecutive_correct INTEGER NOT NULL DEFAULT 0",
        )
        .execute(pool)
        .await?;
        info!("Added users.consecutive_correct column");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_database_file_and_tables() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("bee.db");

        let pool = init_database(&db_path).await.unwrap();
        assert!(db_path.exists());

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(tables, vec!["combos", "images", "tasks", "users", "words"]);
    }

    #[tokio::test]
    async fn reopening_existing_database_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("bee.db");

        let first = init_database(&db_path).await.unwrap();
        sqlx::query("INSERT INTO words (text, difficulty) VALUES ('CAT', 'easy')")
            .execute(&first)
            .await
            .unwrap();
        first.close().await;

        let second = init_database(&db_path).await.unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM words")
            .fetch_one(&second)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn legacy_users_table_gains_streak_column() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("legacy.db");

        let legacy = SqlitePoolOptions::new()
            .connect_with(
                SqliteConnectOptions::new()
                    .filename(&db_path)
                    .create_if_missing(true),
            )
            .await
            .unwrap();
        sqlx::query("CREATE TABLE users (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT)")
            .execute(&legacy)
            .await
            .unwrap();
        sqlx::query("INSERT INTO users (id, name) VALUES (1, 'Default User')")
            .execute(&legacy)
            .await
            .unwrap();
        legacy.close().await;

        let pool = init_database(&db_path).await.unwrap();
        let streak: i64 = sqlx::query_scalar("SELECT consecutive_correct FROM users WHERE id = 1")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(streak, 0);

        let store = crate::services::catalog_store::CatalogStore::new(pool.clone());
        let update = crate::services::progress_tracker::ProgressTracker::new(store)
            .record_answer(1, true)
            .await
            .unwrap();
        assert_eq!(update.consecutive_correct, 1);
        pool.close().await;

        // A second start finds the column and leaves it alone.
        let reopened = init_database(&db_path).await.unwrap();
        let columns: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM pragma_table_info('users') WHERE name = 'consecutive_correct'",
        )
        .fetch_one(&reopened)
        .await
        .unwrap();
        assert_eq!(columns, 1);
    }
}
