use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};

use crate::error::{CatalogError, CatalogResult};
use crate::metrics::track_db_operation;
use crate::models::{
    stats::{DifficultyStats, OverallStats, UserStats},
    Combo, ComboDetail, Difficulty, Image, PuzzleRecord, Task, User, Word,
};

/// Number of recent combos a player is shielded from seeing again.
pub const RECENT_COMBO_WINDOW: i64 = 10;

const COMBO_DETAIL_SELECT: &str = r#"
    SELECT c.id, w.text, w.difficulty, i.file_path, i.description
    FROM combos c
    JOIN words w ON c.word_id = w.id
    JOIN images i ON c.image_id = i.id
"#;

/// Row counts per catalog table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct CatalogCounts {
    pub words: i64,
    pub images: i64,
    pub combos: i64,
    pub tasks: i64,
}

/// Fields of one puzzle as written to the words/images tables.
#[derive(Debug, Clone)]
pub struct NewPuzzle {
    pub word: String,
    pub difficulty: Difficulty,
    pub image_name: String,
    pub image_description: String,
}

/// What recording an answer did to its task row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Recorded,
    AlreadyCompleted,
    Missing,
}

/// Relational persistence for words, images, combos, tasks and users.
///
/// Holds only a pool handle; every call checks a connection out for the
/// duration of the operation. Multi-row mutations run in a transaction that
/// rolls back when dropped without commit.
#[derive(Clone)]
pub struct CatalogStore {
    pool: SqlitePool,
}

impl CatalogStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn create_word(&self, text: &str, difficulty: Difficulty) -> CatalogResult<i64> {
        Ok(insert_word(&self.pool, text, difficulty).await?)
    }

    pub async fn create_image(&self, file_path: &str, description: &str) -> CatalogResult<i64> {
        Ok(insert_image(&self.pool, file_path, description).await?)
    }

    pub async fn create_combo(&self, word_id: i64, image_id: i64) -> CatalogResult<i64> {
        Ok(insert_combo(&self.pool, word_id, image_id).await?)
    }

    pub async fn get_word(&self, word_id: i64) -> CatalogResult<Option<Word>> {
        let word = sqlx::query_as::<_, Word>("SELECT id, text, difficulty FROM words WHERE id = ?")
            .bind(word_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(word)
    }

    pub async fn get_image(&self, image_id: i64) -> CatalogResult<Option<Image>> {
        let image = sqlx::query_as::<_, Image>(
            "SELECT id, file_path, description FROM images WHERE id = ?",
        )
        .bind(image_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(image)
    }

    pub async fn get_combo(&self, combo_id: i64) -> CatalogResult<Option<Combo>> {
        Ok(find_combo(&self.pool, combo_id).await?)
    }

    pub async fn get_task(&self, task_id: i64) -> CatalogResult<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(
            "SELECT id, user_id, combo_id, date, completed, correct FROM tasks WHERE id = ?",
        )
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    pub async fn get_user(&self, user_id: i64) -> CatalogResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, consecutive_correct FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Inserts the user row on first sight; existing rows are untouched.
    pub async fn ensure_user(&self, user_id: i64) -> CatalogResult<()> {
        insert_user(&self.pool, user_id, &format!("user_{}", user_id)).await?;
        Ok(())
    }

    pub async fn list_combos_joined(&self) -> CatalogResult<Vec<PuzzleRecord>> {
        track_db_operation::<_, _, CatalogError>("select", "combos", async {
            let rows = sqlx::query_as::<_, PuzzleRecord>(
                r#"
                SELECT
                    c.id AS combo_id,
                    w.id AS word_id,
                    w.text AS word,
                    w.difficulty,
                    i.id AS image_id,
                    i.file_path AS image_name,
                    i.description AS image_description
                FROM combos c
                JOIN words w ON c.word_id = w.id
                JOIN images i ON c.image_id = i.id
                ORDER BY w.difficulty, w.text
                "#,
            )
            .fetch_all(&self.pool)
            .await?;
            Ok(rows)
        })
        .await
    }

    /// Combo ids of the user's latest tasks, most recent first.
    pub async fn get_recent_combo_ids(&self, user_id: i64, limit: i64) -> CatalogResult<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT combo_id FROM tasks
            WHERE user_id = ?
            ORDER BY date DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    /// Uniformly random combo of `difficulty` whose id is not in `exclude_ids`.
    pub async fn random_combo_excluding(
        &self,
        difficulty: Difficulty,
        exclude_ids: &[i64],
    ) -> CatalogResult<Option<ComboDetail>> {
        track_db_operation::<_, _, CatalogError>("random", "combos", async {
            let mut query = QueryBuilder::<Sqlite>::new(COMBO_DETAIL_SELECT);
            query
                .push(" WHERE w.difficulty = ")
                .push_bind(difficulty.as_str());

            if !exclude_ids.is_empty() {
                query.push(" AND c.id NOT IN (");
                let mut ids = query.separated(", ");
                for id in exclude_ids {
                    ids.push_bind(*id);
                }
                ids.push_unseparated(")");
            }

            query.push(" ORDER BY RANDOM() LIMIT 1");

            let combo = query
                .build_query_as::<ComboDetail>()
                .fetch_optional(&self.pool)
                .await?;
            Ok(combo)
        })
        .await
    }

    pub async fn random_combo(&self, difficulty: Difficulty) -> CatalogResult<Option<ComboDetail>> {
        self.random_combo_excluding(difficulty, &[]).await
    }

    pub async fn count_combos(&self) -> CatalogResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM combos")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn count_words(&self) -> CatalogResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM words")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn catalog_counts(&self) -> CatalogResult<CatalogCounts> {
        let (words, images, combos, tasks) = sqlx::query_as::<_, (i64, i64, i64, i64)>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM words),
                (SELECT COUNT(*) FROM images),
                (SELECT COUNT(*) FROM combos),
                (SELECT COUNT(*) FROM tasks)
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(CatalogCounts {
            words,
            images,
            combos,
            tasks,
        })
    }

    pub async fn create_task(&self, user_id: i64, combo_id: i64) -> CatalogResult<i64> {
        track_db_operation::<_, _, CatalogError>("insert", "tasks", async {
            let result = sqlx::query(
                r#"
                INSERT INTO tasks (user_id, combo_id, date, completed, correct)
                VALUES (?, ?, ?, 0, 0)
                "#,
            )
            .bind(user_id)
            .bind(combo_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
            Ok(result.last_insert_rowid())
        })
        .await
    }

    /// Marks an open task completed. A task is graded once; later answers
    /// leave the row untouched.
    pub async fn update_task_result(&self, task_id: i64, correct: bool) -> CatalogResult<TaskOutcome> {
        track_db_operation::<_, _, CatalogError>("update", "tasks", async {
            let result = sqlx::query(
                "UPDATE tasks SET completed = 1, correct = ? WHERE id = ? AND completed = 0",
            )
            .bind(correct)
            .bind(task_id)
            .execute(&self.pool)
            .await?;
            if result.rows_affected() > 0 {
                return Ok(TaskOutcome::Recorded);
            }

            let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM tasks WHERE id = ?")
                .bind(task_id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(match exists {
                Some(_) => TaskOutcome::AlreadyCompleted,
                None => TaskOutcome::Missing,
            })
        })
        .await
    }

    /// Inserts word, image and combo atomically and returns the combo id.
    pub async fn add_puzzle(&self, puzzle: &NewPuzzle) -> CatalogResult<i64> {
        track_db_operation::<_, _, CatalogError>("insert", "combos", async {
            let mut tx = self.pool.begin().await?;
            let combo_id = insert_puzzle(&mut tx, puzzle).await?;
            tx.commit().await?;

            tracing::info!(
                "Puzzle added: combo_id={}, word={}, difficulty={}",
                combo_id,
                puzzle.word,
                puzzle.difficulty
            );
            Ok(combo_id)
        })
        .await
    }

    /// Rewrites the word and image behind an existing combo in place.
    pub async fn update_puzzle(&self, combo_id: i64, puzzle: &NewPuzzle) -> CatalogResult<()> {
        track_db_operation::<_, _, CatalogError>("update", "combos", async {
            let mut tx = self.pool.begin().await?;

            let combo = find_combo(&mut *tx, combo_id)
                .await?
                .ok_or_else(|| combo_not_found(combo_id))?;

            sqlx::query("UPDATE words SET text = ?, difficulty = ? WHERE id = ?")
                .bind(&puzzle.word)
                .bind(puzzle.difficulty.as_str())
                .bind(combo.word_id)
                .execute(&mut *tx)
                .await?;

            sqlx::query("UPDATE images SET file_path = ?, description = ? WHERE id = ?")
                .bind(&puzzle.image_name)
                .bind(&puzzle.image_description)
                .bind(combo.image_id)
                .execute(&mut *tx)
                .await?;

            tx.commit().await?;

            tracing::info!("Puzzle updated: combo_id={}", combo_id);
            Ok(())
        })
        .await
    }

    /// Deletes the combo together with its tasks, word and image.
    pub async fn delete_puzzle(&self, combo_id: i64) -> CatalogResult<()> {
        track_db_operation::<_, _, CatalogError>("delete", "combos", async {
            let mut tx = self.pool.begin().await?;

            let combo = find_combo(&mut *tx, combo_id)
                .await?
                .ok_or_else(|| combo_not_found(combo_id))?;

            let tasks = sqlx::query("DELETE FROM tasks WHERE combo_id = ?")
                .bind(combo_id)
                .execute(&mut *tx)
                .await?;

            sqlx::query("DELETE FROM combos WHERE id = ?")
                .bind(combo_id)
                .execute(&mut *tx)
                .await?;

            sqlx::query("DELETE FROM words WHERE id = ?")
                .bind(combo.word_id)
                .execute(&mut *tx)
                .await?;

            sqlx::query("DELETE FROM images WHERE id = ?")
                .bind(combo.image_id)
                .execute(&mut *tx)
                .await?;

            tx.commit().await?;

            tracing::info!(
                "Puzzle deleted: combo_id={}, tasks_removed={}",
                combo_id,
                tasks.rows_affected()
            );
            Ok(())
        })
        .await
    }

    pub async fn user_stats(&self, user_id: i64) -> CatalogResult<UserStats> {
        let overall = sqlx::query_as::<_, OverallStats>(
            r#"
            SELECT
                COUNT(*) AS total,
                COALESCE(SUM(completed), 0) AS completed,
                COALESCE(SUM(correct), 0) AS correct
            FROM tasks
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let by_difficulty = sqlx::query_as::<_, DifficultyStats>(
            r#"
            SELECT
                w.difficulty AS difficulty,
                COUNT(*) AS total,
                COALESCE(SUM(t.completed), 0) AS completed,
                COALESCE(SUM(t.correct), 0) AS correct
            FROM tasks t
            JOIN combos c ON t.combo_id = c.id
            JOIN words w ON c.word_id = w.id
            WHERE t.user_id = ?
            GROUP BY w.difficulty
            ORDER BY w.difficulty
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(UserStats {
            overall,
            by_difficulty,
        })
    }
}

fn combo_not_found(combo_id: i64) -> CatalogError {
    CatalogError::not_found(format!("Combo with id {} not found", combo_id))
}

pub(crate) async fn insert_word<'e, E>(
    executor: E,
    text: &str,
    difficulty: Difficulty,
) -> Result<i64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("INSERT INTO words (text, difficulty) VALUES (?, ?)")
        .bind(text)
        .bind(difficulty.as_str())
        .execute(executor)
        .await?;
    Ok(result.last_insert_rowid())
}

pub(crate) async fn insert_image<'e, E>(
    executor: E,
    file_path: &str,
    description: &str,
) -> Result<i64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("INSERT INTO images (file_path, description) VALUES (?, ?)")
        .bind(file_path)
        .bind(description)
        .execute(executor)
        .await?;
    Ok(result.last_insert_rowid())
}

pub(crate) async fn insert_combo<'e, E>(
    executor: E,
    word_id: i64,
    image_id: i64,
) -> Result<i64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("INSERT INTO combos (word_id, image_id) VALUES (?, ?)")
        .bind(word_id)
        .bind(image_id)
        .execute(executor)
        .await?;
    Ok(result.last_insert_rowid())
}

pub(crate) async fn insert_user<'e, E>(executor: E, user_id: i64, name: &str) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query("INSERT OR IGNORE INTO users (id, name, consecutive_correct) VALUES (?, ?, 0)")
        .bind(user_id)
        .bind(name)
        .execute(executor)
        .await?;
    Ok(())
}

/// Word, image and combo inserts for one puzzle inside an open transaction.
pub(crate) async fn insert_puzzle(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    puzzle: &NewPuzzle,
) -> Result<i64, sqlx::Error> {
    let word_id = insert_word(&mut **tx, &puzzle.word, puzzle.difficulty).await?;
    let image_id = insert_image(&mut **tx, &puzzle.image_name, &puzzle.image_description).await?;
    insert_combo(&mut **tx, word_id, image_id).await
}

async fn find_combo<'e, E>(executor: E, combo_id: i64) -> Result<Option<Combo>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Combo>("SELECT id, word_id, image_id FROM combos WHERE id = ?")
        .bind(combo_id)
        .fetch_optional(executor)
        .await
}
