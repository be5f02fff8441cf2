use super::catalog_store::CatalogStore;
use crate::error::{CatalogError, CatalogResult};
use crate::metrics::{track_db_operation, CELEBRATIONS_TOTAL};
use crate::models::answer::ProgressUpdate;

/// Consecutive correct answers that trigger a celebration and reset the streak.
pub const CELEBRATION_THRESHOLD: i64 = 10;

/// Per-user streak of consecutive correct answers.
#[derive(Clone)]
pub struct ProgressTracker {
    store: CatalogStore,
}

impl ProgressTracker {
    pub fn new(store: CatalogStore) -> Self {
        Self { store }
    }

    /// Applies one answer to the user's streak.
    ///
    /// The increment and the threshold reset run in one write transaction, so
    /// concurrent submissions for the same user are serialized and exactly one
    /// of them observes the threshold.
    pub async fn record_answer(&self, user_id: i64, correct: bool) -> CatalogResult<ProgressUpdate> {
        self.store.ensure_user(user_id).await?;

        let update = track_db_operation::<_, _, CatalogError>("update", "users", async {
            let mut tx = self.store.pool().begin().await?;

            let streak = sqlx::query_scalar::<_, i64>(
                r#"
                UPDATE users
                SET consecutive_correct = CASE WHEN ? THEN consecutive_correct + 1 ELSE 0 END
                WHERE id = ?
                RETURNING consecutive_correct
                "#,
            )
            .bind(correct)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

            let celebration = streak >= CELEBRATION_THRESHOLD;
            if celebration {
                sqlx::query("UPDATE users SET consecutive_correct = 0 WHERE id = ?")
                    .bind(user_id)
                    .execute(&mut *tx)
                    .await?;
            }

            tx.commit().await?;

            Ok(ProgressUpdate {
                consecutive_correct: if celebration { 0 } else { streak },
                celebration,
            })
        })
        .await?;

        if update.celebration {
            CELEBRATIONS_TOTAL.inc();
            tracing::info!("User {} reached {} in a row", user_id, CELEBRATION_THRESHOLD);
        }

        Ok(update)
    }

    /// Current streak; zero for users never seen before.
    pub async fn current_progress(&self, user_id: i64) -> CatalogResult<i64> {
        Ok(self
            .store
            .get_user(user_id)
            .await?
            .map(|user| user.consecutive_correct)
            .unwrap_or(0))
    }
}
