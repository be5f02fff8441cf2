use super::catalog_seed::{derive_word, is_reserved};
use super::catalog_store::{CatalogStore, NewPuzzle};
use crate::error::{CatalogError, CatalogResult};
use crate::metrics::CATALOG_CHANGES_TOTAL;
use crate::models::{
    admin::{AutoPuzzle, PuzzleDraft, PuzzlePayload},
    PuzzleRecord,
};

/// Catalog maintenance behind the admin routes.
pub struct AdminService {
    store: CatalogStore,
}

impl AdminService {
    pub fn new(store: CatalogStore) -> Self {
        Self { store }
    }

    pub async fn list_puzzles(&self) -> CatalogResult<Vec<PuzzleRecord>> {
        self.store.list_combos_joined().await
    }

    pub async fn create_puzzle(&self, payload: PuzzlePayload) -> CatalogResult<i64> {
        let draft = PuzzleDraft::try_from(payload)?;
        let combo_id = self.store.add_puzzle(&draft.into()).await?;
        CATALOG_CHANGES_TOTAL.with_label_values(&["create"]).inc();
        Ok(combo_id)
    }

    pub async fn update_puzzle(&self, combo_id: i64, payload: PuzzlePayload) -> CatalogResult<()> {
        let draft = PuzzleDraft::try_from(payload)?;
        self.store.update_puzzle(combo_id, &draft.into()).await?;
        CATALOG_CHANGES_TOTAL.with_label_values(&["update"]).inc();
        Ok(())
    }

    pub async fn delete_puzzle(&self, combo_id: i64) -> CatalogResult<()> {
        self.store.delete_puzzle(combo_id).await?;
        CATALOG_CHANGES_TOTAL.with_label_values(&["delete"]).inc();
        Ok(())
    }

    /// Creates a puzzle for an already stored image, naming the word after
    /// the file stem. Progress sentinel images never become puzzles.
    pub async fn create_puzzle_from_image(&self, filename: &str) -> CatalogResult<AutoPuzzle> {
        if is_reserved(filename) {
            return Err(CatalogError::validation(format!(
                "Reserved file name: {}",
                filename
            )));
        }

        let derived = derive_word(filename).ok_or_else(|| {
            CatalogError::validation(format!(
                "Cannot derive a word of at least two letters from {}",
                filename
            ))
        })?;

        let puzzle = NewPuzzle {
            word: derived.word.clone(),
            difficulty: derived.difficulty,
            image_name: filename.to_string(),
            image_description: derived.word.to_lowercase(),
        };
        let combo_id = self.store.add_puzzle(&puzzle).await?;
        CATALOG_CHANGES_TOTAL.with_label_values(&["auto_create"]).inc();

        Ok(AutoPuzzle {
            combo_id,
            message: format!(
                "Puzzle created: \"{}\" ({} difficulty)",
                derived.word, derived.difficulty
            ),
            word: derived.word,
            difficulty: derived.difficulty,
        })
    }
}

impl From<PuzzleDraft> for NewPuzzle {
    fn from(draft: PuzzleDraft) -> Self {
        NewPuzzle {
            word: draft.word,
            difficulty: draft.difficulty,
            image_name: draft.image_name,
            image_description: draft.image_description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use crate::models::Difficulty;
    use tempfile::TempDir;

    async fn service() -> (TempDir, AdminService, CatalogStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = CatalogStore::new(init_database(&dir.path().join("bee.db")).await.unwrap());
        (dir, AdminService::new(store.clone()), store)
    }

    fn payload(word: &str, difficulty: &str) -> PuzzlePayload {
        PuzzlePayload {
            word: Some(word.to_string()),
            difficulty: Some(difficulty.to_string()),
            image_name: Some(format!("{}.jpg", word.to_lowercase())),
            image_description: Some(format!("a {}", word.to_lowercase())),
        }
    }

    #[tokio::test]
    async fn create_then_list() {
        let (_dir, admin, _) = service().await;

        let combo_id = admin.create_puzzle(payload("TIGER", "medium")).await.unwrap();

        let listed = admin.list_puzzles().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].combo_id, combo_id);
        assert_eq!(listed[0].difficulty, "medium");
        assert_eq!(listed[0].image_description.as_deref(), Some("a tiger"));
    }

    #[tokio::test]
    async fn incomplete_payload_writes_nothing() {
        let (_dir, admin, store) = service().await;
        let mut body = payload("TIGER", "medium");
        body.image_name = None;

        let err = admin.create_puzzle(body).await.unwrap_err();

        assert_eq!(err.to_string(), "All fields are required");
        assert_eq!(store.count_combos().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_ids() {
        let (_dir, admin, _) = service().await;

        assert!(matches!(
            admin.update_puzzle(5, payload("CAT", "easy")).await,
            Err(CatalogError::NotFound(_))
        ));
        assert!(matches!(
            admin.delete_puzzle(5).await,
            Err(CatalogError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn auto_puzzle_is_named_after_file() {
        let (_dir, admin, store) = service().await;

        let created = admin.create_puzzle_from_image("giraffe.png").await.unwrap();

        assert_eq!(created.word, "GIRAFFE");
        assert_eq!(created.difficulty, Difficulty::Medium);
        assert_eq!(created.message, "Puzzle created: \"GIRAFFE\" (medium difficulty)");
        let combo = store.get_combo(created.combo_id).await.unwrap().unwrap();
        let image = store.get_image(combo.image_id).await.unwrap().unwrap();
        assert_eq!(image.file_path, "giraffe.png");
        assert_eq!(image.description.as_deref(), Some("giraffe"));
    }

    #[tokio::test]
    async fn auto_puzzle_needs_two_letters() {
        let (_dir, admin, store) = service().await;
        assert!(matches!(
            admin.create_puzzle_from_image("x.png").await,
            Err(CatalogError::Validation(_))
        ));
        assert_eq!(store.count_words().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn auto_puzzle_skips_progress_sentinels() {
        let (_dir, admin, store) = service().await;

        for name in ["star.png", "NoStar.jpg"] {
            let err = admin.create_puzzle_from_image(name).await.unwrap_err();
            assert!(matches!(err, CatalogError::Validation(_)), "{}", name);
        }
        assert_eq!(store.count_combos().await.unwrap(), 0);
    }
}
