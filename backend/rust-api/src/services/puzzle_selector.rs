use super::catalog_store::{CatalogStore, RECENT_COMBO_WINDOW};
use crate::error::{CatalogError, CatalogResult};
use crate::models::{ComboDetail, Difficulty};

pub struct PuzzleSelector {
    store: CatalogStore,
}

impl PuzzleSelector {
    pub fn new(store: CatalogStore) -> Self {
        Self { store }
    }

    /// Random combo of `difficulty`, preferring ones the user has not been
    /// served in their last [`RECENT_COMBO_WINDOW`] tasks.
    pub async fn select_puzzle(
        &self,
        difficulty: Difficulty,
        user_id: i64,
    ) -> CatalogResult<ComboDetail> {
        let recent = self
            .store
            .get_recent_combo_ids(user_id, RECENT_COMBO_WINDOW)
            .await?;

        if let Some(combo) = self
            .store
            .random_combo_excluding(difficulty, &recent)
            .await?
        {
            return Ok(combo);
        }

        tracing::debug!(
            "All {} combos recently seen by user {}, repeating one",
            difficulty,
            user_id
        );

        self.store
            .random_combo(difficulty)
            .await?
            .ok_or_else(|| CatalogError::not_found("No puzzles found for this difficulty level"))
    }
}
