use serde::{Deserialize, Serialize};

use super::Difficulty;

/// Player that owns tasks when a request does not name one.
pub const DEFAULT_USER_ID: i64 = 1;

#[derive(Debug, Serialize)]
pub struct DifficultyLevel {
    pub id: Difficulty,
    pub name: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DifficultyLevelsResponse {
    pub levels: Vec<DifficultyLevel>,
}

impl DifficultyLevelsResponse {
    pub fn all() -> Self {
        Self {
            levels: Difficulty::ALL
                .iter()
                .map(|difficulty| DifficultyLevel {
                    id: *difficulty,
                    name: difficulty.label(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PuzzleQuery {
    pub difficulty: Option<String>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PuzzleResponse {
    pub task_id: i64,
    /// Word characters with blanked positions as `null`.
    pub puzzle: Vec<Option<char>>,
    pub original_word: String,
    pub image_url: String,
    pub image_alt: String,
    pub blank_positions: Vec<usize>,
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: Option<i64>,
}

impl UserQuery {
    pub fn user_id(&self) -> i64 {
        self.user_id.unwrap_or(DEFAULT_USER_ID)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProgressResponse {
    pub consecutive_correct: i64,
}
