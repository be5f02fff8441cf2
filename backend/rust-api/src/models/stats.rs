use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct OverallStats {
    pub total: i64,
    pub completed: i64,
    pub correct: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DifficultyStats {
    pub difficulty: String,
    pub total: i64,
    pub completed: i64,
    pub correct: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStats {
    pub overall: OverallStats,
    pub by_difficulty: Vec<DifficultyStats>,
}
