use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    pub task_id: Option<i64>,
    pub answer: Option<String>,
    pub original_word: Option<String>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitAnswerResponse {
    pub correct: bool,
    pub message: String,
    pub consecutive_correct: i64,
    pub celebration: bool,
}

/// Streak state after one answer has been recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub consecutive_correct: i64,
    pub celebration: bool,
}
