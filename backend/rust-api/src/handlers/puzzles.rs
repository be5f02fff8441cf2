use axum::{extract::State, Json};
use std::sync::Arc;

use crate::handlers::ApiError;
use crate::extractors::{AppJson, AppQuery};
use crate::metrics::PUZZLES_SERVED_TOTAL;
use crate::models::{
    answer::{SubmitAnswerRequest, SubmitAnswerResponse},
    puzzle::{
        DifficultyLevelsResponse, ProgressResponse, PuzzleQuery, PuzzleResponse, UserQuery,
        DEFAULT_USER_ID,
    },
    stats::UserStats,
    Difficulty,
};
use crate::services::{
    answer_service::AnswerService,
    image_store::image_url,
    progress_tracker::ProgressTracker,
    puzzle_renderer::{render_blanks, render_puzzle},
    puzzle_selector::PuzzleSelector,
    AppState,
};

pub async fn get_difficulty_levels() -> Json<DifficultyLevelsResponse> {
    Json(DifficultyLevelsResponse::all())
}

pub async fn get_puzzle(
    State(state): State<Arc<AppState>>,
    AppQuery(query): AppQuery<PuzzleQuery>,
) -> Result<Json<PuzzleResponse>, ApiError> {
    let difficulty = match query.difficulty.as_deref() {
        Some(raw) if !raw.trim().is_empty() => {
            raw.parse::<Difficulty>().map_err(ApiError::BadRequest)?
        }
        _ => Difficulty::Easy,
    };
    let user_id = query.user_id.unwrap_or(DEFAULT_USER_ID);

    let combo = PuzzleSelector::new(state.store.clone())
        .select_puzzle(difficulty, user_id)
        .await?;

    let blank_positions = render_blanks(&combo.text, &mut rand::rng());
    let puzzle = render_puzzle(&combo.text, &blank_positions);

    let task_id = state.store.create_task(user_id, combo.id).await?;
    PUZZLES_SERVED_TOTAL
        .with_label_values(&[difficulty.as_str()])
        .inc();

    tracing::debug!(
        "Serving combo {} as task {} to user {}",
        combo.id,
        task_id,
        user_id
    );

    Ok(Json(PuzzleResponse {
        task_id,
        puzzle,
        image_url: image_url(&state.config.base_url, &combo.file_path),
        image_alt: combo
            .description
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| combo.text.to_lowercase()),
        original_word: combo.text,
        blank_positions,
    }))
}

pub async fn submit_answer(
    State(state): State<Arc<AppState>>,
    AppJson(payload): AppJson<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>, ApiError> {
    let response = AnswerService::new(state.store.clone())
        .submit_answer(payload)
        .await?;
    Ok(Json(response))
}

pub async fn get_progress(
    State(state): State<Arc<AppState>>,
    AppQuery(query): AppQuery<UserQuery>,
) -> Result<Json<ProgressResponse>, ApiError> {
    let consecutive_correct = ProgressTracker::new(state.store.clone())
        .current_progress(query.user_id())
        .await?;
    Ok(Json(ProgressResponse {
        consecutive_correct,
    }))
}

pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    AppQuery(query): AppQuery<UserQuery>,
) -> Result<Json<UserStats>, ApiError> {
    let stats = state.store.user_stats(query.user_id()).await?;
    Ok(Json(stats))
}
