mod uploads;

pub use uploads::*;

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::handlers::ApiError;
use crate::extractors::AppJson;
use crate::models::{
    admin::{CreatePuzzleResponse, PuzzlePayload, SuccessResponse},
    PuzzleRecord,
};
use crate::services::{admin_service::AdminService, AppState};

pub async fn list_puzzles(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PuzzleRecord>>, ApiError> {
    let service = AdminService::new(state.store.clone());
    let puzzles = service.list_puzzles().await?;
    Ok(Json(puzzles))
}

pub async fn create_puzzle(
    State(state): State<Arc<AppState>>,
    AppJson(payload): AppJson<PuzzlePayload>,
) -> Result<Json<CreatePuzzleResponse>, ApiError> {
    let service = AdminService::new(state.store.clone());
    let combo_id = service.create_puzzle(payload).await?;
    Ok(Json(CreatePuzzleResponse {
        success: true,
        combo_id,
    }))
}

pub async fn update_puzzle(
    State(state): State<Arc<AppState>>,
    Path(combo_id): Path<i64>,
    AppJson(payload): AppJson<PuzzlePayload>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let service = AdminService::new(state.store.clone());
    service.update_puzzle(combo_id, payload).await?;
    Ok(Json(SuccessResponse { success: true }))
}

pub async fn delete_puzzle(
    State(state): State<Arc<AppState>>,
    Path(combo_id): Path<i64>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let service = AdminService::new(state.store.clone());
    service.delete_puzzle(combo_id).await?;
    Ok(Json(SuccessResponse { success: true }))
}
