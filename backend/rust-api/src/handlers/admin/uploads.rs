use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    Json,
};
use std::sync::Arc;

use crate::handlers::ApiError;
use crate::models::admin::{AutoPuzzleResponse, UploadResponse};
use crate::services::{
    admin_service::AdminService, catalog_seed::is_reserved, image_store::sanitize_filename,
    AppState,
};

const IMAGE_FIELD: &str = "image";

struct UploadedFile {
    filename: String,
    bytes: Vec<u8>,
}

/// Pulls the `image` part out of the form; other parts are skipped.
async fn read_image_field(multipart: &mut Multipart) -> Result<UploadedFile, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().trim().to_string();
        if filename.is_empty() {
            return Err(ApiError::bad_request("No file selected"));
        }

        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok(UploadedFile {
            filename,
            bytes: bytes.to_vec(),
        });
    }

    Err(ApiError::bad_request("No image file provided"))
}

fn multipart_error(err: MultipartError) -> ApiError {
    tracing::warn!("Malformed upload: {}", err);
    ApiError::bad_request(err.body_text())
}

pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let upload = read_image_field(&mut multipart).await?;
    let filename = state.images.save(&upload.filename, &upload.bytes).await?;

    Ok(Json(UploadResponse {
        success: true,
        filename,
    }))
}

/// Stores the image and creates a puzzle named after it. A freshly written
/// file is removed again when the puzzle cannot be created. Sentinel names
/// are refused before anything touches the images directory.
pub async fn upload_auto_puzzle(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<AutoPuzzleResponse>, ApiError> {
    let upload = read_image_field(&mut multipart).await?;
    let name = sanitize_filename(&upload.filename)?;
    if is_reserved(&name) {
        tracing::warn!("Refused auto-puzzle upload for reserved image {}", name);
        return Err(ApiError::bad_request(format!("Reserved file name: {}", name)));
    }
    let replaced = state.images.exists(&name).await;

    let filename = state.images.save(&name, &upload.bytes).await?;

    let service = AdminService::new(state.store.clone());
    let created = match service.create_puzzle_from_image(&filename).await {
        Ok(created) => created,
        Err(err) => {
            if !replaced {
                state.images.remove(&filename).await;
            }
            return Err(err.into());
        }
    };

    Ok(Json(AutoPuzzleResponse {
        success: true,
        filename,
        combo_id: created.combo_id,
        word: created.word,
        difficulty: created.difficulty,
        message: created.message,
    }))
}
