use serde::{Deserialize, Serialize};
use validator::Validate;

use super::Difficulty;
use crate::error::CatalogError;

/// Raw create/update body; every field is required but checked by hand so
/// that a missing field yields the catalog's validation message.
#[derive(Debug, Default, Deserialize)]
pub struct PuzzlePayload {
    pub word: Option<String>,
    pub difficulty: Option<String>,
    pub image_name: Option<String>,
    pub image_description: Option<String>,
}

#[derive(Debug, Clone, Validate)]
pub struct PuzzleDraft {
    #[validate(length(min = 2, max = 64, message = "Word must be 2-64 characters long"))]
    pub word: String,
    pub difficulty: Difficulty,
    #[validate(length(min = 1, max = 255, message = "Image name must be 1-255 characters long"))]
    pub image_name: String,
    #[validate(length(min = 1, max = 500, message = "Image description is too long"))]
    pub image_description: String,
}

impl TryFrom<PuzzlePayload> for PuzzleDraft {
    type Error = CatalogError;

    fn try_from(payload: PuzzlePayload) -> Result<Self, Self::Error> {
        let required = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let (Some(word), Some(difficulty), Some(image_name), Some(image_description)) = (
            required(payload.word),
            required(payload.difficulty),
            required(payload.image_name),
            required(payload.image_description),
        ) else {
            return Err(CatalogError::validation("All fields are required"));
        };

        let draft = PuzzleDraft {
            word,
            difficulty: difficulty.parse().map_err(CatalogError::Validation)?,
            image_name,
            image_description,
        };

        draft
            .validate()
            .map_err(|errors| CatalogError::validation(errors.to_string()))?;

        Ok(draft)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatePuzzleResponse {
    pub success: bool,
    pub combo_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub filename: String,
}

/// Puzzle derived from an image file name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoPuzzle {
    pub combo_id: i64,
    pub word: String,
    pub difficulty: Difficulty,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AutoPuzzleResponse {
    pub success: bool,
    pub filename: String,
    pub combo_id: i64,
    pub word: String,
    pub difficulty: Difficulty,
    pub message: String,
}
