use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub mod admin;
pub mod answer;
pub mod puzzle;
pub mod stats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy (3-5 letters)",
            Difficulty::Medium => "Medium (5-7 letters)",
            Difficulty::Hard => "Hard (7-10 letters)",
        }
    }

    /// Difficulty implied by a word's character count.
    pub fn for_word(word: &str) -> Self {
        match word.chars().count() {
            0..=4 => Difficulty::Easy,
            5..=7 => Difficulty::Medium,
            _ => Difficulty::Hard,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!(
                "Invalid difficulty '{}': expected easy, medium or hard",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Word {
    pub id: i64,
    pub text: String,
    pub difficulty: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Image {
    pub id: i64,
    pub file_path: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Combo {
    pub id: i64,
    pub word_id: i64,
    pub image_id: i64,
}

/// A combo joined with its word and image, as served to players.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ComboDetail {
    pub id: i64,
    pub text: String,
    pub difficulty: String,
    pub file_path: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Task {
    pub id: i64,
    pub user_id: i64,
    pub combo_id: i64,
    pub date: DateTime<Utc>,
    pub completed: bool,
    pub correct: bool,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: Option<String>,
    pub consecutive_correct: i64,
}

/// Admin listing row: a combo with the ids and fields of both sides.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PuzzleRecord {
    pub combo_id: i64,
    pub word_id: i64,
    pub word: String,
    pub difficulty: String,
    pub image_id: i64,
    pub image_name: String,
    pub image_description: Option<String>,
}
