use std::path::Path;

use tokio::fs;

use super::catalog_store::{insert_puzzle, insert_user, CatalogStore, NewPuzzle};
use crate::error::CatalogResult;
use crate::models::{puzzle::DEFAULT_USER_ID, Difficulty};

/// Extensions accepted as puzzle images (compared case-insensitively).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

/// File stems reserved for the progress UI; never turned into puzzles.
pub const RESERVED_STEMS: &[&str] = &["star", "nostar"];

const SAMPLE_PUZZLES: &[(&str, Difficulty)] = &[
    ("CAT", Difficulty::Easy),
    ("DOG", Difficulty::Easy),
    ("APPLE", Difficulty::Easy),
    ("TABLE", Difficulty::Easy),
    ("ORANGE", Difficulty::Medium),
    ("ELEPHANT", Difficulty::Hard),
    ("COMPUTER", Difficulty::Medium),
];

/// How the catalog was populated on startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    AlreadyPopulated,
    FromImages(usize),
    SampleData(usize),
}

/// Word and difficulty derived from an image file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedWord {
    pub word: String,
    pub difficulty: Difficulty,
}

/// Upper-cased file stem plus the difficulty implied by its length.
///
/// Returns `None` for names without a usable stem (hidden files, stems of
/// fewer than two characters).
pub fn derive_word(filename: &str) -> Option<DerivedWord> {
    let stem = Path::new(filename).file_stem()?.to_str()?.trim();
    if stem.is_empty() || stem.starts_with('.') || stem.chars().count() < 2 {
        return None;
    }

    let word = stem.to_uppercase();
    let difficulty = Difficulty::for_word(&word);
    Some(DerivedWord { word, difficulty })
}

pub fn has_image_extension(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

pub fn is_reserved(filename: &str) -> bool {
    Path::new(filename)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(|stem| {
            RESERVED_STEMS
                .iter()
                .any(|reserved| stem.eq_ignore_ascii_case(reserved))
        })
        .unwrap_or(false)
}

/// Puzzle row for an image file, or `None` when the file is not eligible.
pub fn puzzle_for_image(filename: &str) -> Option<NewPuzzle> {
    if !has_image_extension(filename) || is_reserved(filename) {
        return None;
    }

    let derived = derive_word(filename)?;
    Some(NewPuzzle {
        image_description: derived.word.to_lowercase(),
        word: derived.word,
        difficulty: derived.difficulty,
        image_name: filename.to_string(),
    })
}

fn sample_puzzles() -> Vec<NewPuzzle> {
    SAMPLE_PUZZLES
        .iter()
        .map(|(word, difficulty)| NewPuzzle {
            word: word.to_string(),
            difficulty: *difficulty,
            image_name: format!("{}.jpg", word.to_lowercase()),
            image_description: word.to_lowercase(),
        })
        .collect()
}

/// Sorted names of eligible image files directly inside `images_dir`.
async fn scan_image_files(images_dir: &Path) -> Vec<String> {
    let mut entries = match fs::read_dir(images_dir).await {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(
                "Image directory {} unreadable ({}), no images to seed from",
                images_dir.display(),
                err
            );
            return Vec::new();
        }
    };

    let mut names = Vec::new();
    loop {
        match entries.next_entry().await {
            Ok(Some(entry)) => {
                let is_file = entry
                    .file_type()
                    .await
                    .map(|kind| kind.is_file())
                    .unwrap_or(false);
                if !is_file {
                    continue;
                }
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
            Ok(None) => break,
            Err(err) => {
                tracing::warn!("Failed to read image directory entry: {}", err);
                break;
            }
        }
    }

    names.sort();
    names
}

/// Populates an empty catalog from `images_dir`, falling back to the
/// built-in sample set when no eligible image is found.
pub async fn seed_if_empty(store: &CatalogStore, images_dir: &Path) -> CatalogResult<SeedOutcome> {
    if store.count_words().await? > 0 {
        tracing::debug!("Catalog already populated, seed skipped");
        return Ok(SeedOutcome::AlreadyPopulated);
    }

    let files = scan_image_files(images_dir).await;
    let mut puzzles = Vec::new();
    for name in &files {
        match puzzle_for_image(name) {
            Some(puzzle) => puzzles.push(puzzle),
            None if has_image_extension(name) && !is_reserved(name) => {
                tracing::warn!("Skipping image {}: file name is not a usable word", name);
            }
            None => {}
        }
    }

    let outcome = if puzzles.is_empty() {
        tracing::info!("No image files found, falling back to sample data");
        puzzles = sample_puzzles();
        SeedOutcome::SampleData(puzzles.len())
    } else {
        tracing::info!("Found {} images, creating puzzles", puzzles.len());
        SeedOutcome::FromImages(puzzles.len())
    };

    let mut tx = store.pool().begin().await?;
    insert_user(&mut *tx, DEFAULT_USER_ID, "default_user").await?;
    for puzzle in &puzzles {
        let combo_id = insert_puzzle(&mut tx, puzzle).await?;
        tracing::debug!(
            "Created puzzle: {} ({}) -> {} [combo {}]",
            puzzle.word,
            puzzle.difficulty,
            puzzle.image_name,
            combo_id
        );
    }
    tx.commit().await?;

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;

    #[test]
    fn derive_word_uppercases_stem() {
        assert_eq!(
            derive_word("Elephant.JPG"),
            Some(DerivedWord {
                word: "ELEPHANT".to_string(),
                difficulty: Difficulty::Hard
            })
        );
        assert_eq!(derive_word("cat.png").unwrap().difficulty, Difficulty::Easy);
        assert_eq!(derive_word("orange.gif").unwrap().difficulty, Difficulty::Medium);
        assert!(derive_word("a.jpg").is_none());
        assert!(derive_word(".gitkeep").is_none());
    }

    #[test]
    fn reserved_and_foreign_files_are_not_puzzles() {
        assert!(puzzle_for_image("star.jpg").is_none());
        assert!(puzzle_for_image("NoStar.png").is_none());
        assert!(puzzle_for_image("notes.txt").is_none());
        assert!(puzzle_for_image("starfish.jpg").is_some());
    }

    #[tokio::test]
    async fn seeds_from_image_directory() {
        let dir = tempfile::tempdir().unwrap();
        let images = dir.path().join("images");
        std::fs::create_dir_all(&images).unwrap();
        for name in ["cat.jpg", "elephant.png", "star.jpg", "nostar.jpg", "readme.md"] {
            std::fs::write(images.join(name), b"x").unwrap();
        }
        let store = CatalogStore::new(init_database(&dir.path().join("bee.db")).await.unwrap());

        let outcome = seed_if_empty(&store, &images).await.unwrap();

        assert_eq!(outcome, SeedOutcome::FromImages(2));
        let records = store.list_combos_joined().await.unwrap();
        let words: Vec<(&str, &str)> = records
            .iter()
            .map(|r| (r.word.as_str(), r.difficulty.as_str()))
            .collect();
        assert_eq!(words, vec![("CAT", "easy"), ("ELEPHANT", "hard")]);
        assert_eq!(records[0].image_description.as_deref(), Some("cat"));
        assert!(store.get_user(DEFAULT_USER_ID).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn falls_back_to_sample_set() {
        let dir = tempfile::tempdir().unwrap();
        let store = CatalogStore::new(init_database(&dir.path().join("bee.db")).await.unwrap());

        let outcome = seed_if_empty(&store, &dir.path().join("missing")).await.unwrap();

        assert_eq!(outcome, SeedOutcome::SampleData(7));
        assert_eq!(store.count_combos().await.unwrap(), 7);
    }

    #[tokio::test]
    async fn second_run_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let store = CatalogStore::new(init_database(&dir.path().join("bee.db")).await.unwrap());

        seed_if_empty(&store, dir.path()).await.unwrap();
        let outcome = seed_if_empty(&store, dir.path()).await.unwrap();

        assert_eq!(outcome, SeedOutcome::AlreadyPopulated);
        assert_eq!(store.count_combos().await.unwrap(), 7);
    }
}
