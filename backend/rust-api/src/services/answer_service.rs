use super::catalog_store::{CatalogStore, TaskOutcome};
use super::progress_tracker::ProgressTracker;
use crate::error::{CatalogError, CatalogResult};
use crate::metrics::ANSWERS_SUBMITTED_TOTAL;
use crate::models::answer::{ProgressUpdate, SubmitAnswerRequest, SubmitAnswerResponse};
use crate::models::puzzle::DEFAULT_USER_ID;
use crate::utils::retry::{retry_when, RetryConfig};

/// Submission fields after presence checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub task_id: i64,
    pub answer: String,
    pub original_word: String,
    pub user_id: i64,
}

impl TryFrom<SubmitAnswerRequest> for Submission {
    type Error = CatalogError;

    fn try_from(req: SubmitAnswerRequest) -> Result<Self, Self::Error> {
        let present = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        match (req.task_id, present(req.answer), present(req.original_word)) {
            (Some(task_id), Some(answer), Some(original_word)) => Ok(Submission {
                task_id,
                answer,
                original_word,
                user_id: req.user_id.unwrap_or(DEFAULT_USER_ID),
            }),
            _ => Err(CatalogError::validation("Missing required data")),
        }
    }
}

/// Case-insensitive comparison of the trimmed answer against the word.
pub fn is_correct(answer: &str, original_word: &str) -> bool {
    answer.trim().to_lowercase() == original_word.trim().to_lowercase()
}

pub struct AnswerService {
    store: CatalogStore,
    progress: ProgressTracker,
    retry: RetryConfig,
}

impl AnswerService {
    pub fn new(store: CatalogStore) -> Self {
        Self {
            progress: ProgressTracker::new(store.clone()),
            store,
            retry: RetryConfig::default(),
        }
    }

    pub async fn submit_answer(&self, req: SubmitAnswerRequest) -> CatalogResult<SubmitAnswerResponse> {
        let submission = Submission::try_from(req)?;
        let correct = is_correct(&submission.answer, &submission.original_word);

        tracing::info!(
            "Processing answer: task={}, user={}, correct={}",
            submission.task_id,
            submission.user_id,
            correct
        );

        let outcome = retry_when(&self.retry, CatalogError::is_busy, || async {
            self.store
                .update_task_result(submission.task_id, correct)
                .await
        })
        .await?;

        // Only the answer that closes an open task moves the streak.
        let update = match outcome {
            TaskOutcome::Recorded => {
                retry_when(&self.retry, CatalogError::is_busy, || async {
                    self.progress.record_answer(submission.user_id, correct).await
                })
                .await?
            }
            TaskOutcome::AlreadyCompleted | TaskOutcome::Missing => {
                tracing::warn!(
                    "Answer for task {} not graded ({:?}), streak unchanged",
                    submission.task_id,
                    outcome
                );
                ProgressUpdate {
                    consecutive_correct: self.progress.current_progress(submission.user_id).await?,
                    celebration: false,
                }
            }
        };

        ANSWERS_SUBMITTED_TOTAL
            .with_label_values(&[if correct { "true" } else { "false" }])
            .inc();

        let message = if correct {
            "Correct! Great job!".to_string()
        } else {
            format!("Not quite! The word was \"{}\".", submission.original_word)
        };

        Ok(SubmitAnswerResponse {
            correct,
            message,
            consecutive_correct: update.consecutive_correct,
            celebration: update.celebration,
        })
    }
}
