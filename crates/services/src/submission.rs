//! Exactly-once submission of assessment outcomes.
//!
//! Every outward mutation (placement level, quiz answers) goes through
//! [`SubmissionCoordinator`]. The coordinator holds one async slot per
//! submission key; the slot's lock is acquired before any network I/O
//! and held across it, so a double-tap or a concurrent retry awaits the
//! in-flight attempt instead of issuing a second request. Terminal
//! outcomes are cached in the slot and replayed verbatim; transient
//! failures are not cached, which is what makes retry possible.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use growin_core::model::{QuizId, QuizSessionId, SummaryId};
use growin_core::scoring::ReadingLevel;
use storage::repository::{ClientPersistence, StorageError};

use crate::error::ApiError;

/// One answer on the quiz submission wire. A skipped question is sent
/// with an explicit `null`, never omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuizAnswer {
    pub question_id: i64,
    pub selected_option_id: Option<i64>,
}

/// Server-side grading for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionGrade {
    pub question_id: i64,
    pub selected_option_id: Option<i64>,
    pub correct_option_id: i64,
    pub is_correct: bool,
    pub explanation: Option<String>,
}

/// Server-side grading for a whole quiz submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizGrade {
    pub session_id: QuizSessionId,
    pub quiz_id: QuizId,
    pub score: u32,
    pub total_questions: u32,
    pub results: Vec<QuestionGrade>,
}

/// What a successful submission produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Receipt {
    /// The level now on record server-side. On a conflict this is the
    /// server's value, which may differ from what was submitted.
    Level(ReadingLevel),
    Quiz(QuizGrade),
}

/// Why a submission was refused for good.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// 401; re-authentication required before anything else.
    AuthExpired,
    /// The target no longer exists.
    Gone,
    /// The backend refused with a non-retryable status.
    Server { status: u16, message: String },
}

/// Result of a submission attempt.
///
/// `Accepted`, `AlreadyRecorded`, and `Rejected` are terminal: repeated
/// calls with the same key replay the cached value without touching the
/// network. `TransientFailure` is not terminal; the next call retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Accepted(Receipt),
    AlreadyRecorded(Receipt),
    Rejected(RejectReason),
    TransientFailure(String),
}

impl Outcome {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::TransientFailure(_))
    }

    /// True for both fresh acceptance and a normalized conflict.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Accepted(_) | Outcome::AlreadyRecorded(_))
    }
}

/// Identity of a submission for deduplication purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmissionKey {
    /// There is at most one placement result per account.
    Placement,
    /// One quiz submission per summary per session.
    Quiz(SummaryId),
}

/// The network operations the coordinator needs. Implemented by
/// `ApiClient`; test doubles script responses per call.
#[async_trait]
pub trait SubmitBackend: Send + Sync {
    /// Record the placement level; returns the level the server settled
    /// on.
    async fn push_level(&self, level: ReadingLevel) -> Result<ReadingLevel, ApiError>;

    /// The level currently on record, `None` while unplaced.
    async fn fetch_level(&self) -> Result<Option<ReadingLevel>, ApiError>;

    /// Submit quiz answers for grading.
    async fn push_quiz_answers(
        &self,
        summary_id: SummaryId,
        answers: Vec<QuizAnswer>,
    ) -> Result<QuizGrade, ApiError>;
}

type Slot = Arc<Mutex<Option<Outcome>>>;

pub struct SubmissionCoordinator {
    backend: Arc<dyn SubmitBackend>,
    store: Arc<dyn ClientPersistence>,
    slots: Mutex<HashMap<SubmissionKey, Slot>>,
}

impl SubmissionCoordinator {
    #[must_use]
    pub fn new(backend: Arc<dyn SubmitBackend>, store: Arc<dyn ClientPersistence>) -> Self {
        Self {
            backend,
            store,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Submit the locally computed placement level.
    ///
    /// A 409 means a level is already on record; the coordinator fetches
    /// the server's value, persists it locally (the server wins), and
    /// reports `AlreadyRecorded`. The local store is only updated after
    /// the server acknowledged, so a crash between the two resolves on
    /// retry through the same conflict path.
    pub async fn submit_level(&self, level: ReadingLevel) -> Outcome {
        let slot = self.slot(SubmissionKey::Placement).await;
        let mut guard = slot.lock().await;
        if let Some(outcome) = guard.as_ref() {
            debug!(?outcome, "replaying recorded placement outcome");
            return outcome.clone();
        }

        let outcome = self.attempt_level(level).await;
        if outcome.is_terminal() {
            *guard = Some(outcome.clone());
        }
        outcome
    }

    /// Submit quiz answers for a summary.
    ///
    /// Unlike the level endpoint, a 409 here has no documented recovery
    /// payload, so it surfaces as a rejection rather than being
    /// normalized.
    pub async fn submit_quiz(&self, summary_id: SummaryId, answers: Vec<QuizAnswer>) -> Outcome {
        let slot = self.slot(SubmissionKey::Quiz(summary_id)).await;
        let mut guard = slot.lock().await;
        if let Some(outcome) = guard.as_ref() {
            debug!(%summary_id, "replaying recorded quiz outcome");
            return outcome.clone();
        }

        let outcome = match self.backend.push_quiz_answers(summary_id, answers).await {
            Ok(grade) => Outcome::Accepted(Receipt::Quiz(grade)),
            Err(ApiError::Conflict) => Outcome::Rejected(RejectReason::Server {
                status: 409,
                message: "quiz already submitted for this summary".to_string(),
            }),
            Err(err) => classify(err),
        };
        if outcome.is_terminal() {
            *guard = Some(outcome.clone());
        }
        outcome
    }

    /// Forget the recorded outcome for a key. Called when a new session
    /// starts over the same target, so a rejection does not outlive the
    /// attempt it belongs to.
    pub async fn reset(&self, key: SubmissionKey) {
        self.slots.lock().await.remove(&key);
    }

    async fn slot(&self, key: SubmissionKey) -> Slot {
        let mut slots = self.slots.lock().await;
        slots.entry(key).or_default().clone()
    }

    async fn attempt_level(&self, level: ReadingLevel) -> Outcome {
        match self.backend.push_level(level).await {
            Ok(confirmed) => match self.record_level(confirmed).await {
                Ok(()) => Outcome::Accepted(Receipt::Level(confirmed)),
                // The server has the level; a retry will hit the 409
                // path and reconcile, so this must stay retryable.
                Err(err) => {
                    warn!(%err, "level accepted upstream but local persistence failed");
                    Outcome::TransientFailure(err.to_string())
                }
            },
            Err(ApiError::Conflict) => self.reconcile_level(level).await,
            Err(err) => classify(err),
        }
    }

    async fn reconcile_level(&self, local: ReadingLevel) -> Outcome {
        debug!("placement level already on record, fetching server value");
        let confirmed = match self.backend.fetch_level().await {
            Ok(Some(level)) => level,
            // Conflict with no level on record should not happen; keep
            // the local result rather than inventing one.
            Ok(None) => local,
            Err(ApiError::AuthExpired) => return Outcome::Rejected(RejectReason::AuthExpired),
            Err(err) => return Outcome::TransientFailure(err.to_string()),
        };
        match self.record_level(confirmed).await {
            Ok(()) => Outcome::AlreadyRecorded(Receipt::Level(confirmed)),
            Err(err) => Outcome::TransientFailure(err.to_string()),
        }
    }

    async fn record_level(&self, level: ReadingLevel) -> Result<(), StorageError> {
        self.store.set_reading_level(level).await?;
        self.store.set_placement_done(true).await?;
        if let Some(mut profile) = self.store.profile().await? {
            profile.level = Some(level);
            self.store.set_profile(&profile).await?;
        }
        Ok(())
    }
}

fn classify(err: ApiError) -> Outcome {
    match err {
        ApiError::AuthExpired => Outcome::Rejected(RejectReason::AuthExpired),
        ApiError::NotFound => Outcome::Rejected(RejectReason::Gone),
        ApiError::Rejected { status, message } => {
            Outcome::Rejected(RejectReason::Server { status, message })
        }
        // A 2xx with an undecodable body most likely means the server
        // recorded the outcome; retrying converges via the conflict
        // path instead of losing the result.
        ApiError::Transient(msg) | ApiError::Malformed(msg) => Outcome::TransientFailure(msg),
        ApiError::Conflict => Outcome::TransientFailure("unhandled conflict".to_string()),
    }
}
