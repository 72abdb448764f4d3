use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

use crate::model::answer::Answer;
use crate::model::ids::{ChoiceId, QuestionId};
use crate::model::question::Question;
use crate::scoring::{self, ScoringConfig, ScoringResult};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("session has no questions")]
    Empty,

    #[error("duplicate question id in session: {0}")]
    DuplicateQuestion(QuestionId),

    #[error("choice {choice} does not belong to question {question}")]
    UnknownChoice {
        question: QuestionId,
        choice: ChoiceId,
    },

    #[error("operation requires an in-progress session (state: {state:?})")]
    NotInProgress { state: SessionState },

    #[error("session is not completed yet (state: {state:?})")]
    NotCompleted { state: SessionState },

    #[error("session has no scored result to submit (state: {state:?})")]
    NotScored { state: SessionState },

    #[error("no submission is in flight (state: {state:?})")]
    NotSubmitting { state: SessionState },
}

/// Lifecycle of an assessment session.
///
/// `Submitted { already_recorded: true }` is the conflict terminal: the
/// backend reported the outcome as previously recorded, which counts as
/// success, not failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    InProgress,
    Completed,
    Scored,
    Submitting,
    Submitted { already_recorded: bool },
}

/// One pass through a fixed ordered question set, from the first prompt
/// to the final submission.
///
/// Owned exclusively by the client for its lifetime; `commit`/`advance`
/// are sequenced by user interaction, so no interior locking is needed.
/// Answers are keyed by question id with last-write-wins semantics, and
/// every traversed question ends up with an explicit answer (possibly a
/// skip) by the time the session completes.
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentSession {
    questions: Vec<Question>,
    current_index: usize,
    answers: HashMap<QuestionId, Answer>,
    state: SessionState,
    result: Option<ScoringResult>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl AssessmentSession {
    /// Start a session over a fixed ordered question set.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` for an empty set and
    /// `SessionError::DuplicateQuestion` if two questions share an id.
    pub fn new(questions: Vec<Question>, started_at: DateTime<Utc>) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }

        let mut seen = HashSet::new();
        for question in &questions {
            if !seen.insert(question.id()) {
                return Err(SessionError::DuplicateQuestion(question.id().clone()));
            }
        }

        Ok(Self {
            questions,
            current_index: 0,
            answers: HashMap::new(),
            state: SessionState::InProgress,
            result: None,
            started_at,
            completed_at: None,
        })
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn answers(&self) -> &HashMap<QuestionId, Answer> {
        &self.answers
    }

    #[must_use]
    pub fn answer_for(&self, question_id: &QuestionId) -> Option<&Answer> {
        self.answers.get(question_id)
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Zero-based index of the question currently presented.
    ///
    /// Monotonically non-decreasing, bounded by `total_questions`.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    /// Number of questions with a recorded answer, skips included.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        !matches!(self.state, SessionState::InProgress)
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        matches!(self.state, SessionState::Submitted { .. })
    }

    /// Scoring result, present from `Scored` onward.
    #[must_use]
    pub fn result(&self) -> Option<&ScoringResult> {
        self.result.as_ref()
    }

    /// Record (or overwrite) the answer for the current question.
    ///
    /// Does not advance. Committing the same choice twice is a no-op
    /// beyond the first call; committing a different choice replaces the
    /// previous answer, no history kept.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotInProgress` outside `InProgress` and
    /// `SessionError::UnknownChoice` for a choice the current question
    /// does not offer.
    pub fn commit(&mut self, choice_id: ChoiceId) -> Result<(), SessionError> {
        let question = self.require_current()?;
        if !question.has_choice(&choice_id) {
            return Err(SessionError::UnknownChoice {
                question: question.id().clone(),
                choice: choice_id,
            });
        }
        let question_id = question.id().clone();
        self.answers
            .insert(question_id.clone(), Answer::chosen(question_id, choice_id));
        Ok(())
    }

    /// Record an explicit skip for the current question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotInProgress` outside `InProgress`.
    pub fn skip(&mut self) -> Result<(), SessionError> {
        let question_id = self.require_current()?.id().clone();
        self.answers
            .insert(question_id.clone(), Answer::skip(question_id));
        Ok(())
    }

    /// Move to the next question, completing the session after the last.
    ///
    /// Callers should commit or skip first; if the current question has no
    /// recorded answer an explicit skip is recorded here, so a completed
    /// session always carries one answer per question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotInProgress` once the session is past
    /// `InProgress`; the session is left untouched.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<(), SessionError> {
        let question_id = self.require_current()?.id().clone();
        self.answers
            .entry(question_id.clone())
            .or_insert_with(|| Answer::skip(question_id));

        self.current_index += 1;
        if self.current_index >= self.questions.len() {
            self.state = SessionState::Completed;
            self.completed_at = Some(now);
        }
        Ok(())
    }

    /// Score the completed session exactly once.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotCompleted` unless the session is in
    /// `Completed`; a session that was already scored is not rescored.
    pub fn finalize(&mut self, config: &ScoringConfig) -> Result<&ScoringResult, SessionError> {
        if self.state != SessionState::Completed {
            return Err(SessionError::NotCompleted { state: self.state });
        }
        let result = scoring::compute(&self.questions, &self.answers, config);
        self.state = SessionState::Scored;
        Ok(self.result.insert(result))
    }

    /// Mark the session as handed to the submission coordinator.
    ///
    /// Allowed from `Scored` (placement: the locally computed level is
    /// what gets submitted) and from `Completed` (comprehension quizzes:
    /// raw answers go up and the server grades them).
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotScored` from any other state.
    pub fn begin_submission(&mut self) -> Result<(), SessionError> {
        if !matches!(self.state, SessionState::Scored | SessionState::Completed) {
            return Err(SessionError::NotScored { state: self.state });
        }
        self.state = SessionState::Submitting;
        Ok(())
    }

    /// Terminal transition after the backend acknowledged the result.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotSubmitting` unless a submission is in
    /// flight.
    pub fn complete_submission(&mut self, already_recorded: bool) -> Result<(), SessionError> {
        if self.state != SessionState::Submitting {
            return Err(SessionError::NotSubmitting { state: self.state });
        }
        self.state = SessionState::Submitted { already_recorded };
        Ok(())
    }

    /// Step back after a transient submission failure so the caller can
    /// retry. Returns to `Scored` when a result was computed locally,
    /// otherwise to `Completed`; either way nothing is recomputed.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotSubmitting` unless a submission is in
    /// flight.
    pub fn submission_failed(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Submitting {
            return Err(SessionError::NotSubmitting { state: self.state });
        }
        self.state = if self.result.is_some() {
            SessionState::Scored
        } else {
            SessionState::Completed
        };
        Ok(())
    }

    fn require_current(&self) -> Result<&Question, SessionError> {
        if self.state != SessionState::InProgress {
            return Err(SessionError::NotInProgress { state: self.state });
        }
        // InProgress guarantees the index is in bounds.
        self.questions
            .get(self.current_index)
            .ok_or(SessionError::NotInProgress { state: self.state })
    }
}
