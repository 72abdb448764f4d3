//! Placement test: one fixed six-question pass that assigns the
//! account's reading level.

use std::sync::Arc;

use growin_core::Clock;
use growin_core::model::{AssessmentSession, ChoiceId, Question, SessionError, SessionState};
use growin_core::placement::placement_questions;
use growin_core::scoring::{ScoringConfig, ScoringResult};

use crate::error::SubmitError;
use crate::submission::{Outcome, SubmissionCoordinator, SubmissionKey};

/// Drives an [`AssessmentSession`] over the bundled placement set and
/// hands the classified level to the submission coordinator.
///
/// Starting a flow resets the placement submission slot: a rejection
/// recorded for an earlier run must not block this one.
pub struct PlacementFlow {
    session: AssessmentSession,
    config: ScoringConfig,
    coordinator: Arc<SubmissionCoordinator>,
    clock: Clock,
}

impl PlacementFlow {
    /// Begin a fresh placement run.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError::Session` only if the bundled question set
    /// is invalid, which would be a build defect.
    pub async fn start(
        coordinator: Arc<SubmissionCoordinator>,
        clock: Clock,
    ) -> Result<Self, SubmitError> {
        coordinator.reset(SubmissionKey::Placement).await;
        let session = AssessmentSession::new(placement_questions(), clock.now())?;
        Ok(Self {
            session,
            config: ScoringConfig::default(),
            coordinator,
            clock,
        })
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.session.current_question()
    }

    #[must_use]
    pub fn progress(&self) -> (usize, usize) {
        (self.session.current_index(), self.session.total_questions())
    }

    #[must_use]
    pub fn session(&self) -> &AssessmentSession {
        &self.session
    }

    /// Record the choice for the current question without advancing.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError::Session` for an unknown choice or a
    /// finished session.
    pub fn answer(&mut self, choice: ChoiceId) -> Result<(), SubmitError> {
        self.session.commit(choice)?;
        Ok(())
    }

    /// Record an explicit skip for the current question.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError::Session` once the session is finished.
    pub fn skip(&mut self) -> Result<(), SubmitError> {
        self.session.skip()?;
        Ok(())
    }

    /// Advance to the next question; the run completes after the last.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError::Session` once the session is finished.
    pub fn next(&mut self) -> Result<(), SubmitError> {
        self.session.advance(self.clock.now())?;
        Ok(())
    }

    /// Score the completed run.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError::Session` unless all questions were
    /// traversed.
    pub fn finalize(&mut self) -> Result<ScoringResult, SubmitError> {
        Ok(*self.session.finalize(&self.config)?)
    }

    /// Submit the classified level, scoring first if needed.
    ///
    /// Safe to call again after a transient failure; after a terminal
    /// outcome the coordinator replays the recorded value.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError::Session` if the run is not finished yet.
    pub async fn submit(&mut self) -> Result<Outcome, SubmitError> {
        if self.session.state() == SessionState::Completed {
            self.session.finalize(&self.config)?;
        }
        let Some(result) = self.session.result().copied() else {
            return Err(SessionError::NotScored {
                state: self.session.state(),
            }
            .into());
        };

        if self.session.is_submitted() {
            // Already acknowledged; the slot replays the outcome.
            return Ok(self.coordinator.submit_level(result.level()).await);
        }

        self.session.begin_submission()?;
        let outcome = self.coordinator.submit_level(result.level()).await;
        match &outcome {
            Outcome::Accepted(_) => self.session.complete_submission(false)?,
            Outcome::AlreadyRecorded(_) => self.session.complete_submission(true)?,
            Outcome::Rejected(_) | Outcome::TransientFailure(_) => {
                self.session.submission_failed()?;
            }
        }
        Ok(outcome)
    }
}
