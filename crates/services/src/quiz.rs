//! Comprehension quizzes attached to article summaries.
//!
//! The backend sends numeric question and option ids; they are carried
//! through the session as their decimal string form and parsed back
//! when the answers go up. Grading is server-side, so the session
//! completes and submits without a local scoring pass.

use std::sync::Arc;

use growin_core::Clock;
use growin_core::model::{
    AssessmentSession, Choice, ChoiceId, Difficulty, Question, QuestionId, QuestionKind, QuizId,
    SessionError, SessionState, SummaryId,
};

use crate::api::{ApiClient, QuizQuestionData};
use crate::error::QuizError;
use crate::submission::{Outcome, QuizAnswer, SubmissionCoordinator, SubmissionKey};

/// One quiz run over a summary's question set.
pub struct QuizFlow {
    summary_id: SummaryId,
    quiz_id: QuizId,
    session: AssessmentSession,
    coordinator: Arc<SubmissionCoordinator>,
    clock: Clock,
}

impl QuizFlow {
    /// Fetch the quiz for a summary and start a session over it.
    ///
    /// Resets the summary's submission slot so an earlier run's
    /// rejection does not block this one.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Api` for fetch failures, `QuizError::Session`
    /// or `QuizError::Question` for a malformed question set.
    pub async fn load(
        api: &ApiClient,
        coordinator: Arc<SubmissionCoordinator>,
        summary_id: SummaryId,
        clock: Clock,
    ) -> Result<Self, QuizError> {
        let data = api.fetch_quiz(summary_id).await?;
        coordinator.reset(SubmissionKey::Quiz(summary_id)).await;

        let questions = data
            .questions
            .iter()
            .map(convert_question)
            .collect::<Result<Vec<_>, _>>()?;
        let session = AssessmentSession::new(questions, clock.now())?;

        Ok(Self {
            summary_id,
            quiz_id: QuizId::new(data.quiz_id),
            session,
            coordinator,
            clock,
        })
    }

    #[must_use]
    pub fn summary_id(&self) -> SummaryId {
        self.summary_id
    }

    #[must_use]
    pub fn quiz_id(&self) -> QuizId {
        self.quiz_id
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.session.current_question()
    }

    #[must_use]
    pub fn session(&self) -> &AssessmentSession {
        &self.session
    }

    /// Record the choice for the current question without advancing.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Session` for an unknown option or a finished
    /// session.
    pub fn answer(&mut self, choice: ChoiceId) -> Result<(), QuizError> {
        self.session.commit(choice)?;
        Ok(())
    }

    /// Record an explicit skip for the current question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Session` once the session is finished.
    pub fn skip(&mut self) -> Result<(), QuizError> {
        self.session.skip()?;
        Ok(())
    }

    /// Advance to the next question; the run completes after the last.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Session` once the session is finished.
    pub fn next(&mut self) -> Result<(), QuizError> {
        self.session.advance(self.clock.now())?;
        Ok(())
    }

    /// Submit the collected answers for server-side grading.
    ///
    /// Skipped questions go up with an explicit null, one entry per
    /// question in presentation order. Safe to call again after a
    /// transient failure.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Session` unless the run is finished.
    pub async fn submit(&mut self) -> Result<Outcome, QuizError> {
        let answers = self.wire_answers()?;

        if self.session.is_submitted() {
            // Already acknowledged; the slot replays the outcome.
            return Ok(self.coordinator.submit_quiz(self.summary_id, answers).await);
        }

        self.session.begin_submission()?;
        let outcome = self.coordinator.submit_quiz(self.summary_id, answers).await;
        match &outcome {
            Outcome::Accepted(_) => self.session.complete_submission(false)?,
            Outcome::AlreadyRecorded(_) => self.session.complete_submission(true)?,
            Outcome::Rejected(_) | Outcome::TransientFailure(_) => {
                self.session.submission_failed()?;
            }
        }
        Ok(outcome)
    }

    fn wire_answers(&self) -> Result<Vec<QuizAnswer>, QuizError> {
        if !matches!(
            self.session.state(),
            SessionState::Completed | SessionState::Submitted { .. }
        ) {
            return Err(SessionError::NotCompleted {
                state: self.session.state(),
            }
            .into());
        }

        self.session
            .questions()
            .iter()
            .map(|question| {
                let question_id = parse_wire_id(question.id().as_str())?;
                let selected_option_id = self
                    .session
                    .answer_for(question.id())
                    .and_then(|answer| answer.choice_id())
                    .map(|choice| parse_wire_id(choice.as_str()))
                    .transpose()?;
                Ok(QuizAnswer {
                    question_id,
                    selected_option_id,
                })
            })
            .collect()
    }
}

fn parse_wire_id(raw: &str) -> Result<i64, QuizError> {
    raw.parse::<i64>()
        .map_err(|_| QuizError::InvalidWireId(raw.to_string()))
}

fn convert_question(data: &QuizQuestionData) -> Result<Question, QuizError> {
    let choices = data
        .options
        .iter()
        .map(|option| Choice::new(ChoiceId::new(option.option_id.to_string()), &option.text))
        .collect();
    // The server never reveals the correct option before grading.
    Ok(Question::new(
        QuestionId::new(data.question_id.to_string()),
        kind_from_wire(&data.question_type),
        &data.prompt,
        choices,
        None,
        Difficulty::Intermediate,
    )?)
}

fn kind_from_wire(raw: &str) -> QuestionKind {
    match raw {
        "grammar" => QuestionKind::Grammar,
        "vocabulary" => QuestionKind::Vocabulary,
        "reading" => QuestionKind::Reading,
        "listening" => QuestionKind::Listening,
        _ => QuestionKind::General,
    }
}
