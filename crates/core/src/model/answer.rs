use serde::{Deserialize, Serialize};

use crate::model::ids::{ChoiceId, QuestionId};
use crate::model::question::Question;

/// Recorded response to a single question.
///
/// A `None` choice is an explicit skip. Skip is never inferred from an
/// absent entry; every traversed question ends up with one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    question_id: QuestionId,
    choice_id: Option<ChoiceId>,
}

impl Answer {
    /// Records a chosen option for a question.
    #[must_use]
    pub fn chosen(question_id: QuestionId, choice_id: ChoiceId) -> Self {
        Self {
            question_id,
            choice_id: Some(choice_id),
        }
    }

    /// Records an explicit skip for a question.
    #[must_use]
    pub fn skip(question_id: QuestionId) -> Self {
        Self {
            question_id,
            choice_id: None,
        }
    }

    #[must_use]
    pub fn question_id(&self) -> &QuestionId {
        &self.question_id
    }

    #[must_use]
    pub fn choice_id(&self) -> Option<&ChoiceId> {
        self.choice_id.as_ref()
    }

    #[must_use]
    pub fn is_skip(&self) -> bool {
        self.choice_id.is_none()
    }

    /// Strict equality rule: correct iff a choice was made and it equals
    /// the question's declared correct choice. Skips are never correct,
    /// and questions without a declared answer grade as incorrect.
    #[must_use]
    pub fn is_correct_for(&self, question: &Question) -> bool {
        match (self.choice_id.as_ref(), question.correct_choice_id()) {
            (Some(chosen), Some(correct)) => chosen == correct,
            _ => false,
        }
    }
}
