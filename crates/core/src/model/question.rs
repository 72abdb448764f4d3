use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::{ChoiceId, QuestionId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question {id} needs at least two choices, got {len}")]
    TooFewChoices { id: QuestionId, len: usize },

    #[error("question {id} has duplicate choice id {choice}")]
    DuplicateChoice { id: QuestionId, choice: ChoiceId },

    #[error("question {id} declares correct choice {choice} which is not among its choices")]
    UnknownCorrectChoice { id: QuestionId, choice: ChoiceId },
}

/// Skill area a question exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Grammar,
    Vocabulary,
    Reading,
    Listening,
    General,
}

/// Difficulty tier used by the scoring weight table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// One selectable option of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    id: ChoiceId,
    text: String,
}

impl Choice {
    #[must_use]
    pub fn new(id: ChoiceId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &ChoiceId {
        &self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Immutable question belonging to a fixed question set.
///
/// `correct_choice_id` is only present when grading happens client-side
/// (the bundled placement set); quiz questions fetched from the backend
/// omit it because the server is the grading authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    kind: QuestionKind,
    prompt: String,
    choices: Vec<Choice>,
    correct_choice_id: Option<ChoiceId>,
    difficulty: Difficulty,
}

impl Question {
    /// Build a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when fewer than two choices are given, a
    /// choice id repeats, or the declared correct choice is unknown.
    pub fn new(
        id: QuestionId,
        kind: QuestionKind,
        prompt: impl Into<String>,
        choices: Vec<Choice>,
        correct_choice_id: Option<ChoiceId>,
        difficulty: Difficulty,
    ) -> Result<Self, QuestionError> {
        if choices.len() < 2 {
            return Err(QuestionError::TooFewChoices {
                id,
                len: choices.len(),
            });
        }

        let mut seen = HashSet::new();
        for choice in &choices {
            if !seen.insert(choice.id()) {
                return Err(QuestionError::DuplicateChoice {
                    id,
                    choice: choice.id().clone(),
                });
            }
        }

        if let Some(correct) = &correct_choice_id {
            if !choices.iter().any(|c| c.id() == correct) {
                return Err(QuestionError::UnknownCorrectChoice {
                    id,
                    choice: correct.clone(),
                });
            }
        }

        Ok(Self {
            id,
            kind,
            prompt: prompt.into(),
            choices,
            correct_choice_id,
            difficulty,
        })
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    #[must_use]
    pub fn correct_choice_id(&self) -> Option<&ChoiceId> {
        self.correct_choice_id.as_ref()
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Returns true if the given id names one of this question's choices.
    #[must_use]
    pub fn has_choice(&self, choice_id: &ChoiceId) -> bool {
        self.choices.iter().any(|c| c.id() == choice_id)
    }
}
