//! Weighted scoring and level classification.
//!
//! Weight table and thresholds are configuration with one canonical
//! source (`ScoringConfig::default`), not constants scattered near the
//! algorithm, so tuning never touches `compute`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::model::{Answer, Difficulty, Question, QuestionId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoringConfigError {
    #[error("advanced threshold ({advanced}%) must not be below intermediate ({intermediate}%)")]
    ThresholdOrder { advanced: u8, intermediate: u8 },

    #[error("percent threshold {0} exceeds 100")]
    ThresholdRange(u8),
}

/// Points awarded per difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightTable {
    pub beginner: u32,
    pub intermediate: u32,
    pub advanced: u32,
}

impl Default for WeightTable {
    fn default() -> Self {
        Self {
            beginner: 1,
            intermediate: 2,
            advanced: 3,
        }
    }
}

impl WeightTable {
    #[must_use]
    pub fn weight(&self, difficulty: Difficulty) -> u32 {
        match difficulty {
            Difficulty::Beginner => self.beginner,
            Difficulty::Intermediate => self.intermediate,
            Difficulty::Advanced => self.advanced,
        }
    }
}

/// Percent cutoffs mapping a score to a reading level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelThresholds {
    advanced_percent: u8,
    intermediate_percent: u8,
}

impl Default for LevelThresholds {
    fn default() -> Self {
        Self {
            advanced_percent: 75,
            intermediate_percent: 40,
        }
    }
}

impl LevelThresholds {
    /// Build validated thresholds.
    ///
    /// # Errors
    ///
    /// Returns `ScoringConfigError` if a threshold exceeds 100 or the
    /// advanced cutoff sits below the intermediate one.
    pub fn new(advanced_percent: u8, intermediate_percent: u8) -> Result<Self, ScoringConfigError> {
        for p in [advanced_percent, intermediate_percent] {
            if p > 100 {
                return Err(ScoringConfigError::ThresholdRange(p));
            }
        }
        if advanced_percent < intermediate_percent {
            return Err(ScoringConfigError::ThresholdOrder {
                advanced: advanced_percent,
                intermediate: intermediate_percent,
            });
        }
        Ok(Self {
            advanced_percent,
            intermediate_percent,
        })
    }

    #[must_use]
    pub fn classify(&self, percent: u8) -> ReadingLevel {
        if percent >= self.advanced_percent {
            ReadingLevel::Advanced
        } else if percent >= self.intermediate_percent {
            ReadingLevel::Intermediate
        } else {
            ReadingLevel::Beginner
        }
    }
}

/// Full scoring configuration for a placement test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub weights: WeightTable,
    pub thresholds: LevelThresholds,
}

/// Reading level assigned by the placement test (1 to 3 on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ReadingLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl ReadingLevel {
    #[must_use]
    pub fn number(self) -> u8 {
        match self {
            ReadingLevel::Beginner => 1,
            ReadingLevel::Intermediate => 2,
            ReadingLevel::Advanced => 3,
        }
    }

    #[must_use]
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(ReadingLevel::Beginner),
            2 => Some(ReadingLevel::Intermediate),
            3 => Some(ReadingLevel::Advanced),
            _ => None,
        }
    }
}

impl From<ReadingLevel> for u8 {
    fn from(level: ReadingLevel) -> Self {
        level.number()
    }
}

impl TryFrom<u8> for ReadingLevel {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        ReadingLevel::from_number(n).ok_or_else(|| format!("reading level out of range: {n}"))
    }
}

/// Immutable result of scoring a completed placement session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringResult {
    score: u64,
    max_score: u64,
    percent: u8,
    level: ReadingLevel,
}

impl ScoringResult {
    #[must_use]
    pub fn score(&self) -> u64 {
        self.score
    }

    #[must_use]
    pub fn max_score(&self) -> u64 {
        self.max_score
    }

    #[must_use]
    pub fn percent(&self) -> u8 {
        self.percent
    }

    #[must_use]
    pub fn level(&self) -> ReadingLevel {
        self.level
    }
}

/// Compute the weighted score over a question set.
///
/// Pure and deterministic: the same `(questions, answers, config)` always
/// yields the same result. `max_score` sums every question's weight no
/// matter what was answered; `score` sums weights of correctly answered
/// questions only. `percent` is 0 when `max_score` is 0.
#[must_use]
pub fn compute(
    questions: &[Question],
    answers: &HashMap<QuestionId, Answer>,
    config: &ScoringConfig,
) -> ScoringResult {
    // Sums are u64 so pathological weight tables cannot overflow.
    let mut score = 0_u64;
    let mut max_score = 0_u64;

    for question in questions {
        let weight = u64::from(config.weights.weight(question.difficulty()));
        max_score += weight;

        if let Some(answer) = answers.get(question.id()) {
            if answer.is_correct_for(question) {
                score += weight;
            }
        }
    }

    let percent = if max_score == 0 {
        0
    } else {
        // Round half up, matching Math.round on non-negative input.
        u8::try_from((score * 100 + max_score / 2) / max_score).unwrap_or(100)
    };

    ScoringResult {
        score,
        max_score,
        percent,
        level: config.thresholds.classify(percent),
    }
}
