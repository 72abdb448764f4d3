use thiserror::Error;

use crate::model::QuestionError;
use crate::model::SessionError;
use crate::scoring::ScoringConfigError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    ScoringConfig(#[from] ScoringConfigError),
}
