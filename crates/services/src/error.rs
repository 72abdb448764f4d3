//! Shared error types for the services crate.

use thiserror::Error;

use growin_core::model::{QuestionError, SessionError};
use storage::repository::StorageError;

/// Errors surfaced at the backend API boundary.
///
/// Status codes are classified here, in one place, so callers always see
/// a typed variant instead of a raw response. `AuthExpired` and
/// `NotFound` are deliberately distinct: stale review pointers must not
/// read as a login problem.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ApiError {
    /// 401: the bearer token is no longer valid. Never retried with the
    /// same token; the user has to re-authenticate.
    #[error("your session has expired, please sign in again")]
    AuthExpired,

    /// 404: the resource no longer exists (deleted article, stale
    /// history pointer).
    #[error("this content is no longer available")]
    NotFound,

    /// 409: the outcome was already recorded server-side. Normalized to
    /// success by the submission coordinator.
    #[error("already recorded")]
    Conflict,

    /// Connectivity problems and timeouts; safe to retry.
    #[error("network error: {0}")]
    Transient(String),

    /// Any other non-2xx status.
    #[error("request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// 2xx with a body that does not decode into the expected shape.
    #[error("malformed response payload: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transient(err.to_string())
    }
}

/// Errors emitted by `AuthService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by the submission coordinator and flows.
///
/// Network-level results are reported through `Outcome`, not here; this
/// only covers programming-contract violations (bad session state) that
/// must fail fast.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SubmitError {
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Errors emitted by `QuizFlow`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error("backend sent a non-numeric id: {0}")]
    InvalidWireId(String),
}
