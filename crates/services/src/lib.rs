#![forbid(unsafe_code)]

pub mod api;
pub mod auth;
pub mod error;
pub mod placement;
pub mod quiz;
pub mod review;
pub mod submission;

pub use api::{ApiClient, ApiConfig};
pub use auth::AuthService;
pub use error::{ApiError, AuthError, QuizError, SubmitError};
pub use placement::PlacementFlow;
pub use quiz::QuizFlow;
pub use review::ReviewService;
pub use submission::{Outcome, Receipt, RejectReason, SubmissionCoordinator, SubmissionKey};
