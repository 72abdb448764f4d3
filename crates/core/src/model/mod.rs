mod answer;
mod ids;
mod question;
mod session;

pub use answer::Answer;
pub use ids::{ArticleId, ChoiceId, ParseIdError, QuestionId, QuizId, QuizSessionId, SummaryId, UserId};
pub use question::{Choice, Difficulty, Question, QuestionError, QuestionKind};
pub use session::{AssessmentSession, SessionError, SessionState};
