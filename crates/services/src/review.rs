//! Read-only reconstruction of past work: history, article text,
//! summary, and graded quiz sessions.
//!
//! Everything here is a typed view over the backend DTOs; nothing is
//! cached and nothing mutates, so a stale entry simply surfaces as
//! `ApiError::NotFound` when followed.

use chrono::{DateTime, Utc};

use growin_core::model::{ArticleId, QuizId, QuizSessionId, SummaryId, UserId};
use growin_core::scoring::ReadingLevel;

use crate::api::{
    ApiClient, ArticleReviewData, KeywordData, QuizSessionResultData, ReviewHistoryItemData,
    SummaryDetailData, UserProfileData,
};
use crate::error::ApiError;

/// A vocabulary keyword with its Korean translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    pub word: String,
    pub translation_ko: String,
}

impl From<KeywordData> for Keyword {
    fn from(data: KeywordData) -> Self {
        Self {
            word: data.word,
            translation_ko: data.translation_ko,
        }
    }
}

/// One entry in the user's review history list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewHistoryItem {
    pub article_id: ArticleId,
    pub summary_id: SummaryId,
    pub quiz_id: QuizId,
    pub title: String,
    pub image_url: Option<String>,
    pub last_reviewed_at: DateTime<Utc>,
    pub score: u32,
    pub total_questions: u32,
}

impl ReviewHistoryItem {
    /// Score as a rounded percentage, 0 for an empty quiz.
    #[must_use]
    pub fn percent(&self) -> u8 {
        percent(self.score, self.total_questions)
    }
}

/// Full article text with keywords, plus the pointers needed to jump
/// to the summary or the graded quiz session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleReview {
    pub article_id: ArticleId,
    pub title: String,
    pub content: String,
    pub published_at: DateTime<Utc>,
    pub last_reviewed_at: DateTime<Utc>,
    pub image_url: Option<String>,
    pub keywords: Vec<Keyword>,
    pub summary_id: SummaryId,
    pub session_id: QuizSessionId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryReview {
    pub summary_id: SummaryId,
    pub title: String,
    pub summary_text: String,
    pub published_at: DateTime<Utc>,
    pub image_url: Option<String>,
    pub keywords: Vec<Keyword>,
}

/// One graded question inside a reviewed quiz session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewedQuestion {
    pub question_id: i64,
    pub prompt: String,
    pub options: Vec<ReviewedOption>,
    pub correct_option_id: i64,
    pub selected_option_id: Option<i64>,
    pub is_correct: bool,
    pub explanation: Option<String>,
}

impl ReviewedQuestion {
    /// True when the question was left unanswered at submission time.
    #[must_use]
    pub fn was_skipped(&self) -> bool {
        self.selected_option_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewedOption {
    pub option_id: i64,
    pub label: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSessionReview {
    pub session_id: QuizSessionId,
    pub quiz_id: QuizId,
    pub score: u32,
    pub total_questions: u32,
    pub questions: Vec<ReviewedQuestion>,
}

impl QuizSessionReview {
    #[must_use]
    pub fn percent(&self) -> u8 {
        percent(self.score, self.total_questions)
    }
}

/// Profile as shown on the account screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountProfile {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub level: Option<ReadingLevel>,
}

pub struct ReviewService {
    api: ApiClient,
}

impl ReviewService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Review history, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` per the boundary classification.
    pub async fn history(&self) -> Result<Vec<ReviewHistoryItem>, ApiError> {
        let mut items: Vec<ReviewHistoryItem> = self
            .api
            .review_history()
            .await?
            .into_iter()
            .map(history_item)
            .collect();
        items.sort_by(|a, b| b.last_reviewed_at.cmp(&a.last_reviewed_at));
        Ok(items)
    }

    /// Full article review for one history entry.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` when the article was removed since
    /// it was reviewed.
    pub async fn article(&self, article_id: ArticleId) -> Result<ArticleReview, ApiError> {
        let data = self.api.article_review(article_id).await?;
        Ok(article_review(data))
    }

    /// Summary text and keywords for a summary pointer.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` per the boundary classification.
    pub async fn summary(&self, summary_id: SummaryId) -> Result<SummaryReview, ApiError> {
        let data = self.api.summary_detail(summary_id).await?;
        Ok(SummaryReview {
            summary_id: SummaryId::new(data.summary_id),
            title: data.title,
            summary_text: data.summary_text,
            published_at: data.published_at,
            image_url: data.image_url,
            keywords: data.keywords.into_iter().map(Keyword::from).collect(),
        })
    }

    /// Graded questions of a past quiz session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` per the boundary classification.
    pub async fn quiz_session(
        &self,
        session_id: QuizSessionId,
    ) -> Result<QuizSessionReview, ApiError> {
        let data = self.api.quiz_session_results(session_id).await?;
        Ok(session_review(data))
    }

    /// Current account profile straight from the backend.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::AuthExpired` when the token is no longer
    /// valid.
    pub async fn profile(&self) -> Result<AccountProfile, ApiError> {
        let data = self.api.fetch_me().await?;
        Ok(account_profile(data))
    }
}

fn percent(score: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let rounded = (u64::from(score) * 100 + u64::from(total) / 2) / u64::from(total);
    u8::try_from(rounded).unwrap_or(100)
}

fn history_item(data: ReviewHistoryItemData) -> ReviewHistoryItem {
    ReviewHistoryItem {
        article_id: ArticleId::new(data.article_id),
        summary_id: SummaryId::new(data.summary_id),
        quiz_id: QuizId::new(data.quiz_id),
        title: data.title,
        image_url: data.image_url,
        last_reviewed_at: data.last_reviewed_at,
        score: data.score,
        total_questions: data.total_questions,
    }
}

fn article_review(data: ArticleReviewData) -> ArticleReview {
    ArticleReview {
        article_id: ArticleId::new(data.article_id),
        title: data.title,
        content: data.content,
        published_at: data.published_at,
        last_reviewed_at: data.last_reviewed_at,
        image_url: data.image_url,
        keywords: data.article_keywords.into_iter().map(Keyword::from).collect(),
        summary_id: SummaryId::new(data.summary_id),
        session_id: QuizSessionId::new(data.session_id),
    }
}

fn session_review(data: QuizSessionResultData) -> QuizSessionReview {
    QuizSessionReview {
        session_id: QuizSessionId::new(data.session_id),
        quiz_id: QuizId::new(data.quiz_id),
        score: data.score,
        total_questions: data.total_questions,
        questions: data
            .questions
            .into_iter()
            .map(|q| ReviewedQuestion {
                question_id: q.question_id,
                prompt: q.prompt,
                options: q
                    .options
                    .into_iter()
                    .map(|o| ReviewedOption {
                        option_id: o.option_id,
                        label: o.label,
                        text: o.text,
                    })
                    .collect(),
                correct_option_id: q.correct_option_id,
                selected_option_id: q.selected_option_id,
                is_correct: q.is_correct,
                explanation: q.explanation,
            })
            .collect(),
    }
}

fn account_profile(data: UserProfileData) -> AccountProfile {
    AccountProfile {
        user_id: UserId::new(data.user_id),
        username: data.username,
        email: data.email,
        level: ReadingLevel::from_number(data.level),
    }
}
