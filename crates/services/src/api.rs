//! Typed client for the Growin backend.
//!
//! Every endpoint decodes into a serde DTO at this boundary; status
//! codes are classified into `ApiError` in one place (`decode`) so no
//! loosely-typed payload or raw status leaks past this module.

use std::env;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use growin_core::model::{ArticleId, QuizId, QuizSessionId, SummaryId};
use growin_core::scoring::ReadingLevel;

use crate::error::ApiError;
use crate::submission::{QuestionGrade, QuizAnswer, QuizGrade, SubmitBackend};

/// Backend location. One canonical default, overridable for staging.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://growin-back.onrender.com".to_string(),
        }
    }
}

impl ApiConfig {
    /// Reads `GROWIN_API_BASE_URL`, falling back to the production host.
    #[must_use]
    pub fn from_env() -> Self {
        match env::var("GROWIN_API_BASE_URL") {
            Ok(url) if !url.trim().is_empty() => Self { base_url: url },
            _ => Self::default(),
        }
    }
}

/// HTTP client carrying the bearer token for authenticated endpoints.
///
/// Clones share the token slot, so a token set by the login flow is
/// visible to every handle.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    config: ApiConfig,
    bearer: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
            bearer: Arc::new(RwLock::new(None)),
        }
    }

    #[must_use]
    pub fn from_env() -> Self {
        Self::new(ApiConfig::from_env())
    }

    /// Install the bearer token used by authenticated endpoints.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Transient` if the token slot is poisoned.
    pub fn set_bearer(&self, token: impl Into<String>) -> Result<(), ApiError> {
        let mut slot = self
            .bearer
            .write()
            .map_err(|_| ApiError::Transient("token slot poisoned".to_string()))?;
        *slot = Some(token.into());
        Ok(())
    }

    /// Drop the bearer token (logout, expired auth).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Transient` if the token slot is poisoned.
    pub fn clear_bearer(&self) -> Result<(), ApiError> {
        let mut slot = self
            .bearer
            .write()
            .map_err(|_| ApiError::Transient("token slot poisoned".to_string()))?;
        *slot = None;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        let slot = self
            .bearer
            .read()
            .map_err(|_| ApiError::Transient("token slot poisoned".to_string()))?;
        Ok(match slot.as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let builder = self.authorized(self.client.get(self.url(path)))?;
        let response = builder.send().await?;
        decode(response).await
    }

    async fn send_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        builder: RequestBuilder,
        body: &B,
    ) -> Result<T, ApiError> {
        let builder = self.authorized(builder)?;
        let response = builder.json(body).send().await?;
        decode(response).await
    }

    /// POST /auth/signup (unauthenticated).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport failures or rejected signups.
    pub async fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<SignupData, ApiError> {
        let payload = SignupPayload {
            username,
            email,
            password,
        };
        let response = self
            .client
            .post(self.url("/auth/signup"))
            .json(&payload)
            .send()
            .await?;
        decode(response).await
    }

    /// POST /auth/login (unauthenticated).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport failures or rejected credentials.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginData, ApiError> {
        let payload = LoginPayload { email, password };
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(&payload)
            .send()
            .await?;
        decode(response).await
    }

    /// GET /users/me.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::AuthExpired` on 401, `ApiError` otherwise.
    pub async fn fetch_me(&self) -> Result<UserProfileData, ApiError> {
        self.get_json("/users/me").await
    }

    /// PATCH /users/level with the locally computed placement level.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Conflict` when the level was already assigned
    /// (409); callers normalize that to success with the server value.
    pub async fn update_level(&self, level: ReadingLevel) -> Result<LevelUpdateData, ApiError> {
        let body = LevelUpdatePayload {
            level: level.number(),
        };
        self.send_json(self.client.patch(self.url("/users/level")), &body)
            .await
    }

    /// GET /summaries/{id}/quiz.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` per the boundary classification.
    pub async fn fetch_quiz(&self, summary_id: SummaryId) -> Result<QuizData, ApiError> {
        self.get_json(&format!("/summaries/{summary_id}/quiz")).await
    }

    /// POST /summaries/{id}/quiz/submit with the collected answers.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` per the boundary classification.
    pub async fn submit_quiz(
        &self,
        summary_id: SummaryId,
        answers: &[QuizAnswer],
    ) -> Result<QuizSubmitData, ApiError> {
        let body = QuizSubmitPayload { answers };
        self.send_json(
            self.client
                .post(self.url(&format!("/summaries/{summary_id}/quiz/submit"))),
            &body,
        )
        .await
    }

    /// GET /users/me/review/history.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` per the boundary classification.
    pub async fn review_history(&self) -> Result<Vec<ReviewHistoryItemData>, ApiError> {
        self.get_json("/users/me/review/history").await
    }

    /// GET /articles/{id}/review.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for stale pointers, `ApiError`
    /// otherwise.
    pub async fn article_review(&self, article_id: ArticleId) -> Result<ArticleReviewData, ApiError> {
        self.get_json(&format!("/articles/{article_id}/review")).await
    }

    /// GET /summaries/{id}.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` per the boundary classification.
    pub async fn summary_detail(&self, summary_id: SummaryId) -> Result<SummaryDetailData, ApiError> {
        self.get_json(&format!("/summaries/{summary_id}")).await
    }

    /// GET /quiz-sessions/{id}/results.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` per the boundary classification.
    pub async fn quiz_session_results(
        &self,
        session_id: QuizSessionId,
    ) -> Result<QuizSessionResultData, ApiError> {
        self.get_json(&format!("/quiz-sessions/{session_id}/results"))
            .await
    }
}

#[async_trait]
impl SubmitBackend for ApiClient {
    async fn push_level(&self, level: ReadingLevel) -> Result<ReadingLevel, ApiError> {
        let data = self.update_level(level).await?;
        ReadingLevel::from_number(data.level)
            .ok_or_else(|| ApiError::Malformed(format!("level out of range: {}", data.level)))
    }

    async fn fetch_level(&self) -> Result<Option<ReadingLevel>, ApiError> {
        let profile = self.fetch_me().await?;
        Ok(ReadingLevel::from_number(profile.level))
    }

    async fn push_quiz_answers(
        &self,
        summary_id: SummaryId,
        answers: Vec<QuizAnswer>,
    ) -> Result<QuizGrade, ApiError> {
        let data = self.submit_quiz(summary_id, &answers).await?;
        Ok(QuizGrade {
            session_id: QuizSessionId::new(data.session_id),
            quiz_id: QuizId::new(data.quiz_id),
            score: data.score,
            total_questions: data.total_questions,
            results: data
                .results
                .into_iter()
                .map(|r| QuestionGrade {
                    question_id: r.question_id,
                    selected_option_id: r.selected_option_id,
                    correct_option_id: r.correct_option_id,
                    is_correct: r.is_correct,
                    explanation: r.explanation,
                })
                .collect(),
        })
    }
}

/// Classify a response status and decode the `{message, statusCode,
/// data}` envelope the backend wraps every success body in.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    match status {
        StatusCode::UNAUTHORIZED => Err(ApiError::AuthExpired),
        StatusCode::NOT_FOUND => Err(ApiError::NotFound),
        StatusCode::CONFLICT => Err(ApiError::Conflict),
        s if s.is_success() => {
            let envelope: Envelope<T> = response
                .json()
                .await
                .map_err(|err| ApiError::Malformed(err.to_string()))?;
            Ok(envelope.data)
        }
        s => {
            let raw = response.text().await.unwrap_or_default();
            Err(ApiError::Rejected {
                status: s.as_u16(),
                message: server_message(&raw),
            })
        }
    }
}

/// Pull the server's `message` field out of an error body when it is
/// JSON, otherwise fall back to the raw text.
fn server_message(raw: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
    }
    if let Ok(body) = serde_json::from_str::<ErrorBody>(raw) {
        if let Some(message) = body.message {
            if !message.trim().is_empty() {
                return message;
            }
        }
    }
    raw.trim().to_string()
}

//
// ─── WIRE SHAPES ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    #[allow(dead_code)]
    message: Option<String>,
    #[serde(rename = "statusCode", default)]
    #[allow(dead_code)]
    status_code: Option<i64>,
    data: T,
}

#[derive(Debug, Serialize)]
struct SignupPayload<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct LoginPayload<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct LevelUpdatePayload {
    level: u8,
}

#[derive(Debug, Serialize)]
struct QuizSubmitPayload<'a> {
    answers: &'a [QuizAnswer],
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignupData {
    pub user_id: i64,
    pub username: String,
    pub email: String,
}

/// Profile as the backend reports it; `level` is 0 until placement ran.
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfileData {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub level: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginData {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserProfileData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LevelUpdateData {
    pub user_id: i64,
    pub level: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizOptionData {
    pub option_id: i64,
    #[serde(default)]
    pub label: String,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizQuestionData {
    pub question_id: i64,
    #[serde(default)]
    pub question_type: String,
    pub prompt: String,
    pub options: Vec<QuizOptionData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizData {
    pub summary_id: i64,
    pub quiz_id: i64,
    pub question_count: u32,
    pub questions: Vec<QuizQuestionData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizResultItemData {
    pub question_id: i64,
    pub selected_option_id: Option<i64>,
    pub correct_option_id: i64,
    pub is_correct: bool,
    #[serde(default)]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizSubmitData {
    pub session_id: i64,
    pub quiz_id: i64,
    pub score: u32,
    pub total_questions: u32,
    pub results: Vec<QuizResultItemData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewHistoryItemData {
    pub article_id: i64,
    pub summary_id: i64,
    pub quiz_id: i64,
    pub title: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub last_reviewed_at: DateTime<Utc>,
    pub score: u32,
    pub total_questions: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeywordData {
    pub word: String,
    pub translation_ko: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArticleReviewData {
    pub article_id: i64,
    pub title: String,
    pub content: String,
    pub published_at: DateTime<Utc>,
    pub last_reviewed_at: DateTime<Utc>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub article_keywords: Vec<KeywordData>,
    pub summary_id: i64,
    pub session_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummaryDetailData {
    pub summary_id: i64,
    pub title: String,
    pub summary_text: String,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub keywords: Vec<KeywordData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizSessionQuestionData {
    pub question_id: i64,
    pub prompt: String,
    pub options: Vec<QuizOptionData>,
    pub correct_option_id: i64,
    pub selected_option_id: Option<i64>,
    pub is_correct: bool,
    #[serde(default)]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizSessionResultData {
    pub session_id: i64,
    pub quiz_id: i64,
    pub score: u32,
    pub total_questions: u32,
    pub questions: Vec<QuizSessionQuestionData>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_unwraps_data() {
        let body = r#"{"message":"SUCCESS","statusCode":200,"data":{"user_id":1,"level":2}}"#;
        let envelope: Envelope<LevelUpdateData> = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.data.level, 2);
    }

    #[test]
    fn server_message_prefers_json_field() {
        assert_eq!(server_message(r#"{"message":"nope"}"#), "nope");
        assert_eq!(server_message("plain failure"), "plain failure");
        assert_eq!(server_message(r#"{"message":""}"#), r#"{"message":""}"#);
    }

    #[test]
    fn quiz_answer_serializes_null_for_skip() {
        let answer = QuizAnswer {
            question_id: 3,
            selected_option_id: None,
        };
        let json = serde_json::to_string(&answer).unwrap();
        assert_eq!(json, r#"{"question_id":3,"selected_option_id":null}"#);
    }
}
