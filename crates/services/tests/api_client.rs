use growin_core::model::{ArticleId, SummaryId};
use growin_core::scoring::ReadingLevel;
use services::api::{ApiClient, ApiConfig};
use services::error::ApiError;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> ApiClient {
    ApiClient::new(ApiConfig {
        base_url: server.uri(),
    })
}

fn envelope(data: serde_json::Value) -> serde_json::Value {
    serde_json::json!({"message": "SUCCESS", "statusCode": 200, "data": data})
}

#[tokio::test]
async fn login_decodes_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(serde_json::json!({
            "email": "mina@example.com",
            "password": "hunter2"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(serde_json::json!({
            "access_token": "tok-a",
            "refresh_token": "tok-r",
            "user": {"user_id": 7, "username": "mina", "email": "mina@example.com", "level": 0}
        }))))
        .mount(&server)
        .await;

    let data = client(&server)
        .login("mina@example.com", "hunter2")
        .await
        .unwrap();
    assert_eq!(data.access_token, "tok-a");
    assert_eq!(data.user.username, "mina");
    assert_eq!(data.user.level, 0);
}

#[tokio::test]
async fn bearer_token_is_attached_once_set() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .and(header("authorization", "Bearer tok-a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(serde_json::json!({
            "user_id": 7, "username": "mina", "email": "mina@example.com", "level": 2
        }))))
        .mount(&server)
        .await;

    let api = client(&server);
    api.set_bearer("tok-a").unwrap();
    let profile = api.fetch_me().await.unwrap();
    assert_eq!(profile.level, 2);
}

#[tokio::test]
async fn expired_auth_and_missing_content_are_distinct() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/articles/99/review"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let api = client(&server);
    let expired = api.fetch_me().await.unwrap_err();
    let gone = api.article_review(ArticleId::new(99)).await.unwrap_err();
    assert_eq!(expired, ApiError::AuthExpired);
    assert_eq!(gone, ApiError::NotFound);
    assert_ne!(expired.to_string(), gone.to_string());
}

#[tokio::test]
async fn level_conflict_surfaces_as_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/users/level"))
        .and(body_json(serde_json::json!({"level": 2})))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    let err = client(&server)
        .update_level(ReadingLevel::Intermediate)
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::Conflict);
}

#[tokio::test]
async fn rejected_status_carries_the_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/signup"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(serde_json::json!({"message": "username already taken"})),
        )
        .mount(&server)
        .await;

    let err = client(&server)
        .signup("mina", "mina@example.com", "hunter2")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ApiError::Rejected {
            status: 422,
            message: "username already taken".to_string(),
        }
    );
}

#[tokio::test]
async fn malformed_success_body_is_not_a_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client(&server).fetch_me().await.unwrap_err();
    assert!(matches!(err, ApiError::Malformed(_)));
}

#[tokio::test]
async fn quiz_fetch_decodes_questions_and_options() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/summaries/42/quiz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(serde_json::json!({
            "summary_id": 42,
            "quiz_id": 5,
            "question_count": 1,
            "questions": [{
                "question_id": 1,
                "question_type": "reading",
                "prompt": "What is the main idea?",
                "options": [
                    {"option_id": 11, "label": "A", "text": "first"},
                    {"option_id": 12, "label": "B", "text": "second"}
                ]
            }]
        }))))
        .mount(&server)
        .await;

    let quiz = client(&server).fetch_quiz(SummaryId::new(42)).await.unwrap();
    assert_eq!(quiz.quiz_id, 5);
    assert_eq!(quiz.questions.len(), 1);
    assert_eq!(quiz.questions[0].options[1].option_id, 12);
}
