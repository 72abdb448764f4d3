//! End-to-end flow tests against a mock backend: placement conflict
//! normalization, a full quiz round trip, and session restore.

use std::sync::Arc;

use growin_core::model::{ChoiceId, QuizSessionId, SummaryId};
use growin_core::scoring::ReadingLevel;
use growin_core::time::fixed_clock;
use services::api::{ApiClient, ApiConfig};
use services::auth::AuthService;
use services::placement::PlacementFlow;
use services::quiz::QuizFlow;
use services::review::ReviewService;
use services::submission::{Outcome, Receipt, SubmissionCoordinator};
use storage::repository::{AuthTokens, ClientPersistence, InMemoryPersistence};
use wiremock::matchers::{body_json, method, path};
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
async fn placement_conflict_settles_on_the_server_level() {
    let server = MockServer::start().await;
    // The account was already placed on another device.
    Mock::given(method("PATCH"))
        .and(path("/users/level"))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(serde_json::json!({
            "user_id": 7, "username": "mina", "email": "mina@example.com", "level": 3
        }))))
        .mount(&server)
        .await;

    let api = client(&server);
    let store = Arc::new(InMemoryPersistence::new());
    let coordinator = Arc::new(SubmissionCoordinator::new(
        Arc::new(api),
        store.clone(),
    ));

    let mut flow = PlacementFlow::start(coordinator, fixed_clock())
        .await
        .unwrap();
    // Skip everything; locally this scores Beginner.
    for _ in 0..6 {
        flow.next().unwrap();
    }

    let outcome = flow.submit().await.unwrap();
    assert_eq!(
        outcome,
        Outcome::AlreadyRecorded(Receipt::Level(ReadingLevel::Advanced))
    );
    // The server value wins over the local computation.
    assert_eq!(
        store.reading_level().await.unwrap(),
        Some(ReadingLevel::Advanced)
    );
    assert!(store.placement_done().await.unwrap());
}

#[tokio::test]
async fn quiz_round_trip_with_a_skip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/summaries/42/quiz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(serde_json::json!({
            "summary_id": 42,
            "quiz_id": 5,
            "question_count": 3,
            "questions": [
                {"question_id": 1, "question_type": "reading", "prompt": "One?",
                 "options": [{"option_id": 11, "label": "A", "text": "a"},
                             {"option_id": 12, "label": "B", "text": "b"}]},
                {"question_id": 2, "question_type": "vocabulary", "prompt": "Two?",
                 "options": [{"option_id": 21, "label": "A", "text": "a"},
                             {"option_id": 22, "label": "B", "text": "b"}]},
                {"question_id": 3, "question_type": "grammar", "prompt": "Three?",
                 "options": [{"option_id": 31, "label": "A", "text": "a"},
                             {"option_id": 32, "label": "B", "text": "b"}]}
            ]
        }))))
        .mount(&server)
        .await;
    // The skipped question must be present with an explicit null.
    Mock::given(method("POST"))
        .and(path("/summaries/42/quiz/submit"))
        .and(body_json(serde_json::json!({"answers": [
            {"question_id": 1, "selected_option_id": 11},
            {"question_id": 2, "selected_option_id": null},
            {"question_id": 3, "selected_option_id": 32}
        ]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(serde_json::json!({
            "session_id": 900,
            "quiz_id": 5,
            "score": 1,
            "total_questions": 3,
            "results": [
                {"question_id": 1, "selected_option_id": 11, "correct_option_id": 11,
                 "is_correct": true, "explanation": "stated in paragraph two"},
                {"question_id": 2, "selected_option_id": null, "correct_option_id": 21,
                 "is_correct": false, "explanation": null},
                {"question_id": 3, "selected_option_id": 32, "correct_option_id": 31,
                 "is_correct": false, "explanation": null}
            ]
        }))))
        .mount(&server)
        .await;

    let api = client(&server);
    let store = Arc::new(InMemoryPersistence::new());
    let coordinator = Arc::new(SubmissionCoordinator::new(Arc::new(api.clone()), store));

    let mut flow = QuizFlow::load(&api, coordinator, SummaryId::new(42), fixed_clock())
        .await
        .unwrap();
    flow.answer(ChoiceId::new("11")).unwrap();
    flow.next().unwrap();
    flow.skip().unwrap();
    flow.next().unwrap();
    flow.answer(ChoiceId::new("32")).unwrap();
    flow.next().unwrap();

    let outcome = flow.submit().await.unwrap();
    let Outcome::Accepted(Receipt::Quiz(grade)) = outcome else {
        panic!("expected an accepted quiz grade, got {outcome:?}");
    };
    assert_eq!(grade.session_id, QuizSessionId::new(900));
    assert_eq!(grade.score, 1);
    assert_eq!(grade.results[1].selected_option_id, None);
    assert!(flow.session().is_submitted());
}

#[tokio::test]
async fn graded_session_is_reconstructable_for_review() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/quiz-sessions/900/results"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(serde_json::json!({
            "session_id": 900,
            "quiz_id": 5,
            "score": 1,
            "total_questions": 3,
            "questions": [
                {"question_id": 1, "prompt": "One?",
                 "options": [{"option_id": 11, "label": "A", "text": "a"},
                             {"option_id": 12, "label": "B", "text": "b"}],
                 "correct_option_id": 11, "selected_option_id": 11,
                 "is_correct": true, "explanation": "stated in paragraph two"},
                {"question_id": 2, "prompt": "Two?",
                 "options": [{"option_id": 21, "label": "A", "text": "a"},
                             {"option_id": 22, "label": "B", "text": "b"}],
                 "correct_option_id": 21, "selected_option_id": null,
                 "is_correct": false, "explanation": null}
            ]
        }))))
        .mount(&server)
        .await;

    let review = ReviewService::new(client(&server));
    let session = review
        .quiz_session(QuizSessionId::new(900))
        .await
        .unwrap();
    assert_eq!(session.percent(), 33);
    assert!(!session.questions[0].was_skipped());
    assert!(session.questions[1].was_skipped());
    assert_eq!(
        session.questions[0].explanation.as_deref(),
        Some("stated in paragraph two")
    );
}

#[tokio::test]
async fn history_is_sorted_newest_first() {
    let server = MockServer::start().await;
    // Backend order is not trusted; the older attempt comes first here.
    Mock::given(method("GET"))
        .and(path("/users/me/review/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(serde_json::json!([
            {"article_id": 1, "summary_id": 10, "quiz_id": 100, "title": "older",
             "image_url": null, "last_reviewed_at": "2026-08-01T09:00:00Z",
             "score": 2, "total_questions": 3},
            {"article_id": 2, "summary_id": 20, "quiz_id": 200, "title": "newer",
             "image_url": null, "last_reviewed_at": "2026-08-20T09:00:00Z",
             "score": 3, "total_questions": 3}
        ]))))
        .mount(&server)
        .await;

    let review = ReviewService::new(client(&server));
    let items = review.history().await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].title, "newer");
    assert_eq!(items[1].title, "older");
    assert!(items[0].last_reviewed_at > items[1].last_reviewed_at);
}

#[tokio::test]
async fn restore_with_expired_token_clears_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryPersistence::new());
    store
        .set_tokens(&AuthTokens {
            access_token: "stale".to_string(),
            refresh_token: "stale-r".to_string(),
        })
        .await
        .unwrap();

    let auth = AuthService::new(client(&server), store.clone());
    let restored = auth.restore().await.unwrap();
    assert!(restored.is_none());
    assert!(store.tokens().await.unwrap().is_none());
}

#[tokio::test]
async fn login_hydrates_profile_level_and_placement_flag() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(serde_json::json!({
            "access_token": "tok-a",
            "refresh_token": "tok-r",
            "user": {"user_id": 7, "username": "mina", "email": "mina@example.com", "level": 2}
        }))))
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryPersistence::new());
    let auth = AuthService::new(client(&server), store.clone());
    let profile = auth.login("mina@example.com", "hunter2").await.unwrap();

    assert_eq!(profile.level, Some(ReadingLevel::Intermediate));
    assert_eq!(
        store.reading_level().await.unwrap(),
        Some(ReadingLevel::Intermediate)
    );
    assert!(store.placement_done().await.unwrap());
    assert!(store.tokens().await.unwrap().is_some());
}
