use growin_core::model::UserId;
use growin_core::scoring::ReadingLevel;
use storage::repository::{AuthTokens, ClientPersistence, ProfileSnapshot};
use storage::sqlite::SqliteClientStore;

async fn connect(name: &str) -> SqliteClientStore {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let store = SqliteClientStore::connect(&url).await.expect("connect");
    store.migrate().await.expect("migrate");
    store
}

fn profile(level: Option<ReadingLevel>) -> ProfileSnapshot {
    ProfileSnapshot {
        user_id: UserId::new(7),
        username: "mina".to_string(),
        email: "mina@example.com".to_string(),
        level,
    }
}

#[tokio::test]
async fn sqlite_roundtrips_tokens_and_profile() {
    let store = connect("memdb_roundtrip").await;

    assert!(store.tokens().await.unwrap().is_none());
    assert!(store.profile().await.unwrap().is_none());

    let tokens = AuthTokens {
        access_token: "access-1".to_string(),
        refresh_token: "refresh-1".to_string(),
    };
    store.set_tokens(&tokens).await.unwrap();
    store.set_profile(&profile(None)).await.unwrap();

    assert_eq!(store.tokens().await.unwrap(), Some(tokens));
    assert_eq!(store.profile().await.unwrap(), Some(profile(None)));
}

#[tokio::test]
async fn sqlite_level_and_flag_are_last_write_wins() {
    let store = connect("memdb_level").await;

    store
        .set_reading_level(ReadingLevel::Beginner)
        .await
        .unwrap();
    store
        .set_reading_level(ReadingLevel::Intermediate)
        .await
        .unwrap();
    assert_eq!(
        store.reading_level().await.unwrap(),
        Some(ReadingLevel::Intermediate)
    );

    assert!(!store.placement_done().await.unwrap());
    store.set_placement_done(true).await.unwrap();
    assert!(store.placement_done().await.unwrap());
}

#[tokio::test]
async fn sqlite_profile_update_replaces_previous_snapshot() {
    let store = connect("memdb_profile").await;

    store.set_profile(&profile(None)).await.unwrap();
    store
        .set_profile(&profile(Some(ReadingLevel::Advanced)))
        .await
        .unwrap();

    let fetched = store.profile().await.unwrap().unwrap();
    assert_eq!(fetched.level, Some(ReadingLevel::Advanced));
}

#[tokio::test]
async fn sqlite_clear_operations() {
    let store = connect("memdb_clear").await;

    let tokens = AuthTokens {
        access_token: "a".to_string(),
        refresh_token: "r".to_string(),
    };
    store.set_tokens(&tokens).await.unwrap();
    store
        .set_reading_level(ReadingLevel::Advanced)
        .await
        .unwrap();
    store.set_placement_done(true).await.unwrap();

    store.clear_tokens().await.unwrap();
    assert!(store.tokens().await.unwrap().is_none());
    assert_eq!(
        store.reading_level().await.unwrap(),
        Some(ReadingLevel::Advanced)
    );

    store.clear_all().await.unwrap();
    assert!(store.reading_level().await.unwrap().is_none());
    assert!(!store.placement_done().await.unwrap());
}
