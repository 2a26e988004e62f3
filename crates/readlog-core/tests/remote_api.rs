//! HTTP session store tests against a mocked server.

use mockito::Matcher;
use readlog_core::{HttpSessionStore, ReadingSession, SessionStore, StoreError};

#[tokio::test]
async fn create_posts_duration_and_returns_the_stored_session() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/reading/sessions")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(serde_json::json!({ "duration": 420 })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"timestamp":1710504000,"duration":420}"#)
        .create_async()
        .await;

    let store = HttpSessionStore::new(&server.url()).unwrap();
    let session = store.create(420).await.unwrap();

    assert_eq!(
        session,
        ReadingSession {
            timestamp: 1_710_504_000,
            duration: 420
        }
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn list_decodes_the_session_array() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/reading/sessions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"timestamp":1710000000,"duration":300},{"timestamp":1710100000,"duration":90}]"#)
        .create_async()
        .await;

    let store = HttpSessionStore::new(&server.url()).unwrap();
    let sessions = store.list().await.unwrap();

    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].duration, 300);
    assert_eq!(sessions[1].timestamp, 1_710_100_000);
}

#[tokio::test]
async fn delete_targets_the_timestamp_path() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("DELETE", "/api/reading/sessions/1710000000")
        .with_status(200)
        .create_async()
        .await;

    let store = HttpSessionStore::new(&server.url()).unwrap();
    store.delete(1_710_000_000).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn non_success_status_is_a_typed_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/reading/sessions")
        .with_status(500)
        .create_async()
        .await;

    let store = HttpSessionStore::new(&server.url()).unwrap();
    let err = store.list().await.unwrap_err();
    assert!(matches!(err, StoreError::Status { status: 500, .. }));
}

#[test]
fn rejects_malformed_base_urls() {
    assert!(matches!(
        HttpSessionStore::new("not a url"),
        Err(StoreError::Url(_))
    ));
}
