//! Tests for rest::client
//! Runs the REST client against a local mock server.

use std::sync::Arc;

use murmur_core::credential::{MemoryRecordStorage, SessionWriter, StaticToken};
use murmur_core::rest::*;
use murmur_core::{ClientConfig, Credential, ErrorKind, MessageQuery};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_client(server: &MockServer, token: Option<&str>) -> RestClient {
    let config = ClientConfig::new(&server.uri()).unwrap();
    let tokens = match token {
        Some(token) => StaticToken::new(token),
        None => StaticToken::absent(),
    };
    RestClient::new(&config, Arc::new(tokens)).unwrap()
}

fn message_json(id: &str, body: &str, created_at: &str) -> serde_json::Value {
    json!({
        "id": id,
        "chat_id": "c1",
        "sender_id": "u1",
        "body": body,
        "created_at": created_at,
    })
}

#[tokio::test]
async fn test_get_user_by_handle() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/alice"))
        .and(header("authorization", "Bearer t0ken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u1",
            "username": "alice",
            "display_name": "Alice",
            "profile_photo": null,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server, Some("t0ken"));
    let user = client.get_user_by_handle("alice").await.unwrap();

    assert_eq!(user.id, "u1");
    assert_eq!(user.display_name.as_deref(), Some("Alice"));
    assert_eq!(user.profile_photo, None);
}

#[tokio::test]
async fn test_get_user_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/ghost"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such user"))
        .mount(&server)
        .await;

    let client = create_client(&server, Some("t0ken"));
    let err = client.get_user_by_handle("ghost").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.body(), Some("no such user"));
}

#[tokio::test]
async fn test_get_inbox_uses_default_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/inbox"))
        .and(query_param("limit", "30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "chats": [{
                "chat_id": "c1",
                "peer_id": "u2",
                "last_message_at": "2026-03-01T10:00:00Z",
                "last_message_id": "m9",
                "last_body": "see you",
                "unread_count": 2,
            }, {
                "chat_id": "c2",
                "peer_id": "u3",
                "last_message_at": null,
                "last_message_id": null,
                "last_body": null,
                "unread_count": 0,
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server, Some("t0ken"));
    let inbox = client.get_inbox(None).await.unwrap();

    assert_eq!(inbox.len(), 2);
    assert_eq!(inbox[0].unread_count, 2);
    assert!(inbox[1].last_message_at.is_none());
}

#[tokio::test]
async fn test_get_messages_sends_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/messages"))
        .and(query_param("peer_id", "u1"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messages": [
                message_json("m1", "first", "2026-03-01T10:00:00Z"),
                message_json("m2", "second", "2026-03-01T10:01:00Z"),
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server, Some("t0ken"));
    let messages = client
        .get_messages(&MessageQuery::with_peer("u1").limit(10))
        .await
        .unwrap();

    let ids: Vec<&str> = messages.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["m1", "m2"]);
}

#[tokio::test]
async fn test_unauthorized_is_auth_error_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "expired"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server, Some("stale"));
    let err = client
        .get_messages(&MessageQuery::with_peer("u1").limit(10))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized { status: 401, .. }));
    assert_eq!(err.kind(), ErrorKind::Auth);
    assert!(err.body().unwrap().contains("expired"));
    // `expect(1)` is verified when the server drops.
}

#[tokio::test]
async fn test_missing_credential_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = create_client(&server, None);

    let err = client.get_inbox(Some(5)).await.unwrap_err();
    assert!(matches!(err, ApiError::NotAuthenticated));
    assert!(err.is_auth_error());

    let err = client.get_user_by_handle("alice").await.unwrap_err();
    assert!(matches!(err, ApiError::NotAuthenticated));
}

#[tokio::test]
async fn test_invalid_query_is_rejected_before_io() {
    let server = MockServer::start().await;
    let client = create_client(&server, Some("t0ken"));

    let err = client
        .get_messages(&MessageQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidQuery(_)));
    assert_eq!(err.kind(), ErrorKind::Invalid);
}

#[tokio::test]
async fn test_send_message_posts_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages/send"))
        .and(header("content-type", "application/json"))
        .and(header("authorization", "Bearer t0ken"))
        .and(body_json(json!({"peer_id": "u2", "body": "hello"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": message_json("m5", "hello", "2026-03-01T12:00:00Z"),
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server, Some("t0ken"));
    let message = client.send_message("u2", "hello").await.unwrap();

    assert_eq!(message.id, "m5");
    assert_eq!(message.body, "hello");
}

#[tokio::test]
async fn test_send_message_rejects_blank_body() {
    let server = MockServer::start().await;
    let client = create_client(&server, Some("t0ken"));

    let err = client.send_message("u2", "  \n ").await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidBody(_)));
}

#[tokio::test]
async fn test_server_error_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages/send"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server, Some("t0ken"));
    let err = client.send_message("u2", "hello").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.status(), Some(500));
    assert!(err.kind().is_retryable());
}

#[tokio::test]
async fn test_malformed_response_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/inbox"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let client = create_client(&server, Some("t0ken"));
    let err = client.get_inbox(None).await.unwrap_err();

    assert!(matches!(err, ApiError::Decode(_)));
    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[tokio::test]
async fn test_log_in_stores_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth"))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("username=alice"))
        .and(body_string_contains("client_secret=hunter2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh-token",
            "token_type": "bearer",
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/inbox"))
        .and(header("authorization", "Bearer fresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"chats": []})))
        .expect(1)
        .mount(&server)
        .await;

    let session = SessionWriter::new(Arc::new(MemoryRecordStorage::new()));
    let config = ClientConfig::new(&server.uri()).unwrap();
    let client = RestClient::with_session(&config, session.clone()).unwrap();

    let credential = client.log_in("alice", "hunter2").await.unwrap();
    assert_eq!(credential, Credential::new("fresh-token"));
    assert!(session.auth_state().is_logged_in);

    // Later calls pick the stored token up.
    assert!(client.get_inbox(None).await.unwrap().is_empty());

    client.log_out().unwrap();
    assert!(!session.auth_state().is_logged_in);
    assert!(matches!(
        client.get_inbox(None).await,
        Err(ApiError::NotAuthenticated)
    ));
}

#[tokio::test]
async fn test_log_in_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "bad credentials"})))
        .mount(&server)
        .await;

    let session = SessionWriter::new(Arc::new(MemoryRecordStorage::new()));
    let config = ClientConfig::new(&server.uri()).unwrap();
    let client = RestClient::with_session(&config, session.clone()).unwrap();

    let err = client.log_in("alice", "wrong").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Auth);
    assert!(!session.auth_state().is_logged_in);
}
