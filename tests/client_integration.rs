//! Integration tests for the client.
//!
//! A recording transport stands in for HTTP. These tests verify:
//! - Request path, body and bearer header
//! - Classification of success, server errors, decode errors and transport failures
//! - Explicit credential threading
//! - Configuration applied to requests

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tern::client::{
    ActionRequest, NoCredentials, RawResponse, StaticToken, TransportError,
};
use tern::prelude::*;
use tern::ErrorCode;

struct Recorder {
    replies: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
    requests: Mutex<Vec<ActionRequest>>,
}

impl Recorder {
    fn replying(replies: Vec<Result<RawResponse, TransportError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<ActionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for Recorder {
    async fn send(&self, request: ActionRequest) -> Result<RawResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Other("no reply queued".into())))
    }
}

#[derive(Debug, Deserialize, PartialEq)]
struct User {
    id: i64,
    email: String,
}

#[tokio::test]
async fn test_find_many_with_filter_body() {
    let transport = Recorder::replying(vec![Ok(RawResponse::ok(json!({
        "meta": { "count": 1, "numberOfPages": 1 },
        "data": [{ "id": 1, "email": "a@example.com" }]
    })))]);
    let client = Client::new(transport.clone(), Arc::new(MemoryCredentials::with_token("t0")));

    let filter = Filter::builder().ends_with("@example.com".to_string()).build();
    let input = json!({ "where": { "email": tern::wire::encode(&filter).unwrap() }, "take": 10 });
    let response: MetaResponse<PagingInfo, Vec<User>> = client
        .action_with_meta("users", Action::FindMany, &input)
        .await
        .unwrap();

    assert_eq!(response.meta, PagingInfo { count: 1, number_of_pages: Some(1) });
    assert_eq!(response.data[0].email, "a@example.com");

    let sent = transport.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].path(), "/users/action/find-many");
    assert_eq!(sent[0].authorization().as_deref(), Some("Bearer t0"));
    assert_eq!(sent[0].body["where"], json!({ "email": { "endsWith": "@example.com" } }));
}

#[tokio::test]
async fn test_server_error_envelope() {
    let transport = Recorder::replying(vec![Ok(RawResponse::new(
        400,
        json!({
            "error": {
                "type": "ValidationError",
                "message": "Invalid input",
                "errors": { "email": "is not valid" }
            }
        }),
    ))]);
    let client = Client::anonymous(transport);

    let err = client
        .action::<_, Value>("users", Action::Create, &json!({ "create": { "email": "x" } }))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ServerError);
    let remote = err.remote.as_ref().unwrap();
    assert_eq!(remote.kind, "ValidationError");
    assert_eq!(remote.field_error("email"), Some("is not valid"));
    assert!(err.display_full().contains("email: is not valid"));
    assert_eq!(err.context.model.as_deref(), Some("users"));
}

#[tokio::test]
async fn test_bare_error_body_with_error_status() {
    let transport = Recorder::replying(vec![Ok(RawResponse::new(
        404,
        json!({ "type": "NotFound", "message": "not found" }),
    ))]);
    let client = Client::anonymous(transport);
    let err = client
        .action::<_, Value>("users", Action::FindUnique, &json!({ "where": { "id": 9 } }))
        .await
        .unwrap_err();
    assert!(err.is_server_error());
    assert_eq!(err.remote.unwrap().kind, "NotFound");
}

#[tokio::test]
async fn test_transport_and_decode_failures_are_distinct() {
    let transport = Recorder::replying(vec![
        Err(TransportError::Timeout(Duration::from_secs(5))),
        Ok(RawResponse::ok(json!({ "data": { "id": "not a number", "email": 1 } }))),
    ]);
    let client = Client::anonymous(transport);

    let err = client
        .action::<_, User>("users", Action::FindFirst, &json!({}))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Transport);

    let err = client
        .action::<_, User>("users", Action::FindFirst, &json!({}))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::DecodeError);
}

#[tokio::test]
async fn test_credentials_are_explicit() {
    let transport = Recorder::replying(vec![
        Ok(RawResponse::ok(json!({ "meta": { "token": "issued" }, "data": { "id": 1, "email": "a@b.c" } }))),
        Ok(RawResponse::ok(json!({ "data": 1 }))),
        Ok(RawResponse::ok(json!({ "data": 2 }))),
    ]);
    let client = Client::new(transport.clone(), Arc::new(NoCredentials));
    let session = MemoryCredentials::new();

    let signed: MetaResponse<TokenInfo, User> = client
        .sign_in_with("users", &json!({ "credentials": { "email": "a@b.c", "password": "pw" } }), &session)
        .await
        .unwrap();
    assert_eq!(signed.data.id, 1);
    assert_eq!(session.token().as_deref(), Some("issued"));

    let _: Response<i64> = client
        .action_with("users", Action::Count, &json!({}), &session)
        .await
        .unwrap();
    let _: Response<i64> = client.action("users", Action::Count, &json!({})).await.unwrap();

    let sent = transport.requests();
    assert_eq!(sent[0].path(), "/users/action/sign-in");
    assert_eq!(sent[0].bearer, None);
    assert_eq!(sent[1].authorization().as_deref(), Some("Bearer issued"));
    assert_eq!(sent[2].bearer, None);
}

#[tokio::test]
async fn test_paged_listing_with_session_credentials() {
    let transport = Recorder::replying(vec![
        Ok(RawResponse::ok(json!({
            "meta": { "count": 1, "numberOfPages": 1 },
            "data": [{ "id": 4, "email": "d@example.com" }]
        }))),
        Ok(RawResponse::ok(json!({ "meta": { "count": 0 }, "data": [] }))),
    ]);
    let client = Client::new(transport.clone(), Arc::new(NoCredentials));
    let session = MemoryCredentials::with_token("session-token");

    let page: MetaResponse<PagingInfo, Vec<User>> = client
        .action_with_meta_with("users", Action::FindMany, &json!({ "take": 1 }), &session)
        .await
        .unwrap();
    assert_eq!(page.data[0].id, 4);

    let _: MetaResponse<PagingInfo, Vec<User>> = client
        .action_with_meta("users", Action::FindMany, &json!({ "take": 1 }))
        .await
        .unwrap();

    let sent = transport.requests();
    assert_eq!(sent[0].authorization().as_deref(), Some("Bearer session-token"));
    assert_eq!(sent[1].bearer, None);
}

#[tokio::test]
async fn test_config_reaches_the_request() {
    let config = ClientConfig::parse(
        r#"
        [client]
        host = "https://api.example.com/"
        timeout = "2s"
        "#,
    )
    .unwrap();

    let transport = Recorder::replying(vec![Ok(RawResponse::ok(json!({ "data": null })))]);
    let client = Client::new(transport.clone(), Arc::new(StaticToken::new("k")))
        .with_config(&config)
        .unwrap();

    let _: Response<Option<User>> = client
        .action("posts", Action::Delete, &json!({ "where": { "id": 3 } }))
        .await
        .unwrap();

    let sent = transport.requests();
    assert_eq!(
        sent[0].url().unwrap().unwrap().as_str(),
        "https://api.example.com/posts/action/delete"
    );
    assert_eq!(sent[0].timeout, Some(Duration::from_secs(2)));
}
