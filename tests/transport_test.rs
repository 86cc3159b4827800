use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use reqwest::Method;
use serde_json::json;
use spotifyapi::{
    Error,
    oauth::{OAuth, Token},
    transport::{BoxFuture, Transport, is_expired_token},
};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport_for(server: &MockServer) -> Transport {
    Transport::new(Token::new("AT", "Bearer", "", 3600, "RT")).with_base_url(server.uri())
}

fn error_body(status: u16, message: &str) -> serde_json::Value {
    json!({ "error": { "status": status, "message": message } })
}

#[tokio::test]
async fn test_no_content_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/me/player/pause"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let result = transport_for(&server)
        .put("me/player/pause", &[], None)
        .await
        .unwrap();

    assert!(result.is_none());
}

#[tokio::test]
async fn test_get_sends_bearer_and_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("authorization", "Bearer AT"))
        .and(query_param("market", "DE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "alice" })))
        .expect(1)
        .mount(&server)
        .await;

    let body: Option<serde_json::Value> = transport_for(&server)
        .get("/me", &[("market", "DE".to_string())])
        .await
        .unwrap();

    assert_eq!(body, Some(json!({ "id": "alice" })));
}

#[tokio::test]
async fn test_body_is_sent_as_json() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/me/tracks"))
        .and(body_json(json!({ "ids": ["a", "b"] })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let result = transport_for(&server)
        .request(Method::PUT, "me/tracks", &[], Some(&json!({ "ids": ["a", "b"] })))
        .await
        .unwrap();

    // empty 2xx body
    assert!(result.is_none());
}

#[tokio::test]
async fn test_absolute_url_is_used_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/me/tracks"))
        .and(query_param("offset", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let transport = Transport::new(Token::new("AT", "Bearer", "", 3600, "RT"))
        .with_base_url("http://127.0.0.1:9/unused");
    let url = format!("{}/v1/me/tracks?offset=20", server.uri());

    let body = transport.request(Method::GET, &url, &[], None).await.unwrap();

    assert_eq!(body, Some(json!({ "ok": true })));
}

#[tokio::test]
async fn test_expired_token_401() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(error_body(401, "The access token expired")))
        .mount(&server)
        .await;

    let err = transport_for(&server).request(Method::GET, "me", &[], None).await.unwrap_err();

    match err {
        Error::ExpiredToken { access_token } => assert_eq!(access_token, "AT"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_expired_challenge_header_401() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(401)
                .insert_header(
                    "www-authenticate",
                    r#"Bearer error="invalid_token", error_description="The token has expired""#,
                )
                .set_body_json(error_body(401, "Invalid access token")),
        )
        .mount(&server)
        .await;

    let err = transport_for(&server).request(Method::GET, "me", &[], None).await.unwrap_err();

    assert!(matches!(err, Error::ExpiredToken { .. }));
}

#[tokio::test]
async fn test_other_401_is_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(error_body(401, "Permissions missing")))
        .mount(&server)
        .await;

    let err = transport_for(&server).request(Method::GET, "me", &[], None).await.unwrap_err();

    match err {
        Error::Unauthorized { message } => assert_eq!(message, "Permissions missing"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_other_failures_keep_provider_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/albums/x"))
        .respond_with(ResponseTemplate::new(404).set_body_json(error_body(404, "Non existing id")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad gateway from proxy"))
        .mount(&server)
        .await;

    let transport = transport_for(&server);

    match transport.request(Method::GET, "albums/x", &[], None).await.unwrap_err() {
        Error::Api { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Non existing id");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    match transport.request(Method::GET, "broken", &[], None).await.unwrap_err() {
        Error::Api { status, message } => {
            assert_eq!(status, 502);
            assert_eq!(message, "Bad gateway from proxy");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_auto_refresh_renews_once_and_notifies_updater() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "NEW",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("authorization", "Bearer NEW"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "alice" })))
        .expect(2)
        .mount(&server)
        .await;

    let saved: Arc<Mutex<Vec<Token>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&saved);

    let expired = Token::new("OLD", "Bearer", "", 3600, "R1")
        .with_creation(Utc::now() - Duration::hours(2));
    let oauth = OAuth::with_endpoints(
        format!("{}/authorize", server.uri()),
        format!("{}/api/token", server.uri()),
    );
    let transport = Transport::new(expired)
        .with_base_url(server.uri())
        .with_auto_refresh(oauth, "id", "secret")
        .with_token_updater(move |token: Token| -> BoxFuture<'static, spotifyapi::Res<()>> {
            sink.lock().unwrap().push(token);
            Box::pin(async { Ok(()) })
        });

    transport.request(Method::GET, "me", &[], None).await.unwrap();
    transport.request(Method::GET, "me", &[], None).await.unwrap();

    let saved = saved.lock().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].access_token(), "NEW");
    assert_eq!(saved[0].refresh_token(), "R1");
    assert_eq!(transport.token().await.access_token(), "NEW");
}

#[tokio::test]
async fn test_failed_refresh_sends_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "error": "invalid_grant" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let expired = Token::new("OLD", "Bearer", "", 3600, "R1")
        .with_creation(Utc::now() - Duration::hours(2));
    let oauth = OAuth::with_endpoints(
        format!("{}/authorize", server.uri()),
        format!("{}/api/token", server.uri()),
    );
    let transport = Transport::new(expired)
        .with_base_url(server.uri())
        .with_auto_refresh(oauth, "id", "secret");

    let err = transport.request(Method::GET, "me", &[], None).await.unwrap_err();

    match err {
        Error::TokenRefresh { status, message } => {
            assert_eq!(status, Some(400));
            assert_eq!(message, "invalid_grant");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(transport.token().await.access_token(), "OLD");
}

#[test]
fn test_is_expired_token() {
    assert!(is_expired_token("The access token expired", None));
    assert!(is_expired_token("Token Expired", None));
    assert!(!is_expired_token("Invalid access token", None));
    assert!(is_expired_token(
        "Invalid access token",
        Some(r#"Bearer error="invalid_token", error_description="expired""#)
    ));
    assert!(!is_expired_token(
        "Invalid access token",
        Some(r#"Bearer error="insufficient_scope""#)
    ));
}

#[tokio::test]
async fn test_failed_updater_is_retried_and_request_proceeds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "NEW",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("authorization", "Bearer NEW"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "alice" })))
        .expect(3)
        .mount(&server)
        .await;

    // fails the first time only
    let attempts: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&attempts);

    let expired = Token::new("OLD", "Bearer", "", 3600, "R1")
        .with_creation(Utc::now() - Duration::hours(2));
    let oauth = OAuth::with_endpoints(
        format!("{}/authorize", server.uri()),
        format!("{}/api/token", server.uri()),
    );
    let transport = Transport::new(expired)
        .with_base_url(server.uri())
        .with_auto_refresh(oauth, "id", "secret")
        .with_token_updater(move |token: Token| -> BoxFuture<'static, spotifyapi::Res<()>> {
            let mut attempts = sink.lock().unwrap();
            attempts.push(token.access_token().to_string());
            let first = attempts.len() == 1;
            Box::pin(async move {
                if first {
                    Err(Error::Config("disk full".to_string()))
                } else {
                    Ok(())
                }
            })
        });

    transport.request(Method::GET, "me", &[], None).await.unwrap();
    assert_eq!(attempts.lock().unwrap().len(), 1);

    transport.request(Method::GET, "me", &[], None).await.unwrap();
    assert_eq!(*attempts.lock().unwrap(), vec!["NEW", "NEW"]);

    // persisted, nothing left to hand over
    transport.request(Method::GET, "me", &[], None).await.unwrap();
    assert_eq!(attempts.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_set_token_replaces_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("authorization", "Bearer SECOND"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "alice" })))
        .expect(1)
        .mount(&server)
        .await;

    let transport = Transport::new(Token::new("FIRST", "Bearer", "", 3600, "RT"))
        .with_base_url(server.uri())
        .with_client(reqwest::Client::new());

    transport
        .set_token(Token::new("SECOND", "Bearer", "", 3600, "RT"))
        .await;

    assert_eq!(transport.token().await.access_token(), "SECOND");
    assert!(transport.request(Method::GET, "me", &[], None).await.is_ok());
}

#[test]
fn test_error_status() {
    let api = Error::Api {
        status: 429,
        message: "API rate limit exceeded".to_string(),
    };
    assert_eq!(api.status(), Some(429));

    let unauthorized = Error::Unauthorized {
        message: "Permissions missing".to_string(),
    };
    assert_eq!(unauthorized.status(), Some(401));

    assert_eq!(Error::TokenRefresh { status: None, message: String::new() }.status(), None);
    assert_eq!(Error::StateMismatch.status(), None);
}
