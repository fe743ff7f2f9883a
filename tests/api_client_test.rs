//! The blocking Mattermost client against a mock server.
//!
//! The client owns its own runtime, so every call runs on a blocking
//! thread while wiremock serves from the test runtime.

mod common;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::app_error;
use mattermost_utils::api::{ApiClient, MattermostApi, Pager, Post};
use mattermost_utils::config::Settings;
use mattermost_utils::response::StatusPolicy;

fn settings(server: &MockServer) -> Settings {
    Settings {
        url: server.uri(),
        token: "secret-token".to_string(),
        ..Settings::default()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn get_me_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/users/me"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u1",
            "username": "alice",
            "email": "alice@example.org",
            "roles": "system_admin system_user",
            "is_bot": false,
            "create_at": 1600000000000i64,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let settings = settings(&server);
    let me = tokio::task::spawn_blocking(move || {
        let client = ApiClient::new(&settings).unwrap();
        client.get_me().unwrap().entity().unwrap()
    })
    .await
    .unwrap();

    assert_eq!(me.id, "u1");
    assert_eq!(me.roles, "system_admin system_user");
}

#[tokio::test(flavor = "multi_thread")]
async fn app_error_body_becomes_remote_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/users/me"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_string(app_error(401, "Invalid or expired session, please login again.")),
        )
        .mount(&server)
        .await;

    let settings = settings(&server);
    let err = tokio::task::spawn_blocking(move || {
        let client = ApiClient::new(&settings).unwrap();
        client.get_me().unwrap().entity().unwrap_err()
    })
    .await
    .unwrap();

    assert_eq!(err.exit_code(), 401);
    assert_eq!(
        err.to_string(),
        "Mattermost error: [401] [Invalid or expired session, please login again.] ()"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn get_users_pages_through_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/users"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "u3", "username": "carol", "last_picture_update": 0},
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let settings = settings(&server);
    let users = tokio::task::spawn_blocking(move || {
        let client = ApiClient::new(&settings).unwrap();
        client
            .get_users(Pager::new(2).next_page())
            .unwrap()
            .entity()
            .unwrap()
    })
    .await
    .unwrap();

    assert_eq!(users.len(), 1);
    assert_eq!(users[0].username, "carol");
}

#[tokio::test(flavor = "multi_thread")]
async fn create_post_sends_channel_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v4/posts"))
        .and(body_json(json!({"channel_id": "c1", "message": "hello"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "p1", "channel_id": "c1", "message": "hello",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let settings = settings(&server);
    let response = tokio::task::spawn_blocking(move || {
        let client = ApiClient::new(&settings).unwrap();
        client.create_post(&Post::new("c1", "hello")).unwrap()
    })
    .await
    .unwrap();

    assert_eq!(response.status(), 201);
    assert!(!response.has_error());
    assert_eq!(response.read_entity().unwrap().id.as_deref(), Some("p1"));
}

#[tokio::test(flavor = "multi_thread")]
async fn set_profile_image_uploads_multipart_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v4/users/u1/image"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "OK"})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("avatar.png");
    std::fs::write(&image, b"\x89PNG fake image").unwrap();

    let settings = settings(&server);
    let upload = image.clone();
    let ok = tokio::task::spawn_blocking(move || {
        let client = ApiClient::new(&settings).unwrap();
        client.set_profile_image("u1", &upload).unwrap().entity().unwrap()
    })
    .await
    .unwrap();
    assert_eq!(ok.status, "OK");

    let requests = server.received_requests().await.unwrap();
    let content_type = requests[0]
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("multipart/form-data"));
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"image\""));
    assert!(body.contains("PNG fake image"));
}

#[tokio::test(flavor = "multi_thread")]
async fn policy_from_settings_reaches_responses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_string(app_error(204, "No content.")))
        .mount(&server)
        .await;

    let lenient = Settings {
        status_policy: StatusPolicy::ClientOrServer,
        ..settings(&server)
    };
    let strict = settings(&server);
    let (lenient_error, strict_error) = tokio::task::spawn_blocking(move || {
        let lenient = ApiClient::new(&lenient).unwrap().get_me().unwrap().has_error();
        let strict = ApiClient::new(&strict).unwrap().get_me().unwrap().has_error();
        (lenient, strict)
    })
    .await
    .unwrap();

    assert!(!lenient_error);
    assert!(strict_error);
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_server_is_a_transport_error() {
    let server = MockServer::start().await;
    let settings = settings(&server);
    drop(server);

    let failed = tokio::task::spawn_blocking(move || {
        let client = ApiClient::new(&settings).unwrap();
        client.get_me().is_err()
    })
    .await
    .unwrap();

    assert!(failed);
}
