use std::time::Duration;

use axum::{
    body::Body,
    extract::Request,
    http::{Response, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::{json, Value};
use tower::util::ServiceExt;
use wiremock::{
    matchers::{body_partial_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

use mrnotify::{router, AppState, Config, DiscordClient};

const TEST_TOKEN: &str = "It's a Secret to Everybody";
const DISCORD_PATH: &str = "/api/webhooks/1/abc";

const OPEN_EVENT: &str = r#"{"object_kind":"merge_request","object_attributes":{"action":"open","iid":42,"title":"Fix bug","source_branch":"fix","target_branch":"main","state":"opened","created_at":"2024-01-01T00:00:00Z","merge_status":"can_be_merged"},"project":{"path_with_namespace":"team/repo"},"user":{"name":"Jane","username":"jane"}}"#;

fn app(discord_url: &str, token: &str) -> Router {
    let config = Config {
        discord_webhook_url: discord_url.to_owned(),
        gitlab_webhook_token: SecretString::new(token.to_owned()),
        port: 0,
        request_timeout_ms: 2_000,
    };
    let discord = DiscordClient::new(&config.discord_webhook_url, config.request_timeout()).unwrap();
    router(AppState::new(config, discord))
}

async fn discord_mock(template: ResponseTemplate, expected_calls: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(DISCORD_PATH))
        .respond_with(template)
        .expect(expected_calls)
        .mount(&server)
        .await;
    server
}

fn webhook_request(body: &str, token: Option<&str>) -> Request {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/gitlab/webhook")
        .header("Content-Type", "application/json")
        .header("X-Gitlab-Event", "Merge Request Hook");
    if let Some(token) = token {
        builder = builder.header("X-Gitlab-Token", token);
    }
    builder.body(Body::from(body.to_owned())).unwrap()
}

async fn body_json(res: Response<Body>) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn should_forward_merge_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(DISCORD_PATH))
        .and(body_partial_json(json!({
            "content": "",
            "allowed_mentions": {"parse": []},
            "embeds": [{"title": "🆕 [OPEN] team/repo !42"}]
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let app = app(&format!("{}{DISCORD_PATH}", server.uri()), TEST_TOKEN);
    let res = app
        .oneshot(webhook_request(OPEN_EVENT, Some(TEST_TOKEN)))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK, "{res:?}");
    assert_eq!(body_json(res).await, json!({"ok": true}));
}

#[tokio::test]
async fn should_ignore_non_merge_request() {
    let server = discord_mock(ResponseTemplate::new(204), 0).await;
    let app = app(&format!("{}{DISCORD_PATH}", server.uri()), TEST_TOKEN);

    let res = app
        .oneshot(webhook_request(r#"{"object_kind":"push"}"#, Some(TEST_TOKEN)))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK, "{res:?}");
    assert_eq!(body_json(res).await, json!({"ok": true, "ignored": true}));
}

#[tokio::test]
async fn should_error_on_wrong_token() {
    let server = discord_mock(ResponseTemplate::new(204), 0).await;
    let app = app(&format!("{}{DISCORD_PATH}", server.uri()), TEST_TOKEN);

    let res = app
        .oneshot(webhook_request(
            OPEN_EVENT,
            Some("It's a Secret to Everybodz"),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{res:?}");
    let body = body_json(res).await;
    assert_eq!(body["ok"], json!(false));
    assert!(!body.to_string().contains(TEST_TOKEN));
}

#[tokio::test]
async fn should_error_on_missing_token() {
    let server = discord_mock(ResponseTemplate::new(204), 0).await;
    let app = app(&format!("{}{DISCORD_PATH}", server.uri()), TEST_TOKEN);

    let res = app.oneshot(webhook_request(OPEN_EVENT, None)).await.unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{res:?}");
}

#[tokio::test]
async fn should_accept_any_request_when_auth_disabled() {
    let server = discord_mock(ResponseTemplate::new(204), 2).await;
    let url = format!("{}{DISCORD_PATH}", server.uri());

    let res = app(&url, "")
        .oneshot(webhook_request(OPEN_EVENT, None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK, "{res:?}");

    let res = app(&url, "")
        .oneshot(webhook_request(OPEN_EVENT, Some("whatever")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK, "{res:?}");
}

#[tokio::test]
async fn should_error_on_malformed_json() {
    let server = discord_mock(ResponseTemplate::new(204), 0).await;
    let app = app(&format!("{}{DISCORD_PATH}", server.uri()), TEST_TOKEN);

    let res = app
        .oneshot(webhook_request("{not json", Some(TEST_TOKEN)))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{res:?}");
    assert_eq!(body_json(res).await["ok"], json!(false));
}

#[tokio::test]
async fn should_check_token_before_parsing_body() {
    let server = discord_mock(ResponseTemplate::new(204), 0).await;
    let app = app(&format!("{}{DISCORD_PATH}", server.uri()), TEST_TOKEN);

    let res = app
        .oneshot(webhook_request("{not json", Some("wrong")))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{res:?}");
}

#[tokio::test]
async fn should_report_discord_failure() {
    let server = discord_mock(
        ResponseTemplate::new(500).set_body_string("server error"),
        1,
    )
    .await;
    let app = app(&format!("{}{DISCORD_PATH}", server.uri()), TEST_TOKEN);

    let res = app
        .oneshot(webhook_request(OPEN_EVENT, Some(TEST_TOKEN)))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY, "{res:?}");
    let body = body_json(res).await;
    let detail = body["error"].as_str().unwrap();
    assert!(detail.contains("500"), "{detail}");
    assert!(detail.contains("server error"), "{detail}");
}

#[tokio::test]
async fn should_report_unreachable_discord() {
    // Bind and release a port so nothing is listening on it.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let url = format!("http://127.0.0.1:{port}{DISCORD_PATH}");

    let res = app(&url, TEST_TOKEN)
        .oneshot(webhook_request(OPEN_EVENT, Some(TEST_TOKEN)))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY, "{res:?}");
}

#[tokio::test]
async fn should_report_missing_destination() {
    let res = app("", TEST_TOKEN)
        .oneshot(webhook_request(OPEN_EVENT, Some(TEST_TOKEN)))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY, "{res:?}");
    assert_eq!(
        body_json(res).await["error"],
        json!("Discord webhook URL is not configured")
    );
}

#[tokio::test]
async fn should_answer_health_check() {
    let res = app("", "")
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await, json!({"status": "ok"}));
}

#[tokio::test]
async fn should_wait_at_most_the_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;
    let app = app(&format!("{}{DISCORD_PATH}", server.uri()), TEST_TOKEN);

    let res = tokio::time::timeout(
        Duration::from_secs(4),
        app.oneshot(webhook_request(OPEN_EVENT, Some(TEST_TOKEN))),
    )
    .await
    .expect("request outlived the outbound timeout")
    .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY, "{res:?}");
}
