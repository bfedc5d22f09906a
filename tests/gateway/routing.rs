use super::support::{GatewayTestServer, http, install_payload};
use reqwest::StatusCode;
use reqwest::header::LOCATION;
use serde_json::Value;

#[tokio::test]
async fn pages_redirect_to_setup_until_installed() {
    let server = GatewayTestServer::start(None).await;
    let client = http();

    let resp = client.get(server.url("/")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(resp.headers()[LOCATION], "/setup");

    let resp = client.get(server.url("/about")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);

    let resp = client.get(server.url("/setup")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let html = resp.text().await.unwrap();
    assert!(html.contains("Database"));
    assert!(!html.contains("X-Setup-Token"));
}

#[tokio::test]
async fn other_apis_are_unavailable_until_installed() {
    let server = GatewayTestServer::start(None).await;
    let resp = http().get(server.url("/api/posts")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Site is not installed");
}

#[tokio::test]
async fn health_is_always_reachable() {
    let server = GatewayTestServer::start(None).await;
    let body: Value = http()
        .get(server.url("/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["installed"], false);
}

#[tokio::test]
async fn setup_page_closes_after_install() {
    let server = GatewayTestServer::start(None).await;
    let client = http();

    let resp = client
        .post(server.url("/api/setup/install"))
        .json(&install_payload())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client.get(server.url("/setup")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(resp.headers()[LOCATION], "/");

    let resp = client.get(server.url("/")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("Field Notes"));

    let resp = client.get(server.url("/api/posts")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = client
        .post(server.url("/api/setup/install"))
        .json(&install_payload())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn malformed_install_body_is_a_bad_request() {
    let server = GatewayTestServer::start(None).await;
    let resp = http()
        .post(server.url("/api/setup/install"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn setup_token_guards_install() {
    let server = GatewayTestServer::start(Some("s3cret")).await;
    let client = http();

    let resp = client
        .post(server.url("/api/setup/install"))
        .json(&install_payload())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client
        .post(server.url("/api/setup/install"))
        .header("X-Setup-Token", "s3cret")
        .json(&install_payload())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn gateway_stops_on_shutdown_signal() {
    let server = GatewayTestServer::start(None).await;
    let resp = http().get(server.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    server.stop().await.unwrap();
}

#[tokio::test]
async fn database_test_needs_token_and_closes_after_install() {
    let server = GatewayTestServer::start(Some("s3cret")).await;
    let client = http();
    let live = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let body = serde_json::json!({
        "uri": format!("mongodb://127.0.0.1:{}", live.local_addr().unwrap().port())
    });

    let resp = client
        .post(server.url("/api/setup/test-database"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client
        .post(server.url("/api/setup/test-database"))
        .header("X-Setup-Token", "s3cret")
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .post(server.url("/api/setup/install"))
        .header("X-Setup-Token", "s3cret")
        .json(&install_payload())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    for token in [None, Some("s3cret")] {
        let mut request = client.post(server.url("/api/setup/test-database")).json(&body);
        if let Some(token) = token {
            request = request.header("X-Setup-Token", token);
        }
        let resp = request.send().await.unwrap();
        assert_ne!(resp.status(), StatusCode::OK);
        let reply: Value = resp.json().await.unwrap();
        assert_eq!(reply["success"], false);
        assert!(reply.get("message").and_then(Value::as_str).is_some_and(|m| !m.contains("Connected")));
    }
}
