//! Integration tests for the payment relay HTTP surface, with the remote
//! payment API stubbed out.

use std::path::PathBuf;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use kassacore::api::ApiClient;
use kassacore::config::ApiMode;
use kassaweb::routes::{create_router, AppState};

const DEAD_ENDPOINT: &str = "http://127.0.0.1:9/api";

/// Spawns the relay on an ephemeral port, returns its base URL.
async fn spawn_relay(api_base: String, images_dir: Option<PathBuf>) -> String {
    let state = AppState {
        api: Arc::new(ApiClient::with_endpoints(api_base, DEAD_ENDPOINT, ApiMode::Production).unwrap()),
        images_dir,
    };
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

#[tokio::test]
async fn generate_qr_returns_an_inline_image_for_a_successful_remote() {
    let remote = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/public/generate-qr"))
        .and(body_partial_json(serde_json::json!({"amount": 500.0, "bank": "mbank"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "qr_hash": "abc123",
            "all_bank_urls": {"mbank": "https://pay.example/m"}
        })))
        .mount(&remote)
        .await;

    let relay = spawn_relay(remote.uri(), None).await;
    let response = reqwest::Client::new()
        .post(format!("{relay}/api/generate-qr"))
        .json(&serde_json::json!({"amount": 500, "bank": "mbank"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["qr_hash"], "abc123");
    let image = body["qr_image"].as_str().unwrap();
    assert!(image.starts_with("data:image/png;base64,"));
    assert!(image.len() > "data:image/png;base64,".len());
    assert_eq!(body["all_bank_urls"]["mbank"], "https://pay.example/m");
    assert_eq!(body["bank_urls"], body["all_bank_urls"]);
}

#[tokio::test]
async fn generate_qr_maps_remote_refusal_to_bad_request() {
    let remote = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/public/generate-qr"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": false,
            "error": "amount too small"
        })))
        .mount(&remote)
        .await;

    let relay = spawn_relay(remote.uri(), None).await;
    let response = reqwest::Client::new()
        .post(format!("{relay}/api/generate-qr"))
        .json(&serde_json::json!({"amount": 1, "bank": "mbank"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "amount too small");
}

#[tokio::test]
async fn generate_qr_maps_transport_failure_to_server_error() {
    let relay = spawn_relay(DEAD_ENDPOINT.to_string(), None).await;
    let response = reqwest::Client::new()
        .post(format!("{relay}/api/generate-qr"))
        .json(&serde_json::json!({"amount": 500, "bank": "mbank"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().len() > 0);
}

#[tokio::test]
async fn pay_page_injects_query_params_and_a_deadline() {
    let relay = spawn_relay(DEAD_ENDPOINT.to_string(), None).await;
    let before = chrono::Utc::now().timestamp_millis();

    let response = reqwest::get(format!(
        "{relay}/pay?amount=1000.57&user_id=42&casino_id=melbet&account_id=123456&username=durov"
    ))
    .await
    .unwrap();

    assert_eq!(response.status(), 200);
    let html = response.text().await.unwrap();
    assert!(html.contains("\"amount\":\"1000.57\""));
    assert!(html.contains("\"casino_id\":\"melbet\""));
    assert!(html.contains("\"username\":\"durov\""));
    assert!(html.contains("\"banks\":["));

    // The deadline is five minutes out, give or take test slack.
    let marker = "\"expires_timestamp\":";
    let start = html.find(marker).unwrap() + marker.len();
    let digits: String = html[start..].chars().take_while(char::is_ascii_digit).collect();
    let expires: i64 = digits.parse().unwrap();
    assert!(expires >= before + 295_000);
    assert!(expires <= before + 310_000);
}

#[tokio::test]
async fn create_request_forwards_the_confirmation_to_the_remote() {
    let remote = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/payment"))
        .and(body_partial_json(serde_json::json!({
            "telegram_user_id": "42",
            "type": "deposit",
            "bookmaker": "melbet",
            "account_id": "123456",
            "bank": "mbank"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "request_id": 777
        })))
        .mount(&remote)
        .await;

    let relay = spawn_relay(remote.uri(), None).await;
    let response = reqwest::Client::new()
        .post(format!("{relay}/api/create-request"))
        .json(&serde_json::json!({
            "user_id": "42",
            "amount": 1000.57,
            "casino_id": "melbet",
            "account_id": "123456",
            "bank": "mbank"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["request_id"], 777);
}

#[tokio::test]
async fn bank_icons_404_without_a_directory_and_serve_with_one() {
    let missing = spawn_relay(DEAD_ENDPOINT.to_string(), None).await;
    let response = reqwest::get(format!("{missing}/static/images/mbank.png")).await.unwrap();
    assert_eq!(response.status(), 404);

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("mbank.png"), b"\x89PNG\r\n\x1a\nfake").unwrap();

    let serving = spawn_relay(DEAD_ENDPOINT.to_string(), Some(dir.path().to_path_buf())).await;
    let response = reqwest::get(format!("{serving}/static/images/mbank.png")).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-type"], "image/png");

    let response = reqwest::get(format!("{serving}/static/images/missing.png")).await.unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn landing_page_is_served() {
    let relay = spawn_relay(DEAD_ENDPOINT.to_string(), None).await;
    let response = reqwest::get(format!("{relay}/")).await.unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.text().await.unwrap().contains("<html"));
}
