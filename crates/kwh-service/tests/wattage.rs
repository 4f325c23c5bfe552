//! Wattage lookup integration tests.

mod common;

use common::TestHarness;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gemini_harness(server: &MockServer) -> TestHarness {
    let uri = server.uri();
    TestHarness::with_config(|config| {
        config.genai_api_key = Some("test-key".into());
        config.gemini_api_url = uri;
    })
}

#[tokio::test]
async fn returns_model_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": "1200\n" }] } }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    let harness = gemini_harness(&server);

    let response = harness
        .server
        .get("/api/get-wattage/?appliance=electric%20kettle")
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["wattage_info"], "1200");
}

#[tokio::test]
async fn missing_appliance_is_bad_request() {
    let server = MockServer::start().await;
    let harness = gemini_harness(&server);

    let response = harness.server.get("/api/get-wattage/").await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Appliance name is required");
}

#[tokio::test]
async fn gemini_failure_is_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let harness = gemini_harness(&server);

    let response = harness.server.get("/api/get-wattage/?appliance=fan").await;

    response.assert_status(axum::http::StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "upstream");
}

#[tokio::test]
async fn unconfigured_lookup_is_internal_error() {
    let harness = TestHarness::new();

    let response = harness.server.get("/api/get-wattage/?appliance=fan").await;

    response.assert_status_internal_server_error();
}
