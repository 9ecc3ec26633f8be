//! Tests for the remote verifier endpoint and health check

mod common;

use std::sync::Arc;

use browserid_core::KeyPair;
use common::{bundle_for, create_test_server, MockFetcher};
use serde_json::{json, Value};

const RP: &str = "http://rp.example";

#[tokio::test]
async fn test_verify_okay() {
    let domain_key = KeyPair::generate();
    let fetcher = MockFetcher::new().primary("example.domain", &domain_key.public_key());
    let server = create_test_server(Arc::new(fetcher));

    let assertion = bundle_for("alice@example.domain", "example.domain", &domain_key, RP);
    let response = server
        .post("/verify")
        .json(&json!({ "assertion": assertion, "audience": "http://rp.example:80/" }))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["status"], "okay");
    assert_eq!(body["email"], "alice@example.domain");
    assert_eq!(body["audience"], "http://rp.example:80/");
    assert_eq!(body["issuer"], "example.domain");
    assert!(body["expires"].as_i64().unwrap() > 0);
    assert!(body.get("reason").is_none());
}

#[tokio::test]
async fn test_verify_failure_reports_reason() {
    let domain_key = KeyPair::generate();
    let fetcher = MockFetcher::new().primary("example.domain", &domain_key.public_key());
    let server = create_test_server(Arc::new(fetcher));

    let assertion = bundle_for("alice@example.domain", "example.domain", &domain_key, RP);
    let response = server
        .post("/verify")
        .json(&json!({ "assertion": assertion, "audience": "https://rp.example" }))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["status"], "failure");
    assert_eq!(
        body["reason"],
        "can't log in with an assertion for 'http://rp.example'"
    );
    assert!(body.get("email").is_none());
}

#[tokio::test]
async fn test_verify_requires_assertion_and_audience() {
    let server = create_test_server(Arc::new(MockFetcher::new()));

    for request in [
        json!({}),
        json!({ "assertion": "x~y" }),
        json!({ "audience": RP }),
    ] {
        let response = server.post("/verify").json(&request).await;

        assert_eq!(response.status_code(), 400);
        let body: Value = response.json();
        assert_eq!(body["status"], "failure");
        assert_eq!(body["reason"], "need assertion and audience");
    }
}

#[tokio::test]
async fn test_ping() {
    let server = create_test_server(Arc::new(MockFetcher::new()));

    let response = server.get("/ping.txt").await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.text(), "k.");
}
