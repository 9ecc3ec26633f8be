//! Tests for the address_info endpoint
//!
//! Primary, proxied and secondary addresses, and the failures that stop
//! the server from classifying an address at all.

mod common;

use std::io::Write;
use std::sync::Arc;

use axum_test::TestServer;
use browserid_core::{KeyPair, ShimTable};
use browserid_server::{routes, AppState, InMemoryEmailDirectory};
use common::{create_test_server, create_test_server_with, test_config, MockFetcher};
use serde_json::{json, Value};

#[tokio::test]
async fn test_primary_address() {
    let key = KeyPair::generate().public_key();
    let server = create_test_server(Arc::new(MockFetcher::new().primary("example.domain", &key)));

    let response = server
        .get("/wsapi/address_info")
        .add_query_param("email", "alice@example.domain")
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["type"], "primary");
    assert_eq!(body["auth"], "https://example.domain/sign_in.html");
    assert_eq!(body["prov"], "https://example.domain/provision.html");
}

#[tokio::test]
async fn test_delegated_primary_address() {
    let key = KeyPair::generate().public_key();
    let fetcher = MockFetcher::new()
        .delegate("mail.example", "idp.example")
        .primary("idp.example", &key);
    let server = create_test_server(Arc::new(fetcher));

    let response = server
        .get("/wsapi/address_info")
        .add_query_param("email", "bob@mail.example")
        .await;

    let body: Value = response.json();
    assert_eq!(body["type"], "primary");
    assert_eq!(body["auth"], "https://idp.example/sign_in.html");
}

#[tokio::test]
async fn test_secondary_address_known_and_unknown() {
    let directory = Arc::new(InMemoryEmailDirectory::with_emails(["known@secondary.example"]));
    let server = create_test_server_with(test_config(), Arc::new(MockFetcher::new()), directory);

    let response = server
        .get("/wsapi/address_info")
        .add_query_param("email", "known@secondary.example")
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["type"], "secondary");
    assert_eq!(body["known"], true);

    let response = server
        .get("/wsapi/address_info")
        .add_query_param("email", "stranger@secondary.example")
        .await;
    let body: Value = response.json();
    assert_eq!(body["type"], "secondary");
    assert_eq!(body["known"], false);
}

#[tokio::test]
async fn test_proxied_address_uses_bigtent() {
    let key = KeyPair::generate().public_key();
    let mut config = test_config();
    config
        .proxy_idps
        .insert("gmail.com".to_string(), "https://bigtent.example".to_string());
    let fetcher = MockFetcher::new().primary("bigtent.example", &key);
    let server = create_test_server_with(
        config,
        Arc::new(fetcher),
        Arc::new(InMemoryEmailDirectory::new()),
    );

    let response = server
        .get("/wsapi/address_info")
        .add_query_param("email", "someone@Gmail.com")
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["type"], "proxyidp");
    assert_eq!(body["auth"], "https://bigtent.example/sign_in.html");
    assert_eq!(body["prov"], "https://bigtent.example/provision.html");
}

#[tokio::test]
async fn test_bigtent_unavailable() {
    let mut config = test_config();
    config
        .proxy_idps
        .insert("gmail.com".to_string(), "https://bigtent.example".to_string());
    let server = create_test_server_with(
        config,
        Arc::new(MockFetcher::new()),
        Arc::new(InMemoryEmailDirectory::new()),
    );

    let response = server
        .get("/wsapi/address_info")
        .add_query_param("email", "someone@gmail.com")
        .await;

    assert_eq!(response.status_code(), 503);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["reason"], "BigTent unavailable");
}

#[tokio::test]
async fn test_broken_primary_cannot_be_checked() {
    let server = create_test_server(Arc::new(MockFetcher::new().raw("broken.example", "{ nope")));

    let response = server
        .get("/wsapi/address_info")
        .add_query_param("email", "alice@broken.example")
        .await;

    assert_eq!(response.status_code(), 503);
    let body: Value = response.json();
    assert_eq!(body["reason"], "can't check email address");
}

#[tokio::test]
async fn test_address_without_domain_rejected() {
    let fetcher = Arc::new(MockFetcher::new());
    let server = create_test_server(fetcher.clone());

    for email in ["alice", "alice@"] {
        let response = server
            .get("/wsapi/address_info")
            .add_query_param("email", email)
            .await;
        assert_eq!(response.status_code(), 400, "{}", email);
    }
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn test_disabled_primary_support_treats_everyone_as_secondary() {
    let key = KeyPair::generate().public_key();
    let fetcher = Arc::new(MockFetcher::new().primary("example.domain", &key));
    let mut config = test_config();
    config.disable_primary_support = true;
    let server = create_test_server_with(
        config,
        fetcher.clone(),
        Arc::new(InMemoryEmailDirectory::new()),
    );

    let response = server
        .get("/wsapi/address_info")
        .add_query_param("email", "alice@example.domain")
        .await;

    let body: Value = response.json();
    assert_eq!(body["type"], "secondary");
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn test_shimmed_primary_served_from_shim_origin() {
    let key = KeyPair::generate().public_key();
    let mut fixture = tempfile::NamedTempFile::new().unwrap();
    let body = json!({
        "public-key": key,
        "authentication": "/sign_in.html",
        "provisioning": "/provision.html",
    });
    write!(fixture, "{}", body).unwrap();

    let spec = format!("eyedee.me|http://127.0.0.1:10005|{}", fixture.path().display());
    let shims = ShimTable::parse(&spec).unwrap();
    let fetcher = Arc::new(MockFetcher::new());
    let state = Arc::new(AppState::new(
        test_config(),
        fetcher.clone(),
        Arc::new(shims),
        InMemoryEmailDirectory::new(),
    ));
    let server = TestServer::new(routes::create_router(state)).unwrap();

    let response = server
        .get("/wsapi/address_info")
        .add_query_param("email", "alice@eyedee.me")
        .await;

    let body: Value = response.json();
    assert_eq!(body["type"], "primary");
    assert_eq!(body["auth"], "http://127.0.0.1:10005/sign_in.html");
    assert_eq!(body["prov"], "http://127.0.0.1:10005/provision.html");
    assert_eq!(fetcher.calls(), 0);
}
