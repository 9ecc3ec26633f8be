//! Common test utilities for server integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum_test::TestServer;
use browserid_core::{
    Assertion, AssertionBundle, Certificate, KeyPair, PublicKey, ShimTable, WellKnown,
    WellKnownFetcher,
};
use browserid_server::{routes, AppState, Config, InMemoryEmailDirectory};
use chrono::Duration;
use serde_json::json;
use url::Url;

/// Where the service under test believes it is served from
pub const SERVICE_URL: &str = "http://127.0.0.1:10002";
pub const SERVICE_HOSTNAME: &str = "127.0.0.1:10002";

/// Serves canned support documents and counts lookups
#[derive(Default)]
pub struct MockFetcher {
    bodies: HashMap<String, String>,
    calls: AtomicUsize,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn primary(mut self, domain: &str, key: &PublicKey) -> Self {
        let body = json!({
            "public-key": key,
            "authentication": "/sign_in.html",
            "provisioning": "/provision.html",
        });
        self.bodies.insert(domain.to_string(), body.to_string());
        self
    }

    pub fn delegate(mut self, domain: &str, authority: &str) -> Self {
        let body = json!({ "authority": authority });
        self.bodies.insert(domain.to_string(), body.to_string());
        self
    }

    pub fn raw(mut self, domain: &str, body: &str) -> Self {
        self.bodies.insert(domain.to_string(), body.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WellKnownFetcher for MockFetcher {
    async fn fetch(&self, domain: &str) -> WellKnown {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.bodies.get(domain) {
            Some(body) => WellKnown::Body(body.clone()),
            None => WellKnown::NotPrimary,
        }
    }
}

pub fn test_config() -> Config {
    Config {
        public_url: Url::parse(SERVICE_URL).unwrap(),
        ..Config::default()
    }
}

/// A certificate for `email` from `issuer`, plus an assertion for `audience`
pub fn bundle_for(email: &str, issuer: &str, issuer_key: &KeyPair, audience: &str) -> String {
    let user_key = KeyPair::generate();
    let certificate = Certificate::create(
        issuer,
        email,
        &user_key.public_key(),
        Duration::hours(1),
        issuer_key,
    )
    .unwrap();
    let assertion = Assertion::create(audience, Duration::minutes(2), &user_key).unwrap();
    AssertionBundle::new(certificate, assertion).bundle()
}

pub type TestState = AppState<InMemoryEmailDirectory, Arc<MockFetcher>>;

/// Create a test server around `fetcher` and the given configuration
pub fn create_test_server_with(
    config: Config,
    fetcher: Arc<MockFetcher>,
    directory: Arc<InMemoryEmailDirectory>,
) -> TestServer {
    let state: Arc<TestState> = Arc::new(AppState::new_with_arcs(
        config,
        fetcher,
        Arc::new(ShimTable::new()),
        directory,
    ));
    let app = routes::create_router(state);
    TestServer::new(app).expect("Failed to create test server")
}

pub fn create_test_server(fetcher: Arc<MockFetcher>) -> TestServer {
    create_test_server_with(
        test_config(),
        fetcher,
        Arc::new(InMemoryEmailDirectory::new()),
    )
}
