//! HTTP retrieval of `/.well-known/browserid`
//!
//! Anything short of a `200` with an `application/json` content type, and
//! any network failure, means "not a primary". Failures are logged at
//! debug and never surfaced.

use std::time::Duration;

use async_trait::async_trait;
use browserid_core::discovery::well_known_url;
use browserid_core::{WellKnown, WellKnownFetcher};
use http_body_util::{BodyExt, Empty};
use hyper::body::Bytes;
use hyper::header::{CONTENT_TYPE, HOST};
use hyper::Request;
use hyper_util::rt::TokioIo;
use reqwest::Client;
use thiserror::Error;
use tokio::net::TcpStream;

use crate::config::HttpProxy;

#[derive(Debug, Error)]
enum FetchError {
    #[error("request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("proxy connection failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("proxy request failed: {0}")]
    Hyper(#[from] hyper::Error),

    #[error("bad request: {0}")]
    Http(#[from] hyper::http::Error),

    #[error("timed out")]
    Timeout,
}

/// Fetches support documents over HTTPS, directly or through a proxy
pub struct HttpWellKnownFetcher {
    client: Client,
    proxy: Option<HttpProxy>,
    timeout: Duration,
    https: bool,
}

impl HttpWellKnownFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            proxy: None,
            timeout,
            https: true,
        })
    }

    /// Send every lookup through `proxy` as an absolute-form HTTP request
    pub fn with_proxy(mut self, proxy: Option<HttpProxy>) -> Self {
        self.proxy = proxy;
        self
    }

    /// Fetch over plain HTTP (local development and tests only)
    pub fn plain_http(mut self) -> Self {
        self.https = false;
        self
    }

    async fn fetch_direct(&self, domain: &str) -> Result<WellKnown, FetchError> {
        let response = self
            .client
            .get(well_known_url(domain, self.https))
            .send()
            .await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        if !is_support_response(domain, response.status().as_u16(), content_type.as_deref()) {
            return Ok(WellKnown::NotPrimary);
        }

        Ok(WellKnown::Body(response.text().await?))
    }

    /// Plain HTTP to the proxy, with the fully qualified target URL as the
    /// request target and the domain as `Host`
    async fn fetch_via_proxy(
        &self,
        proxy: &HttpProxy,
        domain: &str,
    ) -> Result<WellKnown, FetchError> {
        let stream = TcpStream::connect((proxy.host.as_str(), proxy.port)).await?;
        let (mut sender, connection) =
            hyper::client::conn::http1::handshake(TokioIo::new(stream)).await?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::debug!("proxy connection closed: {}", e);
            }
        });

        let request = Request::get(well_known_url(domain, true))
            .header(HOST, domain)
            .body(Empty::<Bytes>::new())?;
        let response = sender.send_request(request).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        if !is_support_response(domain, response.status().as_u16(), content_type.as_deref()) {
            return Ok(WellKnown::NotPrimary);
        }

        let body = response.into_body().collect().await?.to_bytes();
        Ok(WellKnown::Body(String::from_utf8_lossy(&body).into_owned()))
    }
}

#[async_trait]
impl WellKnownFetcher for HttpWellKnownFetcher {
    async fn fetch(&self, domain: &str) -> WellKnown {
        let result = match &self.proxy {
            Some(proxy) => tokio::time::timeout(self.timeout, self.fetch_via_proxy(proxy, domain))
                .await
                .unwrap_or(Err(FetchError::Timeout)),
            None => self.fetch_direct(domain).await,
        };

        result.unwrap_or_else(|e| {
            tracing::debug!("{} is not a browserid primary: {}", domain, e);
            WellKnown::NotPrimary
        })
    }
}

fn is_support_response(domain: &str, status: u16, content_type: Option<&str>) -> bool {
    if status != 200 {
        tracing::debug!(
            "{} is not a browserid primary - non-200 response code ({}) to /.well-known/browserid",
            domain,
            status
        );
        return false;
    }
    if !content_type.is_some_and(|ct| ct.starts_with("application/json")) {
        tracing::debug!(
            "{} is not a browserid primary - non \"application/json\" response to /.well-known/browserid",
            domain
        );
        return false;
    }
    true
}
