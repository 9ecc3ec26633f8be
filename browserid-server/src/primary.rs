//! Primary support decisions
//!
//! Whether an email domain is a primary, where its sign-in and provisioning
//! pages live, and which key signs its certificates.

use browserid_core::{
    Error as CoreError, PrimaryAuthorityInfo, PublicKey, Resolver, WellKnownFetcher,
};
use url::Url;

pub struct PrimarySupport<F> {
    resolver: Resolver<F>,
    disabled: bool,
}

impl<F: WellKnownFetcher> PrimarySupport<F> {
    pub fn new(resolver: Resolver<F>) -> Self {
        Self {
            resolver,
            disabled: false,
        }
    }

    /// When disabled every domain is treated as secondary and no lookups
    /// happen at all
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn resolver(&self) -> &Resolver<F> {
        &self.resolver
    }

    /// `Ok(None)` when `domain` is not a primary (or support is disabled)
    pub async fn check_support(
        &self,
        domain: &str,
    ) -> Result<Option<PrimaryAuthorityInfo>, CoreError> {
        if self.disabled {
            return Ok(None);
        }
        if domain.trim().is_empty() {
            return Err(CoreError::InvalidDomain);
        }
        self.resolver.resolve(domain).await
    }

    /// The key `domain` signs certificates with
    pub async fn get_public_key(&self, domain: &str) -> Result<PublicKey, CoreError> {
        match self.check_support(domain).await? {
            Some(info) => Ok(info.public_key),
            None => Err(CoreError::NoPublicKey(domain.to_string())),
        }
    }

    /// Whether `email_domain` hands authentication to `issuing_domain`:
    /// its resolved sign-in page must live on that host. Any lookup
    /// failure counts as no.
    pub async fn delegates_authority(&self, email_domain: &str, issuing_domain: &str) -> bool {
        match self.check_support(email_domain).await {
            Ok(Some(info)) => url_authority(&info.authentication_url) == issuing_domain,
            Ok(None) => false,
            Err(e) => {
                tracing::debug!(%email_domain, %issuing_domain, "delegation check failed: {}", e);
                false
            }
        }
    }
}

/// `host[:port]` of `url`, with the port left out when it is the default
fn url_authority(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}
