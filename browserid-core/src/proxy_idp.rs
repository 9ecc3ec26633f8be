//! Proxy IdP routing
//!
//! Some email domains (large webmail providers) are sent to a bridging
//! identity service ("BigTent") instead of the password flow. This is a
//! static lookup keyed by lowercased domain.

use std::collections::HashMap;

use url::Url;

#[derive(Debug, Clone, Default)]
pub struct ProxyIdpRouter {
    domains: HashMap<String, String>,
}

impl ProxyIdpRouter {
    /// Build from a domain → BigTent URL map
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self {
            domains: entries
                .into_iter()
                .map(|(domain, url)| (domain.as_ref().to_lowercase(), url.into()))
                .collect(),
        }
    }

    pub fn is_proxy_idp(&self, email: &str) -> bool {
        self.bigtent_url(email).is_some()
    }

    /// The BigTent URL serving `email`'s domain, if proxied
    pub fn bigtent_url(&self, email: &str) -> Option<&str> {
        let domain = email_domain(email)?;
        self.domains.get(&domain.to_lowercase()).map(String::as_str)
    }

    /// Hostname of the BigTent serving `email`'s domain, if proxied
    pub fn bigtent_host(&self, email: &str) -> Option<String> {
        let url = Url::parse(self.bigtent_url(email)?).ok()?;
        url.host_str().map(str::to_string)
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

/// Exactly one `@` is required
fn email_domain(email: &str) -> Option<&str> {
    let mut pieces = email.split('@');
    match (pieces.next(), pieces.next(), pieces.next()) {
        (Some(_), Some(domain), None) => Some(domain),
        _ => None,
    }
}
