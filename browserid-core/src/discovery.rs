//! Primary discovery with authority delegation
//!
//! Fetches `/.well-known/browserid` for a domain and follows `authority`
//! delegations until a domain declares primary support, the chain loops,
//! or it grows past [`MAX_AUTHORITY_DELEGATIONS`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::well_known::{Declaration, PrimaryAuthorityInfo};
use crate::{Error, Result, ShimTable};

/// Protects against stack-like blowups and network abuse through long
/// delegation chains
pub const MAX_AUTHORITY_DELEGATIONS: usize = 6;

/// Outcome of fetching a domain's support document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WellKnown {
    /// A JSON body the domain served with a 200
    Body(String),
    /// The domain does not claim primary support
    NotPrimary,
}

/// Retrieves support documents.
///
/// Implementations never fail: a domain that cannot be reached or answers
/// with anything other than a JSON 200 is simply not a primary.
#[async_trait]
pub trait WellKnownFetcher: Send + Sync {
    async fn fetch(&self, domain: &str) -> WellKnown;
}

#[async_trait]
impl<F: WellKnownFetcher + ?Sized> WellKnownFetcher for Arc<F> {
    async fn fetch(&self, domain: &str) -> WellKnown {
        (**self).fetch(domain).await
    }
}

/// Domains visited while following delegations, in visit order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DelegationChain {
    domains: Vec<String>,
}

impl DelegationChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.position(domain).is_some()
    }

    pub fn position(&self, domain: &str) -> Option<usize> {
        self.domains.iter().position(|d| d == domain)
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// Record that `domain` delegates onwards. Fails if `domain` was
    /// already visited or the chain is already longer than `max`.
    pub fn delegate_from(&mut self, domain: &str, max: usize) -> Result<()> {
        if self.contains(domain) {
            return Err(Error::CircularDelegation {
                domain: domain.to_string(),
                chain: self.to_string(),
            });
        }
        if self.len() > max {
            return Err(Error::TooManyDelegations {
                domain: domain.to_string(),
                chain: self.to_string(),
            });
        }
        self.domains.push(domain.to_string());
        Ok(())
    }
}

impl fmt::Display for DelegationChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.domains.join(" > "))
    }
}

/// Resolves a domain to its primary authority
pub struct Resolver<F> {
    fetcher: F,
    shims: Arc<ShimTable>,
    max_delegations: usize,
}

impl<F: WellKnownFetcher> Resolver<F> {
    pub fn new(fetcher: F) -> Self {
        Self::with_shims(fetcher, Arc::new(ShimTable::new()))
    }

    pub fn with_shims(fetcher: F, shims: Arc<ShimTable>) -> Self {
        Self {
            fetcher,
            shims,
            max_delegations: MAX_AUTHORITY_DELEGATIONS,
        }
    }

    pub fn with_max_delegations(mut self, max: usize) -> Self {
        self.max_delegations = max;
        self
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Resolve `domain`, following delegations.
    ///
    /// `Ok(None)` means some domain along the way is not a primary.
    pub async fn resolve(&self, domain: &str) -> Result<Option<PrimaryAuthorityInfo>> {
        self.resolve_with_chain(domain, DelegationChain::new()).await
    }

    /// Resolve `domain` continuing an existing delegation chain
    pub async fn resolve_with_chain(
        &self,
        domain: &str,
        mut chain: DelegationChain,
    ) -> Result<Option<PrimaryAuthorityInfo>> {
        let mut domain = domain.to_string();

        loop {
            let (body, origin) = match self.shims.get(&domain) {
                Some(shim) => (shim.body.clone(), shim.origin.clone()),
                None => match self.fetcher.fetch(&domain).await {
                    WellKnown::Body(body) => (body, format!("https://{}", domain)),
                    WellKnown::NotPrimary => return Ok(None),
                },
            };

            match Declaration::parse(&domain, &body)? {
                Declaration::Delegation(authority) => {
                    chain.delegate_from(&domain, self.max_delegations)?;
                    tracing::debug!(%domain, %authority, "domain is delegating authority");
                    domain = authority;
                }
                Declaration::Primary(document) => {
                    let info = document.authority_info(&domain, &origin)?;
                    tracing::info!(%domain, "domain is a valid browserid primary");
                    return Ok(Some(info));
                }
            }
        }
    }
}

/// Extract the domain part of an email address
pub fn domain_from_email(email: &str) -> Option<&str> {
    email.split_once('@').map(|(_, domain)| domain)
}

/// Build the support document URL for a domain
pub fn well_known_url(domain: &str, https: bool) -> String {
    let scheme = if https { "https" } else { "http" };
    format!("{}://{}{}", scheme, domain, crate::WELL_KNOWN_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_rejects_revisit() {
        let mut chain = DelegationChain::new();
        chain.delegate_from("a.com", 6).unwrap();
        chain.delegate_from("b.com", 6).unwrap();

        let err = chain.delegate_from("a.com", 6).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Circular reference in delegating authority: a.com > b.com > a.com"
        );
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_chain_limit_checked_before_append() {
        let mut chain = DelegationChain::new();
        for i in 0..=2 {
            chain.delegate_from(&format!("d{}.com", i), 2).unwrap();
        }
        assert_eq!(chain.position("d2.com"), Some(2));

        assert!(matches!(
            chain.delegate_from("d3.com", 2),
            Err(Error::TooManyDelegations { domain, .. }) if domain == "d3.com"
        ));
    }

    #[test]
    fn test_domain_from_email() {
        assert_eq!(domain_from_email("alice@example.com"), Some("example.com"));
        assert_eq!(domain_from_email("invalid"), None);
    }

    #[test]
    fn test_well_known_url() {
        assert_eq!(
            well_known_url("example.com", true),
            "https://example.com/.well-known/browserid"
        );
        assert_eq!(
            well_known_url("127.0.0.1:8080", false),
            "http://127.0.0.1:8080/.well-known/browserid"
        );
    }
}
