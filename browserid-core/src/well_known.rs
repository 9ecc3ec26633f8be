//! The `/.well-known/browserid` support document
//!
//! A domain either declares primary support:
//!
//! ```json
//! { "public-key": {...}, "authentication": "/sign_in", "provisioning": "/provision" }
//! ```
//!
//! or delegates to another authority with `{ "authority": "<domain>" }`.
//! `authority` wins whenever it is present. Unknown members are ignored.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use crate::{Error, PublicKey, Result};

/// Path of the support document on every domain
pub const WELL_KNOWN_PATH: &str = "/.well-known/browserid";

/// Members a non-delegating document must carry, checked in this order
pub const REQUIRED_KEYS: [&str; 3] = ["public-key", "authentication", "provisioning"];

/// A document declaring primary support
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportDocument {
    #[serde(rename = "public-key")]
    pub public_key: PublicKey,

    /// Path of the authentication page
    pub authentication: String,

    /// Path of the provisioning page
    pub provisioning: String,
}

/// What a domain's support document says about it
#[derive(Debug, Clone)]
pub enum Declaration {
    /// The domain is its own primary authority
    Primary(SupportDocument),
    /// Another domain is the authority for this one
    Delegation(String),
}

impl Declaration {
    /// Parse a support document body served for `domain`
    pub fn parse(domain: &str, body: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| Error::malformed_primary(domain, e.to_string()))?;
        let object = value
            .as_object()
            .ok_or_else(|| Error::malformed_primary(domain, "document is not a JSON object"))?;

        if let Some(authority) = object.get("authority") {
            return match authority.as_str() {
                Some(authority) if is_bare_host(authority) => {
                    Ok(Declaration::Delegation(authority.to_string()))
                }
                _ => Err(Error::malformed_primary(
                    domain,
                    "authority must be a domain name",
                )),
            };
        }

        if let Some(missing) = REQUIRED_KEYS.iter().find(|k| !object.contains_key(**k)) {
            return Err(Error::malformed_primary(
                domain,
                format!("missing required key: {}", missing),
            ));
        }

        let public_key = PublicKey::from_json(&object["public-key"])
            .map_err(|e| Error::malformed_primary(domain, format!("bad public-key: {}", e)))?;

        Ok(Declaration::Primary(SupportDocument {
            public_key,
            authentication: path_member(domain, object, "authentication")?,
            provisioning: path_member(domain, object, "provisioning")?,
        }))
    }
}

/// `host` or `host:port`, with nothing that would change the path of a
/// URL built from it
fn is_bare_host(authority: &str) -> bool {
    if authority.is_empty()
        || authority
            .chars()
            .any(|c| matches!(c, '/' | '?' | '#' | '@' | '\\') || c.is_whitespace())
    {
        return false;
    }
    match Url::parse(&format!("https://{}", authority)) {
        Ok(url) => url.has_host() && url.path() == "/",
        Err(_) => false,
    }
}

fn path_member(domain: &str, object: &Map<String, Value>, key: &str) -> Result<String> {
    object[key]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| Error::malformed_primary(domain, format!("{} must be a string", key)))
}

/// Resolved primary authority for a domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryAuthorityInfo {
    pub public_key: PublicKey,
    pub authentication_url: Url,
    pub provisioning_url: Url,
}

impl SupportDocument {
    pub fn new(
        public_key: PublicKey,
        authentication: impl Into<String>,
        provisioning: impl Into<String>,
    ) -> Self {
        Self {
            public_key,
            authentication: authentication.into(),
            provisioning: provisioning.into(),
        }
    }

    /// Root the document's paths at `origin` (`https://<domain>` or a
    /// shim origin)
    pub fn authority_info(&self, domain: &str, origin: &str) -> Result<PrimaryAuthorityInfo> {
        Ok(PrimaryAuthorityInfo {
            public_key: self.public_key.clone(),
            authentication_url: absolute_url(domain, origin, &self.authentication)?,
            provisioning_url: absolute_url(domain, origin, &self.provisioning)?,
        })
    }
}

fn absolute_url(domain: &str, origin: &str, path: &str) -> Result<Url> {
    let url = format!("{}{}", origin, path);
    match Url::parse(&url) {
        Ok(parsed) if parsed.has_host() => Ok(parsed),
        Ok(_) => Err(Error::malformed_primary(
            domain,
            format!("invalid url '{}': missing host", url),
        )),
        Err(e) => Err(Error::malformed_primary(
            domain,
            format!("invalid url '{}': {}", url, e),
        )),
    }
}
