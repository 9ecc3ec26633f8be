//! Error types for primary discovery and assertion verification

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("malformed token: {0}")]
    MalformedToken(String),

    #[error("Invalid certificate: {0}")]
    InvalidCertificate(String),

    #[error("Invalid assertion: {0}")]
    InvalidAssertion(String),

    #[error("malformed assertion: {0}")]
    MalformedAssertion(String),

    #[error("certificate chaining is not yet allowed")]
    CertificateChaining,

    #[error("cannot authenticate to browserid with a certificate issued by it.")]
    SelfIssuedCertificate,

    #[error("certificate expired")]
    CertificateExpired,

    #[error("certificate is not yet valid")]
    CertificateNotYetValid,

    #[error("assertion expired")]
    AssertionExpired,

    #[error("can't log in with an assertion for '{actual}'")]
    AudienceMismatch { expected: String, actual: String },

    #[error("signature verification failed")]
    SignatureVerificationFailed,

    #[error("primary support disabled")]
    PrimarySupportDisabled,

    #[error("invalid domain")]
    InvalidDomain,

    #[error("{domain} is a broken browserid primary, malformed dec of support: {reason}")]
    MalformedPrimary { domain: String, reason: String },

    #[error("Circular reference in delegating authority: {chain} > {domain}")]
    CircularDelegation { domain: String, chain: String },

    #[error("Too many hops while delegating authority from {domain}: {chain}")]
    TooManyDelegations { domain: String, chain: String },

    #[error("can't get public key for {0}")]
    NoPublicKey(String),

    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid shimmed primary '{0}'")]
    InvalidShim(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl Error {
    pub(crate) fn malformed_primary(domain: &str, reason: impl Into<String>) -> Self {
        Error::MalformedPrimary {
            domain: domain.to_string(),
            reason: reason.into(),
        }
    }

    /// True for failures caused by the assertion itself rather than by
    /// discovery of the issuing authority.
    pub fn is_assertion_policy(&self) -> bool {
        matches!(
            self,
            Error::CertificateChaining
                | Error::SelfIssuedCertificate
                | Error::CertificateExpired
                | Error::CertificateNotYetValid
                | Error::AssertionExpired
                | Error::AudienceMismatch { .. }
                | Error::SignatureVerificationFailed
        )
    }
}
