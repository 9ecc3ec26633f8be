//! Assertion verification
//!
//! Checks a `cert~assertion` bundle against the issuing primary's published
//! key. Only single-certificate bundles are accepted, and certificates
//! issued under this service's own hostname are refused.

use std::sync::Arc;

use browserid_core::{same_origin, AssertionBundle, Error as CoreError, WellKnownFetcher};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::primary::PrimarySupport;

/// The identity an assertion proves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub email: String,
    pub audience: String,
    pub issuer: String,
    pub expires_at: DateTime<Utc>,
}

pub struct AssertionVerifier<F> {
    primary: Arc<PrimarySupport<F>>,
    hostname: String,
    /// `hostname` without its port
    host: Option<String>,
}

impl<F: WellKnownFetcher> AssertionVerifier<F> {
    /// `hostname` is this service's own `host[:port]`
    pub fn new(primary: Arc<PrimarySupport<F>>, hostname: impl Into<String>) -> Self {
        let hostname = hostname.into();
        let host = Url::parse(&format!("http://{}", hostname))
            .ok()
            .and_then(|url| url.host_str().map(str::to_string));
        Self {
            primary,
            hostname,
            host,
        }
    }

    /// Issued under this service's hostname, with or without the port
    fn is_self_issued(&self, issuer: &str) -> bool {
        issuer == self.hostname || self.host.as_deref() == Some(issuer)
    }

    pub async fn verify_assertion(
        &self,
        bundle: &str,
        expected_audience: &str,
    ) -> Result<VerifiedIdentity, CoreError> {
        self.verify_assertion_at(bundle, expected_audience, Utc::now())
            .await
    }

    /// Verify as of `now`
    pub async fn verify_assertion_at(
        &self,
        bundle: &str,
        expected_audience: &str,
        now: DateTime<Utc>,
    ) -> Result<VerifiedIdentity, CoreError> {
        if self.primary.is_disabled() {
            return Err(CoreError::PrimarySupportDisabled);
        }

        let bundle = AssertionBundle::unbundle(bundle)?;
        let certificate = match bundle.certificates() {
            [certificate] => certificate,
            [] => return Err(CoreError::MalformedAssertion("no certificates provided".into())),
            _ => return Err(CoreError::CertificateChaining),
        };

        let issuer = certificate.issuer();
        if self.is_self_issued(issuer) {
            return Err(CoreError::SelfIssuedCertificate);
        }
        let issuer_key = self.primary.get_public_key(issuer).await?;

        certificate.verify(&issuer_key, now)?;

        let assertion = bundle.assertion();
        assertion.verify(certificate.public_key(), now)?;

        if !same_origin(expected_audience, assertion.audience()) {
            return Err(CoreError::AudienceMismatch {
                expected: expected_audience.to_string(),
                actual: assertion.audience().to_string(),
            });
        }

        tracing::debug!(email = %certificate.email(), %issuer, "assertion verified");
        Ok(VerifiedIdentity {
            email: certificate.email().to_string(),
            audience: assertion.audience().to_string(),
            issuer: issuer.to_string(),
            expires_at: assertion.expires_at(),
        })
    }
}

/// Remote verifier response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    /// `okay` or `failure`
    pub status: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Echoed as the relying party supplied it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,

    /// Assertion expiry, Unix milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl VerificationResult {
    pub fn success(identity: VerifiedIdentity, audience: String) -> Self {
        Self {
            status: "okay".to_string(),
            email: Some(identity.email),
            audience: Some(audience),
            expires: Some(identity.expires_at.timestamp_millis()),
            issuer: Some(identity.issuer),
            reason: None,
        }
    }

    pub fn failure(reason: String) -> Self {
        Self {
            status: "failure".to_string(),
            email: None,
            audience: None,
            expires: None,
            issuer: None,
            reason: Some(reason),
        }
    }

    pub fn is_okay(&self) -> bool {
        self.status == "okay"
    }
}
