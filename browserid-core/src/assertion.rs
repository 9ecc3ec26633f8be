//! Identity assertions and the certificate bundle that backs them
//!
//! An assertion is signed by the key a certificate vouches for and names
//! the relying party it is meant for. On the wire the two travel together
//! as `<cert-1>~...~<cert-n>~<assertion>`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::jws::Jws;
use crate::{Certificate, Error, KeyPair, PublicKey, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssertionClaims {
    /// Expiry, Unix seconds
    pub exp: i64,

    /// Origin of the relying party this assertion is for
    pub aud: String,
}

#[derive(Debug, Clone)]
pub struct Assertion {
    token: Jws<AssertionClaims>,
}

impl Assertion {
    /// Sign a new assertion for `audience`, valid for `validity` from now
    pub fn create(audience: &str, validity: Duration, user_key: &KeyPair) -> Result<Self> {
        Self::create_expiring(audience, Utc::now() + validity, user_key)
    }

    pub fn create_expiring(
        audience: &str,
        expires_at: DateTime<Utc>,
        user_key: &KeyPair,
    ) -> Result<Self> {
        let claims = AssertionClaims {
            exp: expires_at.timestamp(),
            aud: audience.to_string(),
        };
        Ok(Self {
            token: Jws::sign(claims, user_key)?,
        })
    }

    /// Decode without checking the signature
    pub fn parse(encoded: &str) -> Result<Self> {
        let token = Jws::decode(encoded).map_err(|e| match e {
            Error::MalformedToken(reason) => Error::InvalidAssertion(reason),
            Error::Json(e) => Error::InvalidAssertion(e.to_string()),
            other => other,
        })?;
        Ok(Self { token })
    }

    /// Check the signature against the certified user key and the expiry
    /// against `now`
    pub fn verify(&self, public_key: &PublicKey, now: DateTime<Utc>) -> Result<()> {
        self.token.verify(public_key)?;
        if now.timestamp() > self.token.payload.exp {
            return Err(Error::AssertionExpired);
        }
        Ok(())
    }

    pub fn claims(&self) -> &AssertionClaims {
        &self.token.payload
    }

    pub fn audience(&self) -> &str {
        &self.token.payload.aud
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.token.payload.exp, 0).unwrap_or(DateTime::UNIX_EPOCH)
    }

    pub fn encoded(&self) -> &str {
        &self.token.encoded
    }
}

/// Certificate chain plus the assertion it backs
#[derive(Debug, Clone)]
pub struct AssertionBundle {
    certificates: Vec<Certificate>,
    assertion: Assertion,
}

impl AssertionBundle {
    pub fn new(certificate: Certificate, assertion: Assertion) -> Self {
        Self::with_chain(vec![certificate], assertion)
    }

    pub fn with_chain(certificates: Vec<Certificate>, assertion: Assertion) -> Self {
        Self {
            certificates,
            assertion,
        }
    }

    /// Split the `cert~...~assertion` wire form. Any decoding problem is
    /// reported as a malformed assertion.
    pub fn unbundle(encoded: &str) -> Result<Self> {
        let (certs, assertion) = encoded
            .rsplit_once('~')
            .ok_or_else(|| Error::MalformedAssertion("no certificates provided".into()))?;
        if certs.is_empty() {
            return Err(Error::MalformedAssertion("no certificates provided".into()));
        }

        let certificates = certs
            .split('~')
            .map(Certificate::parse)
            .collect::<Result<Vec<_>>>()
            .map_err(|e| Error::MalformedAssertion(e.to_string()))?;
        let assertion =
            Assertion::parse(assertion).map_err(|e| Error::MalformedAssertion(e.to_string()))?;

        Ok(Self {
            certificates,
            assertion,
        })
    }

    pub fn bundle(&self) -> String {
        let mut parts: Vec<&str> = self.certificates.iter().map(|c| c.encoded()).collect();
        parts.push(self.assertion.encoded());
        parts.join("~")
    }

    pub fn certificates(&self) -> &[Certificate] {
        &self.certificates
    }

    pub fn assertion(&self) -> &Assertion {
        &self.assertion
    }
}
