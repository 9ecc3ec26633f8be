//! Identity certificates
//!
//! A certificate binds a user's public key to their email address and is
//! signed by the issuing authority's key.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::jws::Jws;
use crate::{Error, KeyPair, PublicKey, Result};

/// The principal a certificate speaks for
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Principal {
    pub email: String,
}

impl Principal {
    /// The part of the email after `@`
    pub fn domain(&self) -> Option<&str> {
        crate::domain_from_email(&self.email)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateClaims {
    /// Domain of the authority that signed this certificate
    pub iss: String,

    /// Issued-at, Unix seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Expiry, Unix seconds
    pub exp: i64,

    #[serde(rename = "public-key")]
    pub public_key: PublicKey,

    pub principal: Principal,
}

#[derive(Debug, Clone)]
pub struct Certificate {
    token: Jws<CertificateClaims>,
}

impl Certificate {
    /// Issue a certificate valid from now for `validity`
    pub fn create(
        issuer: &str,
        email: &str,
        user_public_key: &PublicKey,
        validity: Duration,
        issuer_key: &KeyPair,
    ) -> Result<Self> {
        Self::create_at(Utc::now(), issuer, email, user_public_key, validity, issuer_key)
    }

    /// Issue a certificate with an explicit issue time
    pub fn create_at(
        issued_at: DateTime<Utc>,
        issuer: &str,
        email: &str,
        user_public_key: &PublicKey,
        validity: Duration,
        issuer_key: &KeyPair,
    ) -> Result<Self> {
        let claims = CertificateClaims {
            iss: issuer.to_string(),
            iat: Some(issued_at.timestamp()),
            exp: (issued_at + validity).timestamp(),
            public_key: user_public_key.clone(),
            principal: Principal {
                email: email.to_string(),
            },
        };
        Ok(Self {
            token: Jws::sign(claims, issuer_key)?,
        })
    }

    /// Decode without checking the signature
    pub fn parse(encoded: &str) -> Result<Self> {
        let token = Jws::decode(encoded).map_err(|e| match e {
            Error::MalformedToken(reason) => Error::InvalidCertificate(reason),
            Error::Json(e) => Error::InvalidCertificate(e.to_string()),
            other => other,
        })?;
        Ok(Self { token })
    }

    /// Check the issuer's signature and that `now` falls in the validity window
    pub fn verify(&self, issuer_public_key: &PublicKey, now: DateTime<Utc>) -> Result<()> {
        self.token.verify(issuer_public_key)?;

        let now = now.timestamp();
        if let Some(iat) = self.token.payload.iat {
            if iat > now {
                return Err(Error::CertificateNotYetValid);
            }
        }
        if now > self.token.payload.exp {
            return Err(Error::CertificateExpired);
        }
        Ok(())
    }

    pub fn claims(&self) -> &CertificateClaims {
        &self.token.payload
    }

    /// The certified (subject) public key
    pub fn public_key(&self) -> &PublicKey {
        &self.token.payload.public_key
    }

    pub fn email(&self) -> &str {
        &self.token.payload.principal.email
    }

    pub fn issuer(&self) -> &str {
        &self.token.payload.iss
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.token.payload.exp, 0).unwrap_or(DateTime::UNIX_EPOCH)
    }

    pub fn encoded(&self) -> &str {
        &self.token.encoded
    }
}
