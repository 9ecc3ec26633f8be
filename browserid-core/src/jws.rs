//! Compact JWS encoding shared by certificates and assertions
//!
//! Tokens are `base64url(header).base64url(payload).base64url(signature)`
//! signed with Ed25519 over the first two segments.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{Error, KeyPair, PublicKey, Result};

const ALGORITHM: &str = "EdDSA";

#[derive(Serialize, Deserialize)]
struct Header {
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
}

/// A decoded but not yet verified token
#[derive(Debug, Clone)]
pub(crate) struct Jws<T> {
    pub encoded: String,
    pub payload: T,
    signing_input_len: usize,
    signature: Vec<u8>,
}

impl<T: DeserializeOwned> Jws<T> {
    pub fn decode(encoded: &str) -> Result<Self> {
        let mut parts = encoded.split('.');
        let (header, payload, signature) = match (parts.next(), parts.next(), parts.next()) {
            (Some(h), Some(p), Some(s)) if parts.next().is_none() => (h, p, s),
            _ => return Err(Error::MalformedToken("expected 3 JWT parts".into())),
        };

        let header: Header = serde_json::from_slice(&URL_SAFE_NO_PAD.decode(header)?)?;
        if header.alg != ALGORITHM {
            return Err(Error::MalformedToken(format!(
                "unsupported algorithm: {}",
                header.alg
            )));
        }

        Ok(Self {
            encoded: encoded.to_string(),
            payload: serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload)?)?,
            signing_input_len: encoded.len() - signature.len() - 1,
            signature: URL_SAFE_NO_PAD.decode(signature)?,
        })
    }
}

impl<T> Jws<T> {
    /// Check the signature over `header.payload`
    pub fn verify(&self, key: &PublicKey) -> Result<()> {
        let signing_input = &self.encoded.as_bytes()[..self.signing_input_len];
        key.verify(signing_input, &self.signature)
    }
}

impl<T: Serialize> Jws<T> {
    pub fn sign(payload: T, key: &KeyPair) -> Result<Self> {
        let header = Header {
            alg: ALGORITHM.to_string(),
            typ: Some("JWT".to_string()),
        };
        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?),
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload)?)
        );
        let signature = key.sign(signing_input.as_bytes());
        let encoded = format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(&signature));

        Ok(Self {
            signing_input_len: signing_input.len(),
            encoded,
            payload,
            signature,
        })
    }
}
