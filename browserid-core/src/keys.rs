//! Ed25519 keys and their JWK-like wire representation
//!
//! Public keys travel inside well-known documents and certificates as
//! `{"algorithm": "Ed25519", "publicKey": "<base64url>"}`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Algorithm name carried in the `algorithm` member of a key object.
pub const ED25519: &str = "Ed25519";

#[derive(Serialize, Deserialize)]
struct KeyObject {
    algorithm: String,
    #[serde(rename = "publicKey")]
    public_key: String,
}

/// A public key that can verify signatures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    inner: VerifyingKey,
}

impl PublicKey {
    /// Create a public key from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| Error::InvalidKey("public key must be 32 bytes".into()))?;
        VerifyingKey::from_bytes(&bytes)
            .map(|inner| Self { inner })
            .map_err(|e| Error::InvalidKey(e.to_string()))
    }

    /// Decode from unpadded base64url
    pub fn from_base64(s: &str) -> Result<Self> {
        Self::from_bytes(&URL_SAFE_NO_PAD.decode(s)?)
    }

    /// Parse the key object found under `public-key` in a well-known
    /// document or certificate.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let object = KeyObject::deserialize(value)
            .map_err(|e| Error::InvalidKey(format!("not a key object: {}", e)))?;
        Self::from_key_object(object)
    }

    fn from_key_object(object: KeyObject) -> Result<Self> {
        if object.algorithm != ED25519 {
            return Err(Error::InvalidKey(format!(
                "unsupported algorithm: {}",
                object.algorithm
            )));
        }
        Self::from_base64(&object.public_key)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        self.inner.as_bytes()
    }

    pub fn to_base64(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.as_bytes())
    }

    /// Verify `signature` over `message`
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<()> {
        let signature = Signature::from_slice(signature)
            .map_err(|_| Error::SignatureVerificationFailed)?;
        self.inner
            .verify(message, &signature)
            .map_err(|_| Error::SignatureVerificationFailed)
    }
}

impl Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        KeyObject {
            algorithm: ED25519.to_string(),
            public_key: self.to_base64(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let object = KeyObject::deserialize(deserializer)?;
        PublicKey::from_key_object(object).map_err(serde::de::Error::custom)
    }
}

/// A signing keypair, held by issuers and by users' browsers
#[derive(Debug)]
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Rebuild a keypair from its 32-byte secret seed
    pub fn from_seed(seed: &[u8]) -> Result<Self> {
        let seed: [u8; 32] = seed
            .try_into()
            .map_err(|_| Error::InvalidKey("seed must be 32 bytes".into()))?;
        Ok(Self {
            signing_key: SigningKey::from_bytes(&seed),
        })
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            inner: self.signing_key.verifying_key(),
        }
    }

    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.signing_key.sign(message).to_bytes().to_vec()
    }
}
