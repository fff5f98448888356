// Key generation and the fixed two-key store

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::EncodingKey;
use rand::rngs::OsRng;
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};

use crate::error::KeyError;
use crate::types::KeyRecord;

/// Identifier of the published signing key.
pub const ACTIVE_KID: &str = "active";
/// Identifier of the retired key that still signs but is never published.
pub const EXPIRED_KID: &str = "expired";

pub const MODULUS_BITS: usize = 2048;
pub const PUBLIC_EXPONENT: u32 = 65537;

impl KeyRecord {
    /// Generate a new RSA key pair from the OS CSPRNG.
    pub fn generate(kid: impl Into<String>, publishable: bool) -> Result<Self, KeyError> {
        let mut rng = OsRng;
        let exponent = BigUint::from(PUBLIC_EXPONENT);
        let private_key = RsaPrivateKey::new_with_exp(&mut rng, MODULUS_BITS, &exponent)?;
        Self::from_private_key(kid, private_key, publishable)
    }

    /// Wrap existing key material.
    pub fn from_private_key(
        kid: impl Into<String>,
        private_key: RsaPrivateKey,
        publishable: bool,
    ) -> Result<Self, KeyError> {
        let public_key = RsaPublicKey::from(&private_key);

        // jsonwebtoken only takes PEM or DER, so export once here instead of per request
        let private_key_pem = private_key.to_pkcs8_pem(LineEnding::LF)?;
        let encoding_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
            .map_err(KeyError::InvalidSigningKey)?;

        Ok(KeyRecord {
            kid: kid.into(),
            created_at: Utc::now(),
            private_key,
            public_key,
            encoding_key,
            publishable,
        })
    }
}

/// Immutable set of signing keys shared by the issuer and the JWKS publisher.
///
/// Cloning is cheap; all clones see the same records.
#[derive(Debug, Clone)]
pub struct KeyStore {
    records: Arc<Vec<KeyRecord>>,
}

impl KeyStore {
    /// Generate the active key, then the expired key.
    pub fn generate() -> Result<Self, KeyError> {
        let active = KeyRecord::generate(ACTIVE_KID, true)?;
        let expired = KeyRecord::generate(EXPIRED_KID, false)?;
        Self::from_records(vec![active, expired])
    }

    /// Build a store from pre-built records, preserving their order.
    pub fn from_records(records: Vec<KeyRecord>) -> Result<Self, KeyError> {
        let mut seen = HashSet::new();
        for record in &records {
            if !seen.insert(record.kid.as_str()) {
                return Err(KeyError::DuplicateIdentifier(record.kid.clone()));
            }
        }

        Ok(KeyStore {
            records: Arc::new(records),
        })
    }

    /// Exact-match lookup by key identifier.
    pub fn lookup(&self, kid: &str) -> Option<&KeyRecord> {
        self.records.iter().find(|record| record.kid == kid)
    }

    /// Records listed in the JWKS document, in insertion order.
    pub fn publishable_keys(&self) -> impl Iterator<Item = &KeyRecord> {
        self.records.iter().filter(|record| record.publishable)
    }

    pub fn kids(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|record| record.kid.as_str())
    }
}
