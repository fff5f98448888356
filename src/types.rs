// Data structures for the JWKS issuer

use std::fmt;

use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};

/// RSA key pair tagged with its key identifier.
///
/// The private half never leaves this struct: it is not serializable and the
/// `Debug` output omits it.
#[derive(Clone)]
pub struct KeyRecord {
    pub kid: String,
    pub created_at: DateTime<Utc>,
    pub private_key: RsaPrivateKey,
    pub public_key: RsaPublicKey,
    /// Signing key derived once from `private_key`.
    pub encoding_key: EncodingKey,
    /// Whether the public half is listed in the JWKS document.
    pub publishable: bool,
}

impl fmt::Debug for KeyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyRecord")
            .field("kid", &self.kid)
            .field("created_at", &self.created_at)
            .field("modulus_bits", &(self.public_key.size() * 8))
            .field("publishable", &self.publishable)
            .finish_non_exhaustive()
    }
}

/// Input to the token issuer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenRequest {
    pub want_expired: bool,
}

impl TokenRequest {
    pub fn valid() -> Self {
        Self { want_expired: false }
    }

    pub fn expired() -> Self {
        Self { want_expired: true }
    }
}

/// JWT Claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject
    pub iat: i64,    // Issued at
    pub exp: i64,    // Expires at
}

/// A signed token in both structured and compact form.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub header: Header,
    pub claims: Claims,
    /// Raw RSASSA-PKCS1-v1_5 signature bytes.
    pub signature: Vec<u8>,
    /// `base64url(header).base64url(claims).base64url(signature)`
    pub token: String,
}

impl IssuedToken {
    pub fn as_str(&self) -> &str {
        &self.token
    }

    /// Key identifier from the header. Always set for tokens built by the issuer.
    pub fn kid(&self) -> Option<&str> {
        self.header.kid.as_deref()
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    pub fn into_string(self) -> String {
        self.token
    }
}

impl fmt::Display for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token)
    }
}

/// JSON Web Key structure for JWKS response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonWebKey {
    pub alg: String, // Algorithm (RS256)
    pub kty: String, // Key type (RSA)
    #[serde(rename = "use")]
    pub key_use: String, // Key usage (sig for signature)
    pub kid: String, // Key ID
    pub n: String,   // Modulus (base64url)
    pub e: String,   // Exponent (base64url)
}

impl JsonWebKey {
    /// Rebuild an RS256 verification key from the published components.
    pub fn decoding_key(&self) -> Result<DecodingKey, jsonwebtoken::errors::Error> {
        DecodingKey::from_rsa_components(&self.n, &self.e)
    }
}

/// JWKS response format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwksDocument {
    pub keys: Vec<JsonWebKey>,
}

impl JwksDocument {
    pub fn find(&self, kid: &str) -> Option<&JsonWebKey> {
        self.keys.iter().find(|key| key.kid == kid)
    }
}
