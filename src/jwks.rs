// JWKS rendering of the publishable keys

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rsa::traits::PublicKeyParts;
use rsa::BigUint;

use crate::key_management::KeyStore;
use crate::types::{JsonWebKey, JwksDocument, KeyRecord};

/// Minimal big-endian magnitude of `value`.
///
/// No sign byte and no leading zero padding; zero encodes as a single `0x00`.
pub fn minimal_be_bytes(value: &BigUint) -> Vec<u8> {
    let bytes = value.to_bytes_be();
    match bytes.iter().position(|&b| b != 0) {
        Some(first) => bytes[first..].to_vec(),
        None => vec![0],
    }
}

/// Base64url (unpadded) encoding of an unsigned big integer, per RFC 7518 §6.3.1.
pub fn encode_biguint(value: &BigUint) -> String {
    URL_SAFE_NO_PAD.encode(minimal_be_bytes(value))
}

/// Renders the public half of every publishable key.
#[derive(Debug, Clone)]
pub struct JwksPublisher {
    store: KeyStore,
}

impl JwksPublisher {
    pub fn new(store: KeyStore) -> Self {
        Self { store }
    }

    pub fn render(&self) -> JwksDocument {
        let keys: Vec<JsonWebKey> = self.store.publishable_keys().map(public_jwk).collect();
        tracing::debug!(count = keys.len(), "rendered JWKS");
        JwksDocument { keys }
    }
}

fn public_jwk(key: &KeyRecord) -> JsonWebKey {
    JsonWebKey {
        alg: "RS256".to_string(),
        kty: "RSA".to_string(),
        key_use: "sig".to_string(),
        kid: key.kid.clone(),
        n: encode_biguint(key.public_key.n()),
        e: encode_biguint(key.public_key.e()),
    }
}
