// RS256 token issuance over the fixed key pair

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, Header};

use crate::error::IssueError;
use crate::key_management::{KeyStore, ACTIVE_KID, EXPIRED_KID};
use crate::types::{Claims, IssuedToken, TokenRequest};

/// Validity window applied in either direction from the issue time.
pub const TOKEN_LIFETIME_SECS: i64 = 3600;

pub const SUBJECT: &str = "username";

/// Signs tokens with the active key, or with the unpublished expired key on request.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    store: KeyStore,
}

impl TokenIssuer {
    pub fn new(store: KeyStore) -> Self {
        Self { store }
    }

    pub fn issue(&self, request: TokenRequest) -> Result<IssuedToken, IssueError> {
        self.issue_at(request, Utc::now().timestamp())
    }

    /// Issue a token as if the current time were `now` (unix seconds).
    pub fn issue_at(&self, request: TokenRequest, now: i64) -> Result<IssuedToken, IssueError> {
        let kid = if request.want_expired {
            EXPIRED_KID
        } else {
            ACTIVE_KID
        };

        // Never fall back to another key: the kid must name the key that signed
        let key = self
            .store
            .lookup(kid)
            .ok_or_else(|| IssueError::UnknownKey(kid.to_string()))?;

        let exp = if request.want_expired {
            now - TOKEN_LIFETIME_SECS
        } else {
            now + TOKEN_LIFETIME_SECS
        };
        let claims = Claims {
            sub: SUBJECT.to_string(),
            iat: now,
            exp,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(kid.to_string());

        let token = encode(&header, &claims, &key.encoding_key)?;
        let signature_segment = token.rsplit('.').next().unwrap_or_default();
        let signature = URL_SAFE_NO_PAD.decode(signature_segment)?;
        tracing::debug!(kid, exp, "issued token");

        Ok(IssuedToken {
            header,
            claims,
            signature,
            token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key_management::tests::shared_store;
    use crate::types::KeyRecord;
    use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};
    use rsa::pkcs1v15::{Signature, VerifyingKey};
    use rsa::sha2::Sha256;
    use rsa::signature::Verifier;

    fn decoding_key_for(record: &KeyRecord) -> DecodingKey {
        use rsa::traits::PublicKeyParts;
        DecodingKey::from_rsa_raw_components(
            &record.public_key.n().to_bytes_be(),
            &record.public_key.e().to_bytes_be(),
        )
    }

    #[test]
    fn test_valid_token_expires_in_future() {
        let issuer = TokenIssuer::new(shared_store());
        let now = Utc::now().timestamp();
        let issued = issuer.issue(TokenRequest::valid()).unwrap();

        assert!(issued.claims.exp > now);
        assert_eq!(issued.kid(), Some(ACTIVE_KID));
        assert_eq!(issued.header.alg, Algorithm::RS256);
        assert_eq!(issued.claims.sub, "username");
    }

    #[test]
    fn test_expired_token_expires_in_past() {
        let issuer = TokenIssuer::new(shared_store());
        let now = Utc::now().timestamp();
        let issued = issuer.issue(TokenRequest::expired()).unwrap();

        assert!(issued.claims.exp < now);
        assert_eq!(issued.kid(), Some(EXPIRED_KID));
        assert_ne!(ACTIVE_KID, EXPIRED_KID);
    }

    #[test]
    fn test_issue_at_uses_fixed_window() {
        let issuer = TokenIssuer::new(shared_store());
        let valid = issuer.issue_at(TokenRequest::valid(), 1_000_000).unwrap();
        assert_eq!(valid.claims.exp, 1_003_600);
        assert_eq!(valid.claims.iat, 1_000_000);

        let expired = issuer.issue_at(TokenRequest::expired(), 1_000_000).unwrap();
        assert_eq!(expired.claims.exp, 996_400);
    }

    #[test]
    fn test_compact_form_segments() {
        let issuer = TokenIssuer::new(shared_store());
        let issued = issuer.issue(TokenRequest::valid()).unwrap();
        let parts: Vec<&str> = issued.as_str().split('.').collect();
        assert_eq!(parts.len(), 3, "JWT should have 3 parts");
        for part in &parts {
            assert!(!part.is_empty());
            assert!(!part.contains(['=', '+', '/']));
        }

        let header: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(parts[0]).unwrap()).unwrap();
        assert_eq!(header["alg"], "RS256");
        assert_eq!(header["kid"], ACTIVE_KID);

        let claims: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(parts[1]).unwrap()).unwrap();
        assert_eq!(claims["sub"], "username");
        assert_eq!(claims["exp"], issued.claims.exp);

        // 2048-bit key -> 256-byte signature, matching the third segment
        assert_eq!(issued.signature().len(), 256);
        assert_eq!(URL_SAFE_NO_PAD.decode(parts[2]).unwrap(), issued.signature());
        assert_eq!(issued.to_string(), issued.token);
    }

    #[test]
    fn test_signature_verifies_with_signing_key() {
        let store = shared_store();
        let issuer = TokenIssuer::new(store.clone());

        for request in [TokenRequest::valid(), TokenRequest::expired()] {
            let issued = issuer.issue(request).unwrap();
            let kid = decode_header(issued.as_str()).unwrap().kid.unwrap();
            let record = store.lookup(&kid).unwrap();

            let mut validation = Validation::new(Algorithm::RS256);
            validation.validate_exp = false;
            let data =
                decode::<Claims>(issued.as_str(), &decoding_key_for(record), &validation).unwrap();
            assert_eq!(data.claims, issued.claims);
        }
    }

    #[test]
    fn test_signature_is_pkcs1v15_sha256_over_signing_input() {
        let store = shared_store();
        let issued = TokenIssuer::new(store.clone())
            .issue(TokenRequest::expired())
            .unwrap();
        let (signing_input, _) = issued.as_str().rsplit_once('.').unwrap();

        let record = store.lookup(EXPIRED_KID).unwrap();
        let verifying_key = VerifyingKey::<Sha256>::new(record.public_key.clone());
        let signature = Signature::try_from(issued.signature()).unwrap();
        verifying_key
            .verify(signing_input.as_bytes(), &signature)
            .expect("signature should verify against the expired key");
    }

    #[test]
    fn test_expired_token_rejected_by_exp_validation() {
        let store = shared_store();
        let issued = TokenIssuer::new(store.clone())
            .issue(TokenRequest::expired())
            .unwrap();
        let record = store.lookup(EXPIRED_KID).unwrap();

        let err = decode::<Claims>(
            issued.as_str(),
            &decoding_key_for(record),
            &Validation::new(Algorithm::RS256),
        )
        .unwrap_err();
        assert!(matches!(
            err.kind(),
            jsonwebtoken::errors::ErrorKind::ExpiredSignature
        ));
    }

    #[test]
    fn test_missing_key_is_an_error_not_a_substitution() {
        let store = shared_store();
        let active = store.lookup(ACTIVE_KID).unwrap().clone();
        let issuer = TokenIssuer::new(KeyStore::from_records(vec![active]).unwrap());

        assert!(issuer.issue(TokenRequest::valid()).is_ok());
        let err = issuer.issue(TokenRequest::expired()).unwrap_err();
        assert!(matches!(err, IssueError::UnknownKey(kid) if kid == EXPIRED_KID));
    }
}
