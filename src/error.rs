// Error types for key generation and token issuance

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Failures while building key material. All of these are fatal at startup.
#[derive(Debug, Error)]
pub enum KeyError {
    /// RSA key generation failed (entropy source or arithmetic failure).
    #[error("RSA key generation failed: {0}")]
    Generation(#[from] rsa::Error),

    /// Private key could not be exported for the signer.
    #[error("failed to export private key: {0}")]
    Export(#[from] rsa::pkcs8::Error),

    /// Exported key was rejected by the JWT signer.
    #[error("invalid signing key: {0}")]
    InvalidSigningKey(#[source] jsonwebtoken::errors::Error),

    /// Two records share a key identifier.
    #[error("duplicate key identifier: {0}")]
    DuplicateIdentifier(String),
}

/// Failures while signing a token.
#[derive(Debug, Error)]
pub enum IssueError {
    /// Lookup miss for one of the fixed identifiers. Indicates a defect.
    #[error("no signing key with identifier {0:?}")]
    UnknownKey(String),

    /// JWS serialization or signing failed.
    #[error("token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    /// Signer produced a compact token whose signature segment is not base64url.
    #[error("malformed signature segment: {0}")]
    MalformedSignature(#[from] base64::DecodeError),
}

impl IntoResponse for IssueError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "token issuance failed");
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}
