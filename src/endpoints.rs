// HTTP handlers for the auth and JWKS endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};

use crate::error::IssueError;
use crate::issuer::TokenIssuer;
use crate::jwks::JwksPublisher;
use crate::key_management::KeyStore;
use crate::types::{JwksDocument, TokenRequest};

/// Shared handler state. Both halves read the same immutable key store.
#[derive(Debug, Clone)]
pub struct AppState {
    pub issuer: TokenIssuer,
    pub publisher: JwksPublisher,
}

impl AppState {
    pub fn new(store: KeyStore) -> Self {
        Self {
            issuer: TokenIssuer::new(store.clone()),
            publisher: JwksPublisher::new(store),
        }
    }
}

/// Truth table for the `expired` query flag.
///
/// | value               | result |
/// |---------------------|--------|
/// | absent              | false  |
/// | `""`                | false  |
/// | any non-empty value | true   |
///
/// `"0"` and `"false"` are non-empty and therefore true.
pub fn parse_expired_flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

/// True when any `expired` pair in the query carries a non-empty value.
///
/// Repeated keys are all considered, so `expired=&expired=1` is expired.
pub fn wants_expired(params: &[(String, String)]) -> bool {
    params
        .iter()
        .filter(|(key, _)| key == "expired")
        .any(|(_, value)| parse_expired_flag(Some(value.as_str())))
}

/// JWKS endpoint handler - serves the publishable public keys
pub async fn jwks_handler(State(state): State<AppState>) -> Json<JwksDocument> {
    Json(state.publisher.render())
}

/// Auth endpoint handler - returns a compact JWT as the response body
///
/// A query string that fails to parse is treated as "not expired".
pub async fn auth_handler(
    State(state): State<AppState>,
    query: Option<Query<Vec<(String, String)>>>,
) -> Result<String, IssueError> {
    let want_expired = query.is_some_and(|Query(params)| wants_expired(&params));

    let issued = state.issuer.issue(TokenRequest { want_expired })?;
    Ok(issued.into_string())
}

/// Uniform rejection for unsupported methods and unknown paths
pub async fn method_not_allowed() -> StatusCode {
    StatusCode::METHOD_NOT_ALLOWED
}
