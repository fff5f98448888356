// Server setup and configuration

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::endpoints::{auth_handler, jwks_handler, method_not_allowed, AppState};
use crate::key_management::KeyStore;

/// Create the application router with all endpoints
///
/// Wrong methods on either path and all unknown paths answer 405.
pub fn create_app(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/.well-known/jwks.json",
            get(jwks_handler)
                .head(method_not_allowed)
                .fallback(method_not_allowed),
        )
        .route("/auth", post(auth_handler).fallback(method_not_allowed))
        .fallback(method_not_allowed)
        .with_state(app_state)
}

pub async fn start_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Keys must exist before the listener accepts anything
    let store = tokio::task::spawn_blocking(KeyStore::generate).await??;
    tracing::info!(kids = ?store.kids().collect::<Vec<_>>(), "generated signing keys");

    let app = create_app(AppState::new(store));

    let listener = TcpListener::bind(config.bind).await?;
    tracing::info!(addr = %listener.local_addr()?, "JWKS issuer listening");
    tracing::info!("  GET  /.well-known/jwks.json - JWKS endpoint");
    tracing::info!("  POST /auth                   - Authentication endpoint");
    tracing::info!("  POST /auth?expired=1         - Token signed by the unpublished expired key");

    axum::serve(listener, app).await?;

    Ok(())
}
