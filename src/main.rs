// JWKS issuer binary
//
// Issues RS256 JSON Web Tokens and publishes the active verification key as a
// JSON Web Key Set. A second, deliberately expired key signs tokens on request
// but is never published, for exercising verifier-side expiry and kid handling.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use jwks_issuer::config::ServerConfig;
use jwks_issuer::server;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::parse();

    if let Err(e) = server::start_server(config).await {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}
