// Command-line and environment configuration for the HTTP listener

use std::net::SocketAddr;

use clap::Parser;

/// JWKS issuer - signs RS256 tokens and publishes the active verification key
#[derive(Parser, Debug, Clone)]
#[command(name = "jwks_issuer", version, about, long_about = None)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to
    #[arg(long, env = "JWKS_BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,
}
