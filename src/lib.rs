// Library module for the JWKS issuer

pub mod config;
pub mod endpoints;
pub mod error;
pub mod issuer;
pub mod jwks;
pub mod key_management;
pub mod server;
pub mod types;
