//! # Auth Fetch Library
//!
//! Authenticated HTTP fetching against OAuth2-protected backends:
//! a cached access credential on the server side, and a request client
//! that survives an expired session by refreshing once and retrying.
//!
//! Modules:
//! - `cache`: single-entry access credential cache
//! - `sources`: OAuth2 refresh-token exchange and the cached token provider
//! - `client`: 401-aware request client with single-flight refresh, auth events
//! - `server`: refresh endpoint service
//! - `config`: YAML configuration, value sources and validation

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod helpers;
pub mod observability;
pub mod server;
pub mod sources;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::cache::token::AccessCredential;
pub use crate::client::{AuthEvent, AuthEvents, AuthenticatedRequestClient, RequestOptions};
pub use crate::config::oauth::ServiceConfig;
pub use crate::error::AuthError;
pub use crate::sources::{CredentialRefresher, OAuth2Refresher, TokenProvider};
