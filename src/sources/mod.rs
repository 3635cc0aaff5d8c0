pub mod oauth2;
pub mod provider;

pub use oauth2::{CredentialRefresher, OAuth2Refresher};
pub use provider::TokenProvider;
