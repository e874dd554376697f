//! OIDC coordinator error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type OidcResult<T> = Result<T, OidcError>;

/// Errors surfaced by the coordinator, the hosted providers and identity clients.
///
/// Payloads are plain strings so the error can live inside the cloneable
/// [`AuthState`](crate::AuthState) snapshot that consumers observe.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OidcError {
    #[error("User is not authenticated, cannot get access token silently")]
    NotAuthenticated,

    #[error("{accessor} must be used within an OidcProvider")]
    OutsideProvider { accessor: String },

    #[error("Identity client error: {0}")]
    Client(String),

    #[error("Redirect callback failed: {0}")]
    RedirectCallback(String),

    #[error("Silent renew failed: {0}")]
    SilentRenew(String),

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("URL parsing error: {0}")]
    InvalidUrl(String),
}

impl OidcError {
    pub fn outside_provider<S: Into<String>>(accessor: S) -> Self {
        Self::OutsideProvider {
            accessor: accessor.into(),
        }
    }

    pub fn client<S: Into<String>>(msg: S) -> Self {
        Self::Client(msg.into())
    }

    pub fn silent_renew<S: Into<String>>(msg: S) -> Self {
        Self::SilentRenew(msg.into())
    }

    pub fn platform<S: Into<String>>(msg: S) -> Self {
        Self::Platform(msg.into())
    }

    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
}

impl From<serde_json::Error> for OidcError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<url::ParseError> for OidcError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl From<config::ConfigError> for OidcError {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}
