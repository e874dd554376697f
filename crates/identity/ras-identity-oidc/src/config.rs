//! Identity client settings and hosted provider options.
//!
//! [`ClientSettings`] is the record the identity client is created from.
//! [`ProviderOptions`] is the smaller record the hosted providers in
//! [`hosted`](crate::hosted) expand into client settings, and can be layered from
//! a config file and the environment:
//!
//! - Optional config file (TOML, JSON or YAML, picked by extension)
//! - Environment variables `<PREFIX>__<FIELD>`, e.g. `OIDC__CLIENT_ID`
//!
//! Environment variables take precedence over config file values.

use crate::error::{OidcError, OidcResult};
use crate::storage::StorageType;
use bon::Builder;
use config::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};
use url::Url;

/// Open extension map for client options the typed records do not name.
pub type Extensions = Map<String, Value>;

/// Endpoints of the authorization server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderMetadata {
    pub issuer: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub end_session_endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub userinfo_endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwks_uri: Option<String>,
}

impl ProviderMetadata {
    fn endpoints(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("authorization_endpoint", Some(self.authorization_endpoint.as_str())),
            ("token_endpoint", Some(self.token_endpoint.as_str())),
            ("end_session_endpoint", Some(self.end_session_endpoint.as_str())),
            ("userinfo_endpoint", self.userinfo_endpoint.as_deref()),
            ("jwks_uri", self.jwks_uri.as_deref()),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
    }
}

/// Settings the identity client is constructed with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
pub struct ClientSettings {
    #[builder(into)]
    pub authority: String,

    #[builder(into)]
    pub client_id: String,

    #[builder(into)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    #[builder(into)]
    pub redirect_uri: String,

    #[builder(into)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_logout_redirect_uri: Option<String>,

    #[builder(default = default_response_type())]
    #[serde(default = "default_response_type")]
    pub response_type: String,

    #[builder(default = default_scope())]
    #[serde(default = "default_scope")]
    pub scope: String,

    /// Whether the client fetches the userinfo endpoint after sign-in.
    #[builder(default = true)]
    #[serde(default = "default_true")]
    pub load_user_info: bool,

    #[builder(default = true)]
    #[serde(default = "default_true")]
    pub automatic_silent_renew: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ProviderMetadata>,

    /// Extra parameters sent with every authorization request.
    #[builder(default)]
    #[serde(default)]
    pub extra_query_params: BTreeMap<String, String>,

    /// Remaining lifetime, in seconds, at which an access token counts as expiring.
    #[builder(default = default_expiring_notification_time())]
    #[serde(default = "default_expiring_notification_time")]
    pub access_token_expiring_notification_time_in_seconds: u64,

    #[builder(default)]
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Extensions,
}

fn default_response_type() -> String {
    "code".to_string()
}

fn default_scope() -> String {
    "openid".to_string()
}

fn default_true() -> bool {
    true
}

fn default_expiring_notification_time() -> u64 {
    60
}

fn check_url(field: &str, value: &str) -> OidcResult<()> {
    Url::parse(value)
        .map(|_| ())
        .map_err(|e| OidcError::InvalidUrl(format!("{} '{}': {}", field, value, e)))
}

impl ClientSettings {
    /// Checks the settings before a client is created from them.
    pub fn validate(&self) -> OidcResult<()> {
        if self.authority.trim().is_empty() {
            return Err(OidcError::configuration("authority must not be empty"));
        }
        if self.client_id.trim().is_empty() {
            return Err(OidcError::configuration("client_id must not be empty"));
        }

        check_url("redirect_uri", &self.redirect_uri)?;
        if let Some(uri) = &self.post_logout_redirect_uri {
            check_url("post_logout_redirect_uri", uri)?;
        }
        if let Some(metadata) = &self.metadata {
            for (name, endpoint) in metadata.endpoints() {
                check_url(name, endpoint)?;
            }
        }
        Ok(())
    }
}

/// Options accepted by the hosted providers.
#[derive(Debug, Clone, Deserialize, Builder)]
pub struct ProviderOptions {
    /// Host name of the provider's tenant, without scheme.
    #[builder(into)]
    pub domain: String,

    /// Replaces the issuer derived from `domain`. Endpoints are unaffected.
    #[builder(into)]
    #[serde(default)]
    pub issuer: Option<String>,

    #[builder(into)]
    pub client_id: String,

    #[builder(into)]
    #[serde(default)]
    pub client_secret: Option<String>,

    #[builder(into)]
    pub redirect_uri: String,

    #[builder(into)]
    #[serde(default)]
    pub scope: Option<String>,

    #[builder(default)]
    #[serde(default)]
    pub use_refresh_tokens: bool,

    #[builder(default)]
    #[serde(default)]
    pub token_storage: StorageType,

    /// API audience requested from the SaaS platform.
    #[builder(into)]
    #[serde(default)]
    pub audience: Option<String>,

    /// User flow the B2C endpoints are templated with.
    #[builder(into)]
    #[serde(default)]
    pub policy: Option<String>,

    #[builder(default)]
    #[serde(default)]
    pub extra: Extensions,
}

impl ProviderOptions {
    /// Loads options from an optional config file, then `<env_prefix>__*` variables.
    pub fn load(config_file: Option<&Path>, env_prefix: &str) -> OidcResult<Self> {
        let mut builder = ConfigBuilder::builder();

        match config_file {
            Some(path) if path.exists() => {
                info!("Loading provider options from {}", path.display());
                builder = builder.add_source(File::from(path));
            }
            Some(path) => {
                debug!("No provider options file at {}", path.display());
            }
            None => {}
        }

        builder = builder.add_source(
            Environment::with_prefix(env_prefix)
                .separator("__")
                .try_parsing(true),
        );

        let options: ProviderOptions = builder.build()?.try_deserialize()?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> OidcResult<()> {
        if self.domain.trim().is_empty() {
            return Err(OidcError::configuration("domain must not be empty"));
        }
        if self.client_id.trim().is_empty() {
            return Err(OidcError::configuration("client_id must not be empty"));
        }
        Ok(())
    }
}
