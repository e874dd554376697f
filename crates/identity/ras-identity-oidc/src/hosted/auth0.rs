use super::{HostedProvider, hosted_settings, issuer};
use crate::config::{ClientSettings, ProviderMetadata, ProviderOptions};
use crate::context::{Auth, AuthContext};
use crate::error::OidcResult;
use crate::scope::unique_scopes;
use std::collections::BTreeMap;

const DEFAULT_SCOPE: &str = "openid profile email";

/// Auth0 tenant preset.
pub struct Auth0Provider;

impl HostedProvider for Auth0Provider {
    const NAME: &'static str = "Auth0";
    const ACCESSOR: &'static str = "use_auth0";

    fn client_settings(options: &ProviderOptions) -> OidcResult<ClientSettings> {
        let domain = &options.domain;
        let scope = unique_scopes([
            options.scope.as_deref().unwrap_or(DEFAULT_SCOPE),
            if options.use_refresh_tokens {
                "offline_access"
            } else {
                ""
            },
        ]);

        let metadata = ProviderMetadata {
            issuer: issuer(options),
            authorization_endpoint: format!("https://{}/authorize", domain),
            token_endpoint: format!("https://{}/oauth/token", domain),
            end_session_endpoint: format!("https://{}/v2/logout", domain),
            userinfo_endpoint: None,
            jwks_uri: None,
        };

        let mut settings = hosted_settings(options, scope, metadata);
        if let Some(audience) = &options.audience {
            settings
                .extra_query_params
                .insert("audience".to_string(), audience.clone());
        }
        Ok(settings)
    }

    fn logout_params(settings: &ClientSettings) -> BTreeMap<String, String> {
        BTreeMap::from([("client_id".to_string(), settings.client_id.clone())])
    }
}

pub fn use_auth0(ctx: &AuthContext) -> OidcResult<Auth> {
    Auth0Provider::use_auth(ctx)
}
