use super::{HostedProvider, hosted_settings, issuer};
use crate::config::{ClientSettings, ProviderMetadata, ProviderOptions};
use crate::context::{Auth, AuthContext};
use crate::error::OidcResult;
use crate::scope::unique_scopes;
use std::collections::BTreeMap;

const DEFAULT_SCOPE: &str = "openid";

/// Amazon Cognito hosted UI preset.
///
/// Cognito's logout endpoint needs the client id, response type and redirect uri
/// on every request, so [`use_cognito`] adds them.
pub struct CognitoProvider;

impl HostedProvider for CognitoProvider {
    const NAME: &'static str = "Cognito";
    const ACCESSOR: &'static str = "use_cognito";

    fn client_settings(options: &ProviderOptions) -> OidcResult<ClientSettings> {
        let domain = &options.domain;
        let scope = unique_scopes([options.scope.as_deref().unwrap_or(DEFAULT_SCOPE)]);

        let metadata = ProviderMetadata {
            issuer: issuer(options),
            authorization_endpoint: format!("https://{}/oauth2/authorize", domain),
            token_endpoint: format!("https://{}/oauth2/token", domain),
            end_session_endpoint: format!("https://{}/logout", domain),
            userinfo_endpoint: None,
            jwks_uri: None,
        };

        Ok(hosted_settings(options, scope, metadata))
    }

    fn logout_params(settings: &ClientSettings) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("client_id".to_string(), settings.client_id.clone()),
            ("response_type".to_string(), settings.response_type.clone()),
            ("redirect_uri".to_string(), settings.redirect_uri.clone()),
        ])
    }
}

pub fn use_cognito(ctx: &AuthContext) -> OidcResult<Auth> {
    CognitoProvider::use_auth(ctx)
}
