use super::{HostedProvider, hosted_settings, issuer};
use crate::config::{ClientSettings, ProviderMetadata, ProviderOptions};
use crate::context::{Auth, AuthContext};
use crate::error::{OidcError, OidcResult};
use crate::scope::unique_scopes;

const DEFAULT_SCOPE: &str = "openid email profile";

/// Azure AD B2C preset. Every endpoint is scoped to the user flow in `policy`.
pub struct AzureB2cProvider;

impl HostedProvider for AzureB2cProvider {
    const NAME: &'static str = "Azure AD B2C";
    const ACCESSOR: &'static str = "use_azure";

    fn client_settings(options: &ProviderOptions) -> OidcResult<ClientSettings> {
        let policy = options
            .policy
            .as_deref()
            .filter(|policy| !policy.trim().is_empty())
            .ok_or_else(|| OidcError::configuration("Azure AD B2C requires a policy"))?;
        let base = format!("https://{}/{}/oauth2/v2.0", options.domain, policy);

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
            authorization_endpoint: format!("{}/authorize", base),
            token_endpoint: format!("{}/token", base),
            end_session_endpoint: format!("{}/logout", base),
            userinfo_endpoint: None,
            jwks_uri: None,
        };

        Ok(hosted_settings(options, scope, metadata))
    }
}

pub fn use_azure(ctx: &AuthContext) -> OidcResult<Auth> {
    AzureB2cProvider::use_auth(ctx)
}
