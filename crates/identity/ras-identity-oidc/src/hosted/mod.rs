//! Presets for hosted identity providers.
//!
//! Each preset expands [`ProviderOptions`] into [`ClientSettings`] with the
//! provider's endpoint layout and scope defaults. Providers that need extra
//! parameters on sign-out also wrap the `logout` operation of the [`Auth`] their
//! accessor returns. A generic OIDC authority needs no preset: build
//! [`OidcProviderProps`] from `ClientSettings` directly.

mod auth0;
mod azure;
mod cognito;

pub use auth0::{Auth0Provider, use_auth0};
pub use azure::{AzureB2cProvider, use_azure};
pub use cognito::{CognitoProvider, use_cognito};

use crate::config::{ClientSettings, ProviderMetadata, ProviderOptions};
use crate::context::{Auth, AuthContext, AuthOperations};
use crate::error::OidcResult;
use crate::events::ProviderEvents;
use crate::provider::OidcProviderProps;
use crate::types::{SigninRedirectArgs, SigninSilentArgs, SignoutRedirectArgs};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// A hosted identity provider preset.
pub trait HostedProvider {
    const NAME: &'static str;

    /// Name reported when the accessor is used outside a provider.
    const ACCESSOR: &'static str;

    fn client_settings(options: &ProviderOptions) -> OidcResult<ClientSettings>;

    /// Parameters every sign-out request must carry.
    fn logout_params(_settings: &ClientSettings) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    /// Provider props for `options`, ready for [`OidcProvider::new`](crate::OidcProvider::new).
    fn props(options: &ProviderOptions, events: ProviderEvents) -> OidcResult<OidcProviderProps> {
        options.validate()?;
        let settings = Self::client_settings(options)?;
        debug!(
            "{} settings for {}: scope '{}'",
            Self::NAME,
            options.domain,
            settings.scope
        );

        Ok(OidcProviderProps::builder()
            .settings(settings)
            .events(events)
            .token_storage(options.token_storage.clone())
            .build())
    }

    /// [`AuthContext::use_auth`] with this provider's sign-out parameters injected.
    fn use_auth(ctx: &AuthContext) -> OidcResult<Auth> {
        let auth = ctx.auth_for(Self::ACCESSOR)?;
        let client = ctx.use_auth_client()?;

        let params = Self::logout_params(client.settings());
        if params.is_empty() {
            return Ok(auth);
        }

        let inner = Arc::clone(auth.operations());
        Ok(auth.with_operations(Arc::new(InjectLogoutParams { inner, params })))
    }
}

/// `https://{domain}/` unless an issuer is given.
pub(crate) fn issuer(options: &ProviderOptions) -> String {
    options
        .issuer
        .clone()
        .unwrap_or_else(|| format!("https://{}/", options.domain))
}

/// Settings every hosted preset shares.
pub(crate) fn hosted_settings(
    options: &ProviderOptions,
    scope: String,
    metadata: ProviderMetadata,
) -> ClientSettings {
    ClientSettings::builder()
        .authority(options.domain.clone())
        .client_id(options.client_id.clone())
        .maybe_client_secret(options.client_secret.clone())
        .redirect_uri(options.redirect_uri.clone())
        .post_logout_redirect_uri(options.redirect_uri.clone())
        .response_type("code".to_string())
        .scope(scope)
        .load_user_info(false)
        .automatic_silent_renew(options.use_refresh_tokens)
        .metadata(metadata)
        .extra(options.extra.clone())
        .build()
}

/// Adds fixed parameters to every sign-out request. Provider values win over the caller's.
struct InjectLogoutParams {
    inner: Arc<dyn AuthOperations>,
    params: BTreeMap<String, String>,
}

#[async_trait]
impl AuthOperations for InjectLogoutParams {
    async fn login_with_redirect(&self, args: SigninRedirectArgs) -> OidcResult<()> {
        self.inner.login_with_redirect(args).await
    }

    async fn login_silent(&self, args: SigninSilentArgs) {
        self.inner.login_silent(args).await
    }

    async fn get_access_token_silently(&self, args: SigninSilentArgs) -> OidcResult<String> {
        self.inner.get_access_token_silently(args).await
    }

    async fn logout(&self, mut args: SignoutRedirectArgs) -> OidcResult<()> {
        args.extra_query_params.extend(self.params.clone());
        self.inner.logout(args).await
    }
}
