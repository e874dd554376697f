//! Contract of the identity client the coordinator drives.

use crate::config::ClientSettings;
use crate::error::OidcResult;
use crate::events::ClientEvents;
use crate::storage::WebStorageStateStore;
use crate::types::{SigninRedirectArgs, SigninSilentArgs, SignoutRedirectArgs, User};
use async_trait::async_trait;
use std::sync::Arc;

/// An OpenID Connect client that performs the protocol work.
///
/// Token exchange, PKCE and token validation all live behind this trait. The
/// coordinator only sequences the calls and mirrors their outcome into state.
#[async_trait]
pub trait IdentityClient: Send + Sync {
    fn settings(&self) -> &ClientSettings;

    /// Registry the client raises its session lifecycle events through.
    fn events(&self) -> &ClientEvents;

    /// Navigates to the authorization endpoint.
    async fn signin_redirect(&self, args: SigninRedirectArgs) -> OidcResult<()>;

    /// Signs in without user interaction.
    async fn signin_silent(&self, args: SigninSilentArgs) -> OidcResult<Option<User>>;

    /// Consumes the authorization response in the current location.
    async fn signin_redirect_callback(&self) -> OidcResult<Option<User>>;

    /// Navigates to the end-session endpoint.
    async fn signout_redirect(&self, args: SignoutRedirectArgs) -> OidcResult<()>;

    /// The stored session, if any.
    async fn get_user(&self) -> OidcResult<Option<User>>;
}

/// Creates the identity client a provider owns.
pub trait ClientFactory {
    fn create(
        &self,
        settings: ClientSettings,
        store: WebStorageStateStore,
    ) -> Arc<dyn IdentityClient>;
}

impl<F> ClientFactory for F
where
    F: Fn(ClientSettings, WebStorageStateStore) -> Arc<dyn IdentityClient>,
{
    fn create(
        &self,
        settings: ClientSettings,
        store: WebStorageStateStore,
    ) -> Arc<dyn IdentityClient> {
        self(settings, store)
    }
}
