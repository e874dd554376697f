//! Accessors descendants use to reach the provider.

use crate::client::IdentityClient;
use crate::error::{OidcError, OidcResult};
use crate::provider::ProviderInner;
use crate::state::AuthState;
use crate::types::{SigninRedirectArgs, SigninSilentArgs, SignoutRedirectArgs};
use async_trait::async_trait;
use futures_signals::signal::MutableSignalCloned;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Operations exposed next to the auth state.
#[async_trait]
pub trait AuthOperations: Send + Sync {
    /// Starts an interactive sign-in. Failures go to the caller only.
    async fn login_with_redirect(&self, args: SigninRedirectArgs) -> OidcResult<()>;

    /// Signs in without interaction. The outcome, success or failure, lands in state.
    async fn login_silent(&self, args: SigninSilentArgs);

    /// Returns the current access token, renewing it first when it is about to expire.
    ///
    /// Fails with [`OidcError::NotAuthenticated`] without a session. Neither that
    /// nor a renewal failure is written to state.
    async fn get_access_token_silently(&self, args: SigninSilentArgs) -> OidcResult<String>;

    async fn logout(&self, args: SignoutRedirectArgs) -> OidcResult<()>;
}

/// Auth state snapshot together with the operations of the provider that produced it.
#[derive(Clone)]
pub struct Auth {
    state: AuthState,
    operations: Arc<dyn AuthOperations>,
}

impl Auth {
    pub fn new(state: AuthState, operations: Arc<dyn AuthOperations>) -> Self {
        Self { state, operations }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn operations(&self) -> &Arc<dyn AuthOperations> {
        &self.operations
    }

    /// Same state, different operations.
    pub fn with_operations(self, operations: Arc<dyn AuthOperations>) -> Self {
        Self {
            state: self.state,
            operations,
        }
    }

    pub async fn login_with_redirect(&self, args: SigninRedirectArgs) -> OidcResult<()> {
        self.operations.login_with_redirect(args).await
    }

    pub async fn login_silent(&self, args: SigninSilentArgs) {
        self.operations.login_silent(args).await
    }

    pub async fn get_access_token_silently(&self, args: SigninSilentArgs) -> OidcResult<String> {
        self.operations.get_access_token_silently(args).await
    }

    pub async fn logout(&self, args: SignoutRedirectArgs) -> OidcResult<()> {
        self.operations.logout(args).await
    }
}

impl Deref for Auth {
    type Target = AuthState;

    fn deref(&self) -> &AuthState {
        &self.state
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Auth").field("state", &self.state).finish()
    }
}

/// Handle to the provider a component is rendered under.
///
/// A default context is bound to nothing, so every accessor fails with
/// [`OidcError::OutsideProvider`], as it does once the provider is unmounted.
#[derive(Clone, Default)]
pub struct AuthContext {
    provider: Option<Arc<ProviderInner>>,
}

impl AuthContext {
    pub(crate) fn bound(provider: Arc<ProviderInner>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    fn provider(&self, accessor: &str) -> OidcResult<&Arc<ProviderInner>> {
        match &self.provider {
            Some(provider) if provider.is_active() => Ok(provider),
            _ => Err(OidcError::outside_provider(accessor)),
        }
    }

    /// Whether a mounted provider backs this context.
    pub fn is_active(&self) -> bool {
        self.provider.as_ref().is_some_and(|p| p.is_active())
    }

    /// Current state and operations. The identity client is not reachable from here.
    pub fn use_auth(&self) -> OidcResult<Auth> {
        self.auth_for("use_auth")
    }

    pub(crate) fn auth_for(&self, accessor: &str) -> OidcResult<Auth> {
        let provider = self.provider(accessor)?;
        let operations: Arc<dyn AuthOperations> = Arc::clone(provider) as Arc<dyn AuthOperations>;
        Ok(Auth::new(provider.state(), operations))
    }

    /// The raw identity client, for what the operations do not cover.
    pub fn use_auth_client(&self) -> OidcResult<Arc<dyn IdentityClient>> {
        self.provider("use_auth_client").map(|p| p.client())
    }

    /// Signal of every state the provider publishes, starting with the current one.
    pub fn state_signal(&self) -> OidcResult<MutableSignalCloned<AuthState>> {
        self.provider("state_signal").map(|p| p.state_signal())
    }
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthContext")
            .field("active", &self.is_active())
            .finish()
    }
}
