//! The auth lifecycle coordinator.
//!
//! [`OidcProvider`] owns exactly one identity client and one reactive
//! [`AuthState`]. Mounting it runs the startup sequence once:
//!
//! 1. If the location carries an authorization response, the client consumes it
//!    and the redirect callback lands the application on its target path.
//! 2. The stored session is read from the client.
//! 3. `Initialize` (or `Error`) is dispatched to the reducer.
//!
//! Descendants reach state and operations through the [`AuthContext`] returned by
//! [`OidcProvider::context`].

use crate::action::AuthAction;
use crate::auth_params::location_has_auth_params;
use crate::client::{ClientFactory, IdentityClient};
use crate::config::ClientSettings;
use crate::context::{AuthContext, AuthOperations};
use crate::error::{OidcError, OidcResult};
use crate::events::{
    AccessTokenCallback, ProviderEvents, SilentRenewErrorCallback, TokenChangedCallback,
    UserLoadedCallback, default_redirect_callback,
};
use crate::platform::Platform;
use crate::reducer::reduce;
use crate::state::AuthState;
use crate::storage::{StorageType, WebStorageStateStore, token_storage_for_type};
use crate::types::{
    AppState, SigninRedirectArgs, SigninSilentArgs, SignoutRedirectArgs, Token, User,
    needs_renewal,
};
use async_trait::async_trait;
use bon::Builder;
use futures_signals::signal::{Mutable, MutableSignalCloned};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Configuration a provider is mounted with.
#[derive(Debug, Clone, Builder)]
pub struct OidcProviderProps {
    pub settings: ClientSettings,
    #[builder(default)]
    pub events: ProviderEvents,
    #[builder(default)]
    pub token_storage: StorageType,
}

/// Client subscriptions currently held on behalf of [`ProviderEvents`].
#[derive(Default)]
struct Subscriptions {
    expiring: Option<AccessTokenCallback>,
    expired: Option<AccessTokenCallback>,
    refresh_error: Option<SilentRenewErrorCallback>,
    /// The application hook and the wrapper registered for it.
    token_changed: Option<(TokenChangedCallback, UserLoadedCallback)>,
}

/// Swaps a registration when the desired callback is a different `Arc`.
fn resubscribe<F: ?Sized>(
    current: &mut Option<Arc<F>>,
    desired: Option<&Arc<F>>,
    add: impl FnOnce(Arc<F>),
    remove: impl FnOnce(&Arc<F>),
) {
    let unchanged = match (current.as_ref(), desired) {
        (Some(current), Some(desired)) => Arc::ptr_eq(current, desired),
        (None, None) => true,
        _ => false,
    };
    if unchanged {
        return;
    }

    if let Some(previous) = current.take() {
        remove(&previous);
    }
    if let Some(next) = desired {
        add(Arc::clone(next));
        *current = Some(Arc::clone(next));
    }
}

pub(crate) struct ProviderInner {
    client: Arc<dyn IdentityClient>,
    platform: Arc<dyn Platform>,
    state: Mutable<AuthState>,
    events: Mutex<ProviderEvents>,
    subscriptions: Mutex<Subscriptions>,
    active: AtomicBool,
    started: AtomicBool,
}

impl ProviderInner {
    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub(crate) fn state(&self) -> AuthState {
        self.state.get_cloned()
    }

    pub(crate) fn state_signal(&self) -> MutableSignalCloned<AuthState> {
        self.state.signal_cloned()
    }

    pub(crate) fn client(&self) -> Arc<dyn IdentityClient> {
        Arc::clone(&self.client)
    }

    fn dispatch(&self, action: AuthAction) {
        if !self.is_active() {
            debug!("Discarding {:?} dispatched after unmount", action);
            return;
        }

        let mut state = self.state.lock_mut();
        let next = reduce(&state, action);
        *state = next;
    }

    async fn start(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }

        info!(
            "Initializing OIDC session for client {}",
            self.client.settings().client_id
        );

        match self.initialize().await {
            Ok(session) => {
                debug!("Session initialized, authenticated: {}", session.is_some());
                self.dispatch(AuthAction::from_session(session.as_ref()));
            }
            Err(e) => {
                warn!("OIDC session initialization failed: {}", e);
                self.dispatch(AuthAction::Error(e));
            }
        }
    }

    async fn initialize(&self) -> OidcResult<Option<User>> {
        if location_has_auth_params(self.platform.as_ref()) {
            debug!("Authorization response in location, consuming redirect callback");
            let session = self.client.signin_redirect_callback().await?;
            self.on_redirect_callback(session.as_ref().and_then(|user| user.state.as_ref()))?;
        }

        self.client.get_user().await
    }

    fn on_redirect_callback(&self, app_state: Option<&AppState>) -> OidcResult<()> {
        let callback = self
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .on_redirect_callback
            .clone();

        match callback {
            Some(callback) => callback(app_state),
            None => default_redirect_callback(self.platform.as_ref(), app_state),
        }
    }

    fn lock_subscriptions(&self) -> MutexGuard<'_, Subscriptions> {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Brings client subscriptions in line with `events`.
    ///
    /// The caller holds the subscriptions lock, and `active` is only cleared
    /// under that lock, so nothing registered here can outlive an unmount.
    ///
    /// Returns the token hook when it was newly registered, so the caller can
    /// fire it for a session that already exists.
    fn sync_subscriptions(
        &self,
        subscriptions: &mut Subscriptions,
        events: &ProviderEvents,
    ) -> Option<TokenChangedCallback> {
        let client_events = self.client.events();

        resubscribe(
            &mut subscriptions.expiring,
            events.on_access_token_expiring.as_ref(),
            |cb| client_events.add_access_token_expiring(cb),
            |cb| client_events.remove_access_token_expiring(cb),
        );
        resubscribe(
            &mut subscriptions.expired,
            events.on_access_token_expired.as_ref(),
            |cb| client_events.add_access_token_expired(cb),
            |cb| client_events.remove_access_token_expired(cb),
        );
        resubscribe(
            &mut subscriptions.refresh_error,
            events.on_access_token_refresh_error.as_ref(),
            |cb| client_events.add_silent_renew_error(cb),
            |cb| client_events.remove_silent_renew_error(cb),
        );

        let unchanged = match (
            subscriptions.token_changed.as_ref(),
            events.on_access_token_changed.as_ref(),
        ) {
            (Some((current, _)), Some(desired)) => Arc::ptr_eq(current, desired),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return None;
        }

        if let Some((_, wrapper)) = subscriptions.token_changed.take() {
            client_events.remove_user_loaded(&wrapper);
        }

        let hook = events.on_access_token_changed.clone()?;
        let forward = Arc::clone(&hook);
        let wrapper: UserLoadedCallback = Arc::new(move |user: &User| forward(&Token::from(user)));
        client_events.add_user_loaded(Arc::clone(&wrapper));
        subscriptions.token_changed = Some((Arc::clone(&hook), wrapper));
        debug!("Subscribed access token hook to user loaded events");

        Some(hook)
    }

    async fn apply_events(&self) {
        let events = self
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let hook = {
            let mut subscriptions = self.lock_subscriptions();
            if !self.is_active() {
                return;
            }
            self.sync_subscriptions(&mut subscriptions, &events)
        };
        let Some(hook) = hook else {
            return;
        };

        match self.client.get_user().await {
            Ok(Some(user)) if self.is_active() => hook(&Token::from(&user)),
            Ok(_) => {}
            Err(e) => warn!("Could not read session for access token hook: {}", e),
        }
    }
}

#[async_trait]
impl AuthOperations for ProviderInner {
    async fn login_with_redirect(&self, args: SigninRedirectArgs) -> OidcResult<()> {
        self.client.signin_redirect(args).await
    }

    async fn login_silent(&self, args: SigninSilentArgs) {
        match self.client.signin_silent(args).await {
            Ok(session) => self.dispatch(AuthAction::from_session(session.as_ref())),
            Err(e) => {
                warn!("Silent login failed: {}", e);
                self.dispatch(AuthAction::Error(e));
            }
        }
    }

    async fn get_access_token_silently(&self, args: SigninSilentArgs) -> OidcResult<String> {
        let user = self
            .client
            .get_user()
            .await?
            .ok_or(OidcError::NotAuthenticated)?;

        let threshold = self
            .client
            .settings()
            .access_token_expiring_notification_time_in_seconds;
        if !needs_renewal(user.expires_in(), threshold) {
            return Ok(user.access_token);
        }

        debug!("Access token expires within {}s, renewing silently", threshold);
        let renewed = self
            .client
            .signin_silent(args)
            .await?
            .ok_or(OidcError::NotAuthenticated)?;
        Ok(renewed.access_token)
    }

    async fn logout(&self, args: SignoutRedirectArgs) -> OidcResult<()> {
        self.client.signout_redirect(args).await
    }
}

/// Owner of the identity client and the auth state it drives.
///
/// Dropping the provider unmounts it.
pub struct OidcProvider {
    inner: Arc<ProviderInner>,
}

impl OidcProvider {
    /// Validates the settings and creates the identity client.
    ///
    /// The factory is called exactly once; the client lives as long as the provider.
    pub fn new<F: ClientFactory>(
        props: OidcProviderProps,
        factory: F,
        platform: Arc<dyn Platform>,
    ) -> OidcResult<Self> {
        props.settings.validate()?;

        let storage = token_storage_for_type(&props.token_storage, platform.as_ref());
        let client = factory.create(props.settings, WebStorageStateStore::new(storage));
        info!(
            "Created identity client for {} at {}",
            client.settings().client_id,
            client.settings().authority
        );

        Ok(Self {
            inner: Arc::new(ProviderInner {
                client,
                platform,
                state: Mutable::new(AuthState::initial()),
                events: Mutex::new(props.events),
                subscriptions: Mutex::new(Subscriptions::default()),
                active: AtomicBool::new(true),
                started: AtomicBool::new(false),
            }),
        })
    }

    /// Subscribes the event hooks and runs the startup sequence.
    ///
    /// Safe to call on every render: the startup sequence only ever runs once
    /// and unchanged hooks keep their subscriptions.
    pub async fn mount(&self) {
        if !self.inner.is_active() {
            warn!("Ignoring mount of an unmounted OidcProvider");
            return;
        }

        self.inner.apply_events().await;
        self.inner.start().await;
    }

    /// Replaces the event hooks. Only hooks whose `Arc` changed are resubscribed.
    pub async fn set_events(&self, events: ProviderEvents) {
        *self
            .inner
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = events;
        self.inner.apply_events().await;
    }

    /// Drops every client subscription and detaches all contexts.
    ///
    /// Results of operations still in flight are discarded.
    pub fn unmount(&self) {
        let mut subscriptions = self.inner.lock_subscriptions();
        if !self.inner.active.swap(false, Ordering::SeqCst) {
            return;
        }

        self.inner
            .sync_subscriptions(&mut subscriptions, &ProviderEvents::default());
        info!("OidcProvider unmounted");
    }

    pub fn context(&self) -> AuthContext {
        AuthContext::bound(Arc::clone(&self.inner))
    }

    /// Current state snapshot.
    pub fn state(&self) -> AuthState {
        self.inner.state()
    }

    pub fn state_signal(&self) -> MutableSignalCloned<AuthState> {
        self.inner.state_signal()
    }
}

impl Drop for OidcProvider {
    fn drop(&mut self) {
        self.unmount();
    }
}
