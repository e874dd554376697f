//! Session lifecycle events and the provider's callback hooks.

use crate::error::{OidcError, OidcResult};
use crate::platform::Platform;
use crate::types::{AppState, Token, User};
use bon::Builder;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

pub type AccessTokenCallback = Arc<dyn Fn() + Send + Sync>;
pub type SilentRenewErrorCallback = Arc<dyn Fn(&OidcError) + Send + Sync>;
pub type UserLoadedCallback = Arc<dyn Fn(&User) + Send + Sync>;
pub type TokenChangedCallback = Arc<dyn Fn(&Token) + Send + Sync>;
pub type RedirectCallback = Arc<dyn Fn(Option<&AppState>) -> OidcResult<()> + Send + Sync>;

struct Listeners<F: ?Sized> {
    entries: Mutex<Vec<Arc<F>>>,
}

impl<F: ?Sized> Default for Listeners<F> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }
}

impl<F: ?Sized> Listeners<F> {
    fn add(&self, callback: Arc<F>) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(callback);
    }

    fn remove(&self, callback: &Arc<F>) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(index) = entries.iter().position(|c| Arc::ptr_eq(c, callback)) {
            entries.remove(index);
        }
    }

    // Callbacks run outside the lock so they may (un)register listeners.
    fn snapshot(&self) -> Vec<Arc<F>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Observer registry an [`IdentityClient`](crate::IdentityClient) raises its events through.
///
/// Removal matches the exact `Arc` that was added.
#[derive(Default)]
pub struct ClientEvents {
    access_token_expiring: Listeners<dyn Fn() + Send + Sync>,
    access_token_expired: Listeners<dyn Fn() + Send + Sync>,
    silent_renew_error: Listeners<dyn Fn(&OidcError) + Send + Sync>,
    user_loaded: Listeners<dyn Fn(&User) + Send + Sync>,
}

impl ClientEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_access_token_expiring(&self, callback: AccessTokenCallback) {
        self.access_token_expiring.add(callback);
    }

    pub fn remove_access_token_expiring(&self, callback: &AccessTokenCallback) {
        self.access_token_expiring.remove(callback);
    }

    pub fn add_access_token_expired(&self, callback: AccessTokenCallback) {
        self.access_token_expired.add(callback);
    }

    pub fn remove_access_token_expired(&self, callback: &AccessTokenCallback) {
        self.access_token_expired.remove(callback);
    }

    pub fn add_silent_renew_error(&self, callback: SilentRenewErrorCallback) {
        self.silent_renew_error.add(callback);
    }

    pub fn remove_silent_renew_error(&self, callback: &SilentRenewErrorCallback) {
        self.silent_renew_error.remove(callback);
    }

    pub fn add_user_loaded(&self, callback: UserLoadedCallback) {
        self.user_loaded.add(callback);
    }

    pub fn remove_user_loaded(&self, callback: &UserLoadedCallback) {
        self.user_loaded.remove(callback);
    }

    pub fn raise_access_token_expiring(&self) {
        for callback in self.access_token_expiring.snapshot() {
            callback();
        }
    }

    pub fn raise_access_token_expired(&self) {
        for callback in self.access_token_expired.snapshot() {
            callback();
        }
    }

    pub fn raise_silent_renew_error(&self, error: &OidcError) {
        for callback in self.silent_renew_error.snapshot() {
            callback(error);
        }
    }

    pub fn raise_user_loaded(&self, user: &User) {
        for callback in self.user_loaded.snapshot() {
            callback(user);
        }
    }

    pub fn access_token_expiring_count(&self) -> usize {
        self.access_token_expiring.len()
    }

    pub fn access_token_expired_count(&self) -> usize {
        self.access_token_expired.len()
    }

    pub fn silent_renew_error_count(&self) -> usize {
        self.silent_renew_error.len()
    }

    pub fn user_loaded_count(&self) -> usize {
        self.user_loaded.len()
    }
}

impl fmt::Debug for ClientEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientEvents")
            .field("access_token_expiring", &self.access_token_expiring_count())
            .field("access_token_expired", &self.access_token_expired_count())
            .field("silent_renew_error", &self.silent_renew_error_count())
            .field("user_loaded", &self.user_loaded_count())
            .finish()
    }
}

/// Application hooks a provider forwards client events to.
///
/// Hooks are compared by `Arc` identity: handing the provider a clone of the
/// same `Arc` keeps the existing subscription.
#[derive(Clone, Default, Builder)]
pub struct ProviderEvents {
    /// Receives the token projection once for an existing session and after every
    /// login or renewal.
    pub on_access_token_changed: Option<TokenChangedCallback>,
    pub on_access_token_expiring: Option<AccessTokenCallback>,
    pub on_access_token_expired: Option<AccessTokenCallback>,
    pub on_access_token_refresh_error: Option<SilentRenewErrorCallback>,
    /// Replaces [`default_redirect_callback`] after an authorization response is consumed.
    pub on_redirect_callback: Option<RedirectCallback>,
}

impl fmt::Debug for ProviderEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderEvents")
            .field("on_access_token_changed", &self.on_access_token_changed.is_some())
            .field("on_access_token_expiring", &self.on_access_token_expiring.is_some())
            .field("on_access_token_expired", &self.on_access_token_expired.is_some())
            .field(
                "on_access_token_refresh_error",
                &self.on_access_token_refresh_error.is_some(),
            )
            .field("on_redirect_callback", &self.on_redirect_callback.is_some())
            .finish()
    }
}

/// Replaces the current history entry with `returnTo` from the app state, or the
/// current path. Either way the authorization response leaves the address bar.
pub fn default_redirect_callback(
    platform: &dyn Platform,
    app_state: Option<&AppState>,
) -> OidcResult<()> {
    let target = app_state
        .and_then(|state| state.get("returnTo"))
        .and_then(Value::as_str)
        .filter(|target| !target.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| platform.location_pathname());

    platform.replace_history_url(&target)
}
