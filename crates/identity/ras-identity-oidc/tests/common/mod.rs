//! Shared fixtures for the coordinator integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use ras_identity_oidc::{
    ClientEvents, ClientSettings, IdentityClient, OidcError, OidcResult, SigninRedirectArgs,
    SigninSilentArgs, SignoutRedirectArgs, User, UserProfile, WebStorageStateStore,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("ras_identity_oidc=debug")
        .with_test_writer()
        .try_init();
}

pub fn settings() -> ClientSettings {
    ClientSettings::builder()
        .authority("https://auth.example.com")
        .client_id("test-client")
        .redirect_uri("http://localhost:3000/callback")
        .build()
}

pub fn profile(sub: &str) -> UserProfile {
    UserProfile {
        sub: sub.to_string(),
        iss: Some("https://auth.example.com".to_string()),
        email: Some(format!("{}@example.com", sub)),
        name: Some("Test User".to_string()),
        ..Default::default()
    }
}

/// A session whose access token expires `expires_in` seconds from now.
pub fn user(sub: &str, access_token: &str, expires_in: Option<i64>) -> User {
    User {
        id_token: Some(format!("id-{}", access_token)),
        access_token: access_token.to_string(),
        refresh_token: Some("refresh".to_string()),
        token_type: "Bearer".to_string(),
        scope: Some("openid profile email".to_string()),
        profile: profile(sub),
        expires_at: expires_in.map(|secs| Utc::now().timestamp() + secs),
        session_state: None,
        state: None,
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap()
}

/// Scriptable identity client that records every call.
pub struct MockIdentityClient {
    settings: ClientSettings,
    events: ClientEvents,
    pub store: WebStorageStateStore,

    pub user: Mutex<Option<User>>,
    pub callback_user: Mutex<Option<User>>,
    pub silent_user: Mutex<Option<User>>,

    pub get_user_error: Mutex<Option<OidcError>>,
    pub callback_error: Mutex<Option<OidcError>>,
    pub silent_error: Mutex<Option<OidcError>>,
    pub redirect_error: Mutex<Option<OidcError>>,
    pub signout_error: Mutex<Option<OidcError>>,

    pub get_user_calls: AtomicUsize,
    pub signin_silent_calls: AtomicUsize,
    pub redirect_callback_calls: AtomicUsize,

    pub redirect_args: Mutex<Vec<SigninRedirectArgs>>,
    pub silent_args: Mutex<Vec<SigninSilentArgs>>,
    pub signout_args: Mutex<Vec<SignoutRedirectArgs>>,
}

impl MockIdentityClient {
    pub fn new(settings: ClientSettings, store: WebStorageStateStore) -> Self {
        Self {
            settings,
            events: ClientEvents::new(),
            store,
            user: Mutex::new(None),
            callback_user: Mutex::new(None),
            silent_user: Mutex::new(None),
            get_user_error: Mutex::new(None),
            callback_error: Mutex::new(None),
            silent_error: Mutex::new(None),
            redirect_error: Mutex::new(None),
            signout_error: Mutex::new(None),
            get_user_calls: AtomicUsize::new(0),
            signin_silent_calls: AtomicUsize::new(0),
            redirect_callback_calls: AtomicUsize::new(0),
            redirect_args: Mutex::new(Vec::new()),
            silent_args: Mutex::new(Vec::new()),
            signout_args: Mutex::new(Vec::new()),
        }
    }

    pub fn set_user(&self, user: Option<User>) {
        *lock(&self.user) = user;
    }

    pub fn set_callback_user(&self, user: Option<User>) {
        *lock(&self.callback_user) = user;
    }

    pub fn set_silent_user(&self, user: Option<User>) {
        *lock(&self.silent_user) = user;
    }

    pub fn fail_get_user(&self, error: OidcError) {
        *lock(&self.get_user_error) = Some(error);
    }

    pub fn fail_callback(&self, error: OidcError) {
        *lock(&self.callback_error) = Some(error);
    }

    pub fn fail_silent(&self, error: OidcError) {
        *lock(&self.silent_error) = Some(error);
    }

    pub fn fail_redirect(&self, error: OidcError) {
        *lock(&self.redirect_error) = Some(error);
    }

    pub fn fail_signout(&self, error: OidcError) {
        *lock(&self.signout_error) = Some(error);
    }

    pub fn redirect_calls(&self) -> Vec<SigninRedirectArgs> {
        lock(&self.redirect_args).clone()
    }

    pub fn silent_calls(&self) -> Vec<SigninSilentArgs> {
        lock(&self.silent_args).clone()
    }

    pub fn signout_calls(&self) -> Vec<SignoutRedirectArgs> {
        lock(&self.signout_args).clone()
    }

    pub fn get_user_count(&self) -> usize {
        self.get_user_calls.load(Ordering::SeqCst)
    }

    pub fn signin_silent_count(&self) -> usize {
        self.signin_silent_calls.load(Ordering::SeqCst)
    }

    pub fn redirect_callback_count(&self) -> usize {
        self.redirect_callback_calls.load(Ordering::SeqCst)
    }

    fn store_user(&self, user: &User) {
        let key = format!("user:{}", self.settings.client_id);
        if let Ok(json) = serde_json::to_string(user) {
            self.store.set(&key, &json);
        }
        *lock(&self.user) = Some(user.clone());
        self.events.raise_user_loaded(user);
    }
}

#[async_trait]
impl IdentityClient for MockIdentityClient {
    fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    fn events(&self) -> &ClientEvents {
        &self.events
    }

    async fn signin_redirect(&self, args: SigninRedirectArgs) -> OidcResult<()> {
        lock(&self.redirect_args).push(args);
        match lock(&self.redirect_error).clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn signin_silent(&self, args: SigninSilentArgs) -> OidcResult<Option<User>> {
        self.signin_silent_calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.silent_args).push(args);
        if let Some(error) = lock(&self.silent_error).clone() {
            self.events.raise_silent_renew_error(&error);
            return Err(error);
        }

        let user = lock(&self.silent_user).clone();
        if let Some(user) = &user {
            self.store_user(user);
        }
        Ok(user)
    }

    async fn signin_redirect_callback(&self) -> OidcResult<Option<User>> {
        self.redirect_callback_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = lock(&self.callback_error).clone() {
            return Err(error);
        }

        let user = lock(&self.callback_user).clone();
        if let Some(user) = &user {
            self.store_user(user);
        }
        Ok(user)
    }

    async fn signout_redirect(&self, args: SignoutRedirectArgs) -> OidcResult<()> {
        lock(&self.signout_args).push(args);
        match lock(&self.signout_error).clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn get_user(&self) -> OidcResult<Option<User>> {
        self.get_user_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = lock(&self.get_user_error).clone() {
            return Err(error);
        }
        Ok(lock(&self.user).clone())
    }
}

/// Factory that keeps a handle to the client it creates.
#[derive(Clone, Default)]
pub struct MockFactory {
    created: Arc<Mutex<Vec<Arc<MockIdentityClient>>>>,
}

impl MockFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn factory(
        &self,
    ) -> impl Fn(ClientSettings, WebStorageStateStore) -> Arc<dyn IdentityClient> {
        let created = Arc::clone(&self.created);
        move |settings: ClientSettings, store: WebStorageStateStore| -> Arc<dyn IdentityClient> {
            let client = Arc::new(MockIdentityClient::new(settings, store));
            lock(&created).push(Arc::clone(&client));
            client
        }
    }

    pub fn created_count(&self) -> usize {
        lock(&self.created).len()
    }

    /// The most recently created client.
    pub fn client(&self) -> Arc<MockIdentityClient> {
        lock(&self.created)
            .last()
            .cloned()
            .expect("no identity client was created")
    }
}
