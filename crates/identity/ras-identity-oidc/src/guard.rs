//! Gate that only renders its component for an authenticated user.
//!
//! The guard is framework-agnostic: rendering produces a view value plus an
//! optional effect future the host schedules on its executor. The effect is the
//! login redirect, and the guard emits it at most once per transition into the
//! "settled and unauthenticated" state.

use crate::context::{Auth, AuthContext};
use crate::error::{OidcError, OidcResult};
use crate::types::SigninRedirectArgs;
use bon::Builder;
use futures::future::BoxFuture;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

pub type LoginParamsFn = Arc<dyn Fn() -> SigninRedirectArgs + Send + Sync>;
pub type ViewFn<V> = Arc<dyn Fn() -> V + Send + Sync>;
pub type ErrorViewFn<V> = Arc<dyn Fn(&OidcError) -> V + Send + Sync>;

/// Views and login parameters for [`with_authentication_required`].
///
/// Without overrides the initializing and redirecting views are `V::default()`
/// and the error view is the error message converted into `V`.
#[derive(Builder)]
pub struct WithAuthenticationRequiredOptions<V> {
    /// Computes the sign-in arguments each time a login is triggered.
    pub login_with_redirect_params: Option<LoginParamsFn>,
    pub on_initializing: Option<ViewFn<V>>,
    pub on_redirecting: Option<ViewFn<V>>,
    pub on_error: Option<ErrorViewFn<V>>,
}

impl<V> Default for WithAuthenticationRequiredOptions<V> {
    fn default() -> Self {
        Self {
            login_with_redirect_params: None,
            on_initializing: None,
            on_redirecting: None,
            on_error: None,
        }
    }
}

impl<V> Clone for WithAuthenticationRequiredOptions<V> {
    fn clone(&self) -> Self {
        Self {
            login_with_redirect_params: self.login_with_redirect_params.clone(),
            on_initializing: self.on_initializing.clone(),
            on_redirecting: self.on_redirecting.clone(),
            on_error: self.on_error.clone(),
        }
    }
}

/// Output of one guarded render.
pub struct Rendered<V> {
    pub view: V,
    /// Login redirect to run. Dropping it without polling skips the login.
    pub effect: Option<BoxFuture<'static, ()>>,
}

impl<V: fmt::Debug> fmt::Debug for Rendered<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rendered")
            .field("view", &self.view)
            .field("effect", &self.effect.is_some())
            .finish()
    }
}

#[derive(Debug, Default)]
struct RedirectTracker {
    /// A login redirect is running.
    in_progress: bool,
    /// A login was already triggered for the current unauthenticated stretch.
    requested: bool,
}

/// Clears the in-progress flag once the login settles, however it settles.
struct RedirectSettled(Arc<Mutex<RedirectTracker>>);

impl Drop for RedirectSettled {
    fn drop(&mut self) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .in_progress = false;
    }
}

/// A component wrapped by [`with_authentication_required`].
pub struct AuthenticationRequired<C, V> {
    component: C,
    options: WithAuthenticationRequiredOptions<V>,
    redirect: Arc<Mutex<RedirectTracker>>,
}

/// Wraps `component` so it only renders for an authenticated user.
///
/// Renders, in order of precedence: the initializing view while the provider
/// starts, the redirecting view while a login redirect runs, the error view when
/// state carries an error, the component when authenticated, and otherwise
/// `V::default()` while triggering a login.
pub fn with_authentication_required<C, V>(
    component: C,
    options: WithAuthenticationRequiredOptions<V>,
) -> AuthenticationRequired<C, V> {
    AuthenticationRequired {
        component,
        options,
        redirect: Arc::new(Mutex::new(RedirectTracker::default())),
    }
}

impl<C, V> AuthenticationRequired<C, V>
where
    V: Default + From<String>,
{
    pub fn render<P>(&self, ctx: &AuthContext, props: &P) -> OidcResult<Rendered<V>>
    where
        C: Fn(&P) -> V,
    {
        let auth = ctx.use_auth()?;
        Ok(self.render_with(&auth, props))
    }

    /// Renders against an already resolved [`Auth`].
    pub fn render_with<P>(&self, auth: &Auth, props: &P) -> Rendered<V>
    where
        C: Fn(&P) -> V,
    {
        let settled_unauthenticated =
            !auth.is_loading && !auth.is_authenticated && auth.error.is_none();

        let (redirecting, trigger_login) = {
            let mut tracker = self.redirect.lock().unwrap_or_else(PoisonError::into_inner);
            let redirecting = tracker.in_progress;
            let trigger = settled_unauthenticated && !tracker.in_progress && !tracker.requested;

            if !settled_unauthenticated {
                tracker.requested = false;
            }
            if trigger {
                tracker.requested = true;
                tracker.in_progress = true;
            }
            (redirecting, trigger)
        };

        let view = self.view(auth, redirecting, props);
        let effect = trigger_login.then(|| self.login(auth));

        Rendered { view, effect }
    }

    fn view<P>(&self, auth: &Auth, redirecting: bool, props: &P) -> V
    where
        C: Fn(&P) -> V,
    {
        if auth.is_loading {
            return self
                .options
                .on_initializing
                .as_ref()
                .map(|view| view())
                .unwrap_or_default();
        }

        if redirecting {
            return self
                .options
                .on_redirecting
                .as_ref()
                .map(|view| view())
                .unwrap_or_default();
        }

        if let Some(error) = &auth.error {
            return match &self.options.on_error {
                Some(view) => view(error),
                None => V::from(error.to_string()),
            };
        }

        if auth.is_authenticated {
            (self.component)(props)
        } else {
            V::default()
        }
    }

    fn login(&self, auth: &Auth) -> BoxFuture<'static, ()> {
        let operations = Arc::clone(auth.operations());
        let args = self
            .options
            .login_with_redirect_params
            .as_ref()
            .map(|params| params())
            .unwrap_or_default();
        let settled = RedirectSettled(Arc::clone(&self.redirect));

        debug!("Unauthenticated, redirecting to login");
        Box::pin(async move {
            let _settled = settled;
            if let Err(e) = operations.login_with_redirect(args).await {
                warn!("Login redirect failed: {}", e);
            }
        })
    }
}
