//! OpenID Connect session coordinator with reactive auth state.
//!
//! This crate sits between an application and an OpenID Connect client that does
//! the protocol work (token exchange, PKCE, validation). [`OidcProvider`] owns one
//! [`IdentityClient`], consumes authorization responses, keeps a reactive
//! [`AuthState`] in step with the client's session and forwards session events
//! to application hooks. Presets for Auth0, Amazon Cognito and Azure AD B2C live
//! in [`hosted`], and [`with_authentication_required`] gates content behind a
//! signed-in user.

mod action;
mod auth_params;
mod client;
mod config;
mod context;
mod error;
mod events;
mod guard;
mod platform;
mod provider;
mod reducer;
mod scope;
mod state;
mod storage;
mod types;

pub mod hosted;

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub mod wasm;

pub use action::AuthAction;
pub use auth_params::{has_auth_params, location_has_auth_params};
pub use client::{ClientFactory, IdentityClient};
pub use config::{ClientSettings, Extensions, ProviderMetadata, ProviderOptions};
pub use context::{Auth, AuthContext, AuthOperations};
pub use error::{OidcError, OidcResult};
pub use events::{
    AccessTokenCallback, ClientEvents, ProviderEvents, RedirectCallback,
    SilentRenewErrorCallback, TokenChangedCallback, UserLoadedCallback,
    default_redirect_callback,
};
pub use guard::{
    AuthenticationRequired, ErrorViewFn, LoginParamsFn, Rendered, ViewFn,
    WithAuthenticationRequiredOptions, with_authentication_required,
};
pub use hosted::{
    Auth0Provider, AzureB2cProvider, CognitoProvider, HostedProvider, use_auth0, use_azure,
    use_cognito,
};
pub use platform::{InMemoryPlatform, Platform};
pub use provider::{OidcProvider, OidcProviderProps};
pub use reducer::reduce;
pub use scope::unique_scopes;
pub use state::AuthState;
pub use storage::{
    InMemoryWebStorage, StorageKind, StorageType, TokenStorage, WebStorageStateStore,
    token_storage_for_type,
};
pub use types::{
    AppState, SigninRedirectArgs, SigninSilentArgs, SignoutRedirectArgs, Token, User,
    UserProfile, needs_renewal,
};
