//! Session and request types exchanged with the identity client.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Application state carried through the authorization round trip.
///
/// The coordinator only ever reads the `returnTo` member.
pub type AppState = Value;

/// Identity claims of the signed-in user.
///
/// Standard claims get their own fields; everything else the provider returns
/// lands in `claims`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// String or array of strings, as issued.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub claims: HashMap<String, Value>,
}

/// Session record held by the identity client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub token_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    pub profile: UserProfile,
    /// Absolute expiry in epoch seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<AppState>,
}

impl User {
    /// Seconds until the access token expires, negative once it has expired.
    pub fn expires_in(&self) -> Option<i64> {
        self.expires_at
            .map(|expires_at| expires_at - Utc::now().timestamp())
    }

    pub fn expired(&self) -> Option<bool> {
        self.expires_in().map(|remaining| remaining <= 0)
    }
}

/// Token snapshot handed to the access-token-changed hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    /// Empty when the session carries no ID token.
    pub id_token: String,
    pub refresh_token: Option<String>,
    /// Absolute expiry in epoch seconds, `0` when unknown.
    pub expires_at: i64,
    pub token_type: String,
    pub scope: String,
}

impl From<&User> for Token {
    fn from(user: &User) -> Self {
        Self {
            access_token: user.access_token.clone(),
            id_token: user.id_token.clone().unwrap_or_default(),
            refresh_token: user.refresh_token.clone(),
            expires_at: user.expires_at.unwrap_or(0),
            token_type: user.token_type.clone(),
            scope: user.scope.clone().unwrap_or_default(),
        }
    }
}

/// Arguments for a full-page authorization redirect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SigninRedirectArgs {
    pub state: Option<AppState>,
    pub redirect_uri: Option<String>,
    pub scope: Option<String>,
    #[serde(default)]
    pub extra_query_params: BTreeMap<String, String>,
}

/// Arguments for a background (no navigation) sign-in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SigninSilentArgs {
    pub state: Option<AppState>,
    pub scope: Option<String>,
    #[serde(default)]
    pub extra_query_params: BTreeMap<String, String>,
}

/// Arguments for a redirect to the provider's end-session endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignoutRedirectArgs {
    pub id_token_hint: Option<String>,
    pub post_logout_redirect_uri: Option<String>,
    pub state: Option<AppState>,
    #[serde(default)]
    pub extra_query_params: BTreeMap<String, String>,
}

/// Whether a token with `expires_in` seconds left must be renewed.
///
/// Unknown expiry always renews. A token exactly at the threshold renews.
pub fn needs_renewal(expires_in: Option<i64>, threshold_secs: u64) -> bool {
    match expires_in {
        None => true,
        Some(remaining) => remaining <= i64::try_from(threshold_secs).unwrap_or(i64::MAX),
    }
}
