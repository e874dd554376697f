//! Authentication state observed by consumers of the provider.

use crate::error::OidcError;
use crate::types::UserProfile;

/// Snapshot of the end user's authentication standing.
///
/// `is_loading` is only true before the first initialize or error transition.
/// `error` and the user fields are independent: an error keeps a previously
/// authenticated user, and a successful initialize clears the error.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub error: Option<OidcError>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub user: Option<UserProfile>,
}

impl AuthState {
    /// State of a provider that has not finished its startup sequence.
    pub fn initial() -> Self {
        Self {
            error: None,
            is_authenticated: false,
            is_loading: true,
            user: None,
        }
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self::initial()
    }
}
