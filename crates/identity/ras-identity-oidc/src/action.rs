//! Actions driving the auth state reducer.

use crate::error::OidcError;
use crate::types::{User, UserProfile};

#[derive(Debug, Clone, PartialEq)]
pub enum AuthAction {
    Initialize {
        is_authenticated: bool,
        user: Option<UserProfile>,
    },
    Error(OidcError),
}

impl AuthAction {
    /// Initialize from whatever session the client currently reports.
    pub fn from_session(session: Option<&User>) -> Self {
        Self::Initialize {
            is_authenticated: session.is_some(),
            user: session.map(|user| user.profile.clone()),
        }
    }
}
