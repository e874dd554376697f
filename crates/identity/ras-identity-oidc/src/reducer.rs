//! Pure auth state transitions.

use crate::action::AuthAction;
use crate::state::AuthState;

/// Applies `action` to `state`, returning the next state.
pub fn reduce(state: &AuthState, action: AuthAction) -> AuthState {
    match action {
        AuthAction::Initialize {
            is_authenticated,
            user,
        } => AuthState {
            is_authenticated,
            user,
            is_loading: false,
            error: None,
        },
        AuthAction::Error(error) => AuthState {
            error: Some(error),
            is_loading: false,
            ..state.clone()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OidcError;
    use crate::types::UserProfile;

    fn profile() -> UserProfile {
        UserProfile {
            sub: "user123".to_string(),
            iss: Some("https://example.com".to_string()),
            email: Some("test@example.com".to_string()),
            name: Some("Test User".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_initialize_authenticated() {
        let state = reduce(
            &AuthState::initial(),
            AuthAction::Initialize {
                is_authenticated: true,
                user: Some(profile()),
            },
        );

        assert_eq!(
            state,
            AuthState {
                error: None,
                is_authenticated: true,
                is_loading: false,
                user: Some(profile()),
            }
        );
    }

    #[test]
    fn test_initialize_unauthenticated() {
        let state = reduce(
            &AuthState::initial(),
            AuthAction::Initialize {
                is_authenticated: false,
                user: None,
            },
        );

        assert!(!state.is_authenticated);
        assert!(!state.is_loading);
        assert_eq!(state.user, None);
    }

    #[test]
    fn test_initialize_clears_previous_error() {
        let errored = AuthState {
            error: Some(OidcError::client("previous error")),
            is_loading: false,
            ..AuthState::initial()
        };

        let state = reduce(
            &errored,
            AuthAction::Initialize {
                is_authenticated: false,
                user: None,
            },
        );
        assert_eq!(state.error, None);
    }

    #[test]
    fn test_error_stops_loading() {
        let state = reduce(
            &AuthState::initial(),
            AuthAction::Error(OidcError::client("Test error")),
        );

        assert_eq!(state.error, Some(OidcError::client("Test error")));
        assert!(!state.is_loading);
        assert!(!state.is_authenticated);
    }

    #[test]
    fn test_error_preserves_session() {
        let authenticated = AuthState {
            error: None,
            is_authenticated: true,
            is_loading: false,
            user: Some(profile()),
        };

        let state = reduce(
            &authenticated,
            AuthAction::Error(OidcError::silent_renew("Token refresh failed")),
        );

        assert!(state.is_authenticated);
        assert_eq!(state.user, Some(profile()));
        assert_eq!(
            state.error,
            Some(OidcError::silent_renew("Token refresh failed"))
        );
    }

    #[test]
    fn test_error_replaces_previous_error() {
        let first = reduce(
            &AuthState::initial(),
            AuthAction::Error(OidcError::client("First error")),
        );
        let second = reduce(&first, AuthAction::Error(OidcError::client("Second error")));
        assert_eq!(second.error, Some(OidcError::client("Second error")));
    }

    #[test]
    fn test_input_state_is_untouched() {
        let original = AuthState::initial();
        let snapshot = original.clone();

        let _ = reduce(
            &original,
            AuthAction::Initialize {
                is_authenticated: true,
                user: Some(profile()),
            },
        );
        let _ = reduce(&original, AuthAction::Error(OidcError::client("boom")));

        assert_eq!(original, snapshot);
    }

    #[test]
    fn test_loading_never_returns() {
        let mut state = AuthState::initial();
        let actions = [
            AuthAction::Error(OidcError::client("a")),
            AuthAction::Initialize {
                is_authenticated: true,
                user: Some(profile()),
            },
            AuthAction::Error(OidcError::client("b")),
        ];
        for action in actions {
            state = reduce(&state, action);
            assert!(!state.is_loading);
        }
    }
}
