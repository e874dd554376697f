//! Ambient navigation and storage context the coordinator runs in.

use crate::error::OidcResult;
use crate::storage::{InMemoryWebStorage, TokenStorage};
use std::sync::{Arc, Mutex, PoisonError};

/// The host environment: current location, history and the persistent storages.
///
/// In the browser this is `window`; native hosts and tests use [`InMemoryPlatform`].
pub trait Platform: Send + Sync {
    /// Query string of the current location, including the leading `?`.
    fn location_search(&self) -> String;

    fn location_pathname(&self) -> String;

    /// Replaces the current history entry without creating a new one.
    fn replace_history_url(&self, url: &str) -> OidcResult<()>;

    fn local_storage(&self) -> Arc<dyn TokenStorage>;

    fn session_storage(&self) -> Arc<dyn TokenStorage>;
}

#[derive(Debug, Default)]
struct Location {
    pathname: String,
    search: String,
}

/// Platform backed by process memory.
///
/// Its local and session storages are stable for the lifetime of the platform, so
/// repeated lookups return the same backend, as they would in a browser tab.
#[derive(Debug)]
pub struct InMemoryPlatform {
    location: Mutex<Location>,
    history: Mutex<Vec<String>>,
    local: Arc<InMemoryWebStorage>,
    session: Arc<InMemoryWebStorage>,
}

impl InMemoryPlatform {
    pub fn new(pathname: impl Into<String>) -> Self {
        Self {
            location: Mutex::new(Location {
                pathname: pathname.into(),
                search: String::new(),
            }),
            history: Mutex::new(Vec::new()),
            local: Arc::new(InMemoryWebStorage::new()),
            session: Arc::new(InMemoryWebStorage::new()),
        }
    }

    pub fn with_search(self, search: impl Into<String>) -> Self {
        self.set_search(search);
        self
    }

    pub fn set_search(&self, search: impl Into<String>) {
        self.location
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .search = search.into();
    }

    /// URLs passed to [`Platform::replace_history_url`], oldest first.
    pub fn replaced_urls(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for InMemoryPlatform {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Platform for InMemoryPlatform {
    fn location_search(&self) -> String {
        self.location
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .search
            .clone()
    }

    fn location_pathname(&self) -> String {
        self.location
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pathname
            .clone()
    }

    fn replace_history_url(&self, url: &str) -> OidcResult<()> {
        let (path, search) = match url.split_once('?') {
            Some((path, query)) => (path.to_string(), format!("?{}", query)),
            None => (url.to_string(), String::new()),
        };

        {
            let mut location = self.location.lock().unwrap_or_else(PoisonError::into_inner);
            location.pathname = path;
            location.search = search;
        }

        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_string());
        Ok(())
    }

    fn local_storage(&self) -> Arc<dyn TokenStorage> {
        self.local.clone()
    }

    fn session_storage(&self) -> Arc<dyn TokenStorage> {
        self.session.clone()
    }
}
