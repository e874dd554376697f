//! Browser platform implementation using web-sys

use crate::{
    error::{OidcError, OidcResult},
    platform::Platform,
    storage::TokenStorage,
};
use std::sync::Arc;
use tracing::warn;
use wasm_bindgen::JsValue;

fn js_error(context: &str, value: JsValue) -> OidcError {
    OidcError::platform(format!("{}: {:?}", context, value))
}

fn window() -> OidcResult<web_sys::Window> {
    web_sys::window().ok_or_else(|| OidcError::platform("no global window"))
}

/// Which of the browser's storages a [`WebStorage`] resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebStorageArea {
    Local,
    Session,
}

/// `TokenStorage` over `window.localStorage` or `window.sessionStorage`.
///
/// The browser storage is looked up on each call, so the handle itself holds no
/// JS objects and can be shared freely.
#[derive(Debug, Clone, Copy)]
pub struct WebStorage {
    area: WebStorageArea,
}

impl WebStorage {
    pub fn new(area: WebStorageArea) -> Self {
        Self { area }
    }

    fn storage(&self) -> OidcResult<web_sys::Storage> {
        let window = window()?;
        let storage = match self.area {
            WebStorageArea::Local => window.local_storage(),
            WebStorageArea::Session => window.session_storage(),
        }
        .map_err(|e| js_error("storage unavailable", e))?;
        storage.ok_or_else(|| OidcError::Storage(format!("{:?} storage is disabled", self.area)))
    }
}

impl TokenStorage for WebStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.storage()
            .and_then(|s| s.get_item(key).map_err(|e| js_error("getItem", e)))
            .unwrap_or_else(|e| {
                warn!("Failed to read {} from web storage: {}", key, e);
                None
            })
    }

    fn set_item(&self, key: &str, value: &str) {
        if let Err(e) = self
            .storage()
            .and_then(|s| s.set_item(key, value).map_err(|e| js_error("setItem", e)))
        {
            warn!("Failed to write {} to web storage: {}", key, e);
        }
    }

    fn remove_item(&self, key: &str) {
        if let Err(e) = self
            .storage()
            .and_then(|s| s.remove_item(key).map_err(|e| js_error("removeItem", e)))
        {
            warn!("Failed to remove {} from web storage: {}", key, e);
        }
    }

    fn clear(&self) {
        if let Err(e) = self
            .storage()
            .and_then(|s| s.clear().map_err(|e| js_error("clear", e)))
        {
            warn!("Failed to clear web storage: {}", e);
        }
    }

    fn key(&self, index: usize) -> Option<String> {
        let index = u32::try_from(index).ok()?;
        self.storage()
            .and_then(|s| s.key(index).map_err(|e| js_error("key", e)))
            .unwrap_or(None)
    }

    fn len(&self) -> usize {
        self.storage()
            .and_then(|s| s.length().map_err(|e| js_error("length", e)))
            .map(|len| len as usize)
            .unwrap_or(0)
    }
}

/// The browser `window` as a [`Platform`].
#[derive(Debug, Default, Clone, Copy)]
pub struct WebPlatform;

impl WebPlatform {
    pub fn new() -> Self {
        Self
    }
}

impl Platform for WebPlatform {
    fn location_search(&self) -> String {
        window()
            .and_then(|w| w.location().search().map_err(|e| js_error("location.search", e)))
            .unwrap_or_default()
    }

    fn location_pathname(&self) -> String {
        window()
            .and_then(|w| {
                w.location()
                    .pathname()
                    .map_err(|e| js_error("location.pathname", e))
            })
            .unwrap_or_else(|_| "/".to_string())
    }

    fn replace_history_url(&self, url: &str) -> OidcResult<()> {
        let window = window()?;
        let title = window.document().map(|d| d.title()).unwrap_or_default();
        let history = window.history().map_err(|e| js_error("history", e))?;
        history
            .replace_state_with_url(&JsValue::NULL, &title, Some(url))
            .map_err(|e| js_error("history.replaceState", e))
    }

    fn local_storage(&self) -> Arc<dyn TokenStorage> {
        Arc::new(WebStorage::new(WebStorageArea::Local))
    }

    fn session_storage(&self) -> Arc<dyn TokenStorage> {
        Arc::new(WebStorage::new(WebStorageArea::Session))
    }
}
