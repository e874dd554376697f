//! Token storage backends and their selection.

use crate::platform::Platform;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// String-keyed storage capability used to persist the client's session record.
pub trait TokenStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;

    fn set_item(&self, key: &str, value: &str);

    fn remove_item(&self, key: &str);

    fn clear(&self);

    /// Name of the `index`th key, if any.
    fn key(&self, index: usize) -> Option<String>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Non-persistent storage that lives as long as its owner.
#[derive(Debug, Default)]
pub struct InMemoryWebStorage {
    items: RwLock<BTreeMap<String, String>>,
}

impl InMemoryWebStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStorage for InMemoryWebStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        items.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        items.insert(key.to_string(), value.to_string());
    }

    fn remove_item(&self, key: &str) {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        items.remove(key);
    }

    fn clear(&self) {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        items.clear();
    }

    fn key(&self, index: usize) -> Option<String> {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        items.keys().nth(index).cloned()
    }

    fn len(&self) -> usize {
        self.items.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Symbolic storage kinds, as they appear in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageKind {
    #[serde(rename = "localStorage")]
    Local,
    #[serde(rename = "sessionStorage")]
    Session,
    #[serde(rename = "memoryStorage")]
    Memory,
}

/// Where the identity client keeps its session record.
#[derive(Clone, Default)]
pub enum StorageType {
    LocalStorage,
    #[default]
    SessionStorage,
    MemoryStorage,
    Custom(Arc<dyn TokenStorage>),
}

impl From<StorageKind> for StorageType {
    fn from(kind: StorageKind) -> Self {
        match kind {
            StorageKind::Local => Self::LocalStorage,
            StorageKind::Session => Self::SessionStorage,
            StorageKind::Memory => Self::MemoryStorage,
        }
    }
}

impl fmt::Debug for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LocalStorage => write!(f, "LocalStorage"),
            Self::SessionStorage => write!(f, "SessionStorage"),
            Self::MemoryStorage => write!(f, "MemoryStorage"),
            Self::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

impl<'de> Deserialize<'de> for StorageType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        StorageKind::deserialize(deserializer).map(Self::from)
    }
}

/// Resolves a storage type to a concrete backend.
///
/// Local and session storage come from the platform. Memory storage is a fresh,
/// independent store on every call. Custom backends pass through unchanged.
pub fn token_storage_for_type(
    storage_type: &StorageType,
    platform: &dyn Platform,
) -> Arc<dyn TokenStorage> {
    match storage_type {
        StorageType::LocalStorage => platform.local_storage(),
        StorageType::SessionStorage => platform.session_storage(),
        StorageType::MemoryStorage => Arc::new(InMemoryWebStorage::new()),
        StorageType::Custom(storage) => Arc::clone(storage),
    }
}

/// Prefixed key-value adapter the identity client persists its user record through.
#[derive(Clone)]
pub struct WebStorageStateStore {
    prefix: String,
    store: Arc<dyn TokenStorage>,
}

impl WebStorageStateStore {
    pub const DEFAULT_PREFIX: &'static str = "oidc.";

    pub fn new(store: Arc<dyn TokenStorage>) -> Self {
        Self::with_prefix(store, Self::DEFAULT_PREFIX)
    }

    pub fn with_prefix(store: Arc<dyn TokenStorage>, prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            store,
        }
    }

    pub fn set(&self, key: &str, value: &str) {
        self.store.set_item(&self.prefixed(key), value);
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.store.get_item(&self.prefixed(key))
    }

    /// Removes the entry and returns its previous value.
    pub fn remove(&self, key: &str) -> Option<String> {
        let key = self.prefixed(key);
        let previous = self.store.get_item(&key);
        self.store.remove_item(&key);
        previous
    }

    /// Keys owned by this store, without the prefix.
    pub fn get_all_keys(&self) -> Vec<String> {
        (0..self.store.len())
            .filter_map(|index| self.store.key(index))
            .filter_map(|key| key.strip_prefix(&self.prefix).map(str::to_string))
            .collect()
    }

    pub fn storage(&self) -> &Arc<dyn TokenStorage> {
        &self.store
    }

    fn prefixed(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

impl fmt::Debug for WebStorageStateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebStorageStateStore")
            .field("prefix", &self.prefix)
            .field("entries", &self.store.len())
            .finish()
    }
}
