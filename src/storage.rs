// Durable client-side key-value storage
// Models the browser's localStorage: string keys, string values, synchronous

use std::collections::HashMap;
use std::sync::RwLock;

/// Storage key for the access credential
pub const TOKEN_KEY: &str = "token";

/// Storage key for the refresh credential
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Storage key for the JSON-serialized identity
pub const USER_KEY: &str = "user";

/// Persistent key-value storage shared by the transport and the auth service
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory storage used in tests and non-browser hosts
#[derive(Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.write().unwrap().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get(TOKEN_KEY), None);

        storage.set(TOKEN_KEY, "abc");
        assert_eq!(storage.get(TOKEN_KEY), Some("abc".to_string()));

        storage.remove(TOKEN_KEY);
        assert_eq!(storage.get(TOKEN_KEY), None);
    }

    #[test]
    fn test_overwrite() {
        let storage = MemoryStorage::new();
        storage.set(REFRESH_TOKEN_KEY, "r1");
        storage.set(REFRESH_TOKEN_KEY, "r2");
        assert_eq!(storage.get(REFRESH_TOKEN_KEY), Some("r2".to_string()));
    }

    #[test]
    fn test_remove_missing_key_is_noop() {
        let storage = MemoryStorage::new();
        storage.remove(USER_KEY);
        assert_eq!(storage.get(USER_KEY), None);
    }
}
