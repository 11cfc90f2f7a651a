//! Scoped key-value persistence that outlives a navigation
//!
//! "Universal" values are visible to every execution context of the host
//! (the pending `state` lives here); "local" values belong to the client
//! side only.

use crate::oauth::error::OAuthResult;
use std::collections::HashMap;
use std::sync::Mutex;

pub trait Storage: Send + Sync {
    fn get_universal(&self, key: &str) -> Option<String>;

    /// Write a universal value; `None` clears the key
    fn set_universal(&self, key: &str, value: Option<&str>) -> OAuthResult<()>;

    fn get_local(&self, key: &str) -> Option<String>;

    /// Write a local value; `None` clears the key
    fn set_local(&self, key: &str, value: Option<&str>) -> OAuthResult<()>;

    /// Read a universal value and clear it in the same step
    ///
    /// The key is cleared even when it held nothing, so a value can be
    /// consumed at most once.
    fn take_universal(&self, key: &str) -> OAuthResult<Option<String>> {
        let value = self.get_universal(key);
        self.set_universal(key, None)?;
        Ok(value)
    }
}

/// In-process storage, lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryStorage {
    universal: Mutex<HashMap<String, String>>,
    local: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn write(map: &Mutex<HashMap<String, String>>, key: &str, value: Option<&str>) {
    let mut map = map.lock().unwrap_or_else(|e| e.into_inner());
    match value {
        Some(value) => {
            map.insert(key.to_string(), value.to_string());
        }
        None => {
            map.remove(key);
        }
    }
}

fn read(map: &Mutex<HashMap<String, String>>, key: &str) -> Option<String> {
    map.lock()
        .unwrap_or_else(|e| e.into_inner())
        .get(key)
        .cloned()
}

impl Storage for MemoryStorage {
    fn get_universal(&self, key: &str) -> Option<String> {
        read(&self.universal, key)
    }

    fn set_universal(&self, key: &str, value: Option<&str>) -> OAuthResult<()> {
        write(&self.universal, key, value);
        Ok(())
    }

    fn get_local(&self, key: &str) -> Option<String> {
        read(&self.local, key)
    }

    fn set_local(&self, key: &str, value: Option<&str>) -> OAuthResult<()> {
        write(&self.local, key, value);
        Ok(())
    }
}
