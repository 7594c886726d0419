//! Key-value persistence
//!
//! Features:
//! - `KeyValueStore` trait over string keys and string values
//! - In-memory store (tests, fallback when nothing else is available)
//! - JSON file store (native)
//! - Browser LocalStorage (wasm)
//! - Typed JSON helpers on top of any store

mod file;
mod memory;
#[cfg(target_arch = "wasm32")]
mod web;

pub use file::FileStore;
pub use memory::MemoryStore;
#[cfg(target_arch = "wasm32")]
pub use web::LocalStorage;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::PersistenceError;

/// Opaque string storage
pub trait KeyValueStore {
    /// Read a value; `Ok(None)` when the key was never written
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Write a value, replacing any previous one
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        (**self).set(key, value)
    }
}

/// Read and decode a JSON value
pub fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, PersistenceError> {
    let Some(json) = store.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&json)
        .map(Some)
        .map_err(|source| PersistenceError::Decode {
            key: key.to_string(),
            source,
        })
}

/// Encode and write a JSON value
pub fn save_json<T: Serialize + ?Sized>(
    store: &mut dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), PersistenceError> {
    let json = serde_json::to_string(value).map_err(|source| PersistenceError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &json)
}
