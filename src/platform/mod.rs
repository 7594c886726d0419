//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall-clock time
//! - Run seeds
//! - Default storage back-end
//! - The JS-facing bridge (wasm only)

#[cfg(target_arch = "wasm32")]
pub mod web;

use crate::persistence::KeyValueStore;

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Milliseconds since the Unix epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Fresh seed for a new run
pub fn random_seed() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        (js_sys::Math::random() * u64::MAX as f64) as u64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        rand::random()
    }
}

/// Storage used when the host doesn't supply one
#[cfg(target_arch = "wasm32")]
pub fn default_store() -> Box<dyn KeyValueStore> {
    Box::new(crate::persistence::LocalStorage)
}

/// Storage used when the host doesn't supply one
///
/// `MEMORY_MAESTRO_DATA` overrides the file location.
#[cfg(not(target_arch = "wasm32"))]
pub fn default_store() -> Box<dyn KeyValueStore> {
    let path = std::env::var_os("MEMORY_MAESTRO_DATA")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|| std::path::PathBuf::from("memory-maestro.json"));
    log::info!("Using save file {}", path.display());
    Box::new(crate::persistence::FileStore::new(path))
}
