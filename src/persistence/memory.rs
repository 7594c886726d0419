use std::collections::HashMap;

use super::KeyValueStore;
use crate::error::PersistenceError;

/// Process-local store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail (reads still work)
    pub fn read_only() -> Self {
        Self {
            values: HashMap::new(),
            fail_writes: true,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        if self.fail_writes {
            return Err(PersistenceError::write(key, "store is read-only"));
        }
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
