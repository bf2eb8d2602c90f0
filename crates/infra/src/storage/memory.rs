//! Process-local key/value store

use std::collections::HashMap;

use parking_lot::RwLock;
use timesheet_core::LocalStore;
use timesheet_domain::Result;

/// Volatile [`LocalStore`] for tests and `:memory:` configurations.
#[derive(Debug, Default)]
pub struct InMemoryLocalStore {
    values: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryLocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

impl LocalStore for InMemoryLocalStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.values.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.values.write().insert(key.to_owned(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.write().remove(key);
        Ok(())
    }
}
