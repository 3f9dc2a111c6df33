use std::{collections::HashMap, sync::Mutex};

use anyhow::{anyhow, Result};
use serde_json::Value;

use super::KeyValueStore;

/// [KeyValueStore] kept entirely in memory. Nothing survives the process.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let values = self
            .values
            .lock()
            .map_err(|_| anyhow!("Memory store lock was poisoned"))?;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| anyhow!("Memory store lock was poisoned"))?;
        values.insert(key.to_owned(), value);
        Ok(())
    }
}
