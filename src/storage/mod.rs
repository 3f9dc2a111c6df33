//!  Persistence is organized as a tiny key-value store, see [KeyValueStore].
//!  The basic idea is:
//!   - Every key holds one JSON document that is always read and written as a whole.
//!   - Only two keys exist: [entities::USAGE_DATA_KEY] and [entities::SETTINGS_KEY].
//!   - Read-modify-write sequences are composed by callers and aren't transactional.

pub mod entities;
pub mod file_store;
pub mod memory_store;

use std::{future::Future, ops::Deref};

use anyhow::Result;
use serde_json::Value;

/// Interface for abstracting persistence of whole JSON values.
pub trait KeyValueStore {
    /// Returns the value stored under `key` or `None` if nothing was written yet.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Value>>>;

    /// Replaces the value stored under `key`.
    fn set(&self, key: &str, value: Value) -> impl Future<Output = Result<()>>;
}

impl<T: Deref> KeyValueStore for T
where
    T::Target: KeyValueStore,
{
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Value>>> {
        self.deref().get(key)
    }

    fn set(&self, key: &str, value: Value) -> impl Future<Output = Result<()>> {
        self.deref().set(key, value)
    }
}
