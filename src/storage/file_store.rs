use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use fs4::tokio::AsyncFileExt;
use serde_json::Value;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt},
};
use tracing::debug;

use super::KeyValueStore;

/// The main realization of [KeyValueStore]. Each key is a `<key>.json` file inside `store_dir`.
/// Files are locked while being read or written so the CLI and a running host don't observe
/// half-written documents.
pub struct JsonFileStore {
    store_dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(store_dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&store_dir)?;

        Ok(Self { store_dir })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.store_dir.join(format!("{key}.json"))
    }

    async fn read_inner(path: &Path) -> Result<Option<String>, std::io::Error> {
        let mut file = match File::open(path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        file.lock_shared()?;
        let mut contents = String::new();
        let result = file.read_to_string(&mut contents).await;
        file.unlock_async().await?;
        result?;

        Ok(Some(contents))
    }

    async fn write_inner(file: &mut File, contents: &[u8]) -> Result<(), std::io::Error> {
        file.set_len(0).await?;
        file.rewind().await?;
        file.write_all(contents).await?;
        file.flush().await?;
        file.sync_data().await
    }
}

impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let path = self.key_path(key);
        debug!("Reading {path:?}");
        let Some(contents) = Self::read_inner(&path)
            .await
            .with_context(|| format!("Failed to read {path:?}"))?
        else {
            return Ok(None);
        };

        // An empty file means the key was created but never written completely.
        if contents.trim().is_empty() {
            return Ok(None);
        }

        let value = serde_json::from_str(&contents)
            .with_context(|| format!("Illegal json stored in {path:?}"))?;
        Ok(Some(value))
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let path = self.key_path(key);
        debug!("Writing {path:?}");
        let contents = serde_json::to_vec(&value)?;

        let mut file = File::options()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .await
            .with_context(|| format!("Failed to open {path:?}"))?;

        // Semi-safe acquire-release for a file
        file.lock_exclusive()?;
        let result = Self::write_inner(&mut file, &contents).await;
        file.unlock_async().await?;
        result.with_context(|| format!("Failed to write {path:?}"))
    }
}
