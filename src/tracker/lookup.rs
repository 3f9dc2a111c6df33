use std::{collections::HashMap, sync::Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use super::TabId;

/// Contract for resolving the current url of a tab. `Ok(None)` means the tab is unknown or has no
/// url available.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TabLookup: Send + Sync {
    async fn tab_url(&self, tab_id: TabId) -> Result<Option<String>>;
}

/// Remembers the last url the browser reported for every tab. Later reports always replace
/// earlier ones.
#[derive(Default)]
pub struct TabRegistry {
    urls: Mutex<HashMap<TabId, String>>,
}

impl TabRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the url of a tab, replacing the previous one. Urls are only dropped by
    /// [TabRegistry::forget].
    pub fn observe(&self, tab_id: TabId, url: impl Into<String>) -> Result<()> {
        self.lock()?.insert(tab_id, url.into());
        Ok(())
    }

    /// Drops a closed tab. Time spent on it is not flushed.
    pub fn forget(&self, tab_id: TabId) -> Result<()> {
        self.lock()?.remove(&tab_id);
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<TabId, String>>> {
        self.urls
            .lock()
            .map_err(|_| anyhow!("Tab registry lock was poisoned"))
    }
}

#[async_trait]
impl TabLookup for TabRegistry {
    async fn tab_url(&self, tab_id: TabId) -> Result<Option<String>> {
        Ok(self.lock()?.get(&tab_id).cloned())
    }
}

#[async_trait]
impl<T: TabLookup + ?Sized> TabLookup for std::sync::Arc<T> {
    async fn tab_url(&self, tab_id: TabId) -> Result<Option<String>> {
        (**self).tab_url(tab_id).await
    }
}
