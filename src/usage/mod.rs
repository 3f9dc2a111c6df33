//! Accumulates tracked time per UTC day and domain, and exposes what presentation surfaces need.

pub mod limit;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    storage::{
        entities::{
            day_total, DayUsage, SettingsEntity, UsageLedger, SETTINGS_KEY, USAGE_DATA_KEY,
        },
        KeyValueStore,
    },
    utils::{clock::Clock, time::date_key},
};

/// Everything needed to render usage for a single day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSnapshot {
    pub date: String,
    pub usage: DayUsage,
    pub total_ms: u64,
    pub daily_limit: u32,
}

impl UsageSnapshot {
    pub fn daily_limit_ms(&self) -> u64 {
        u64::from(self.daily_limit) * 60_000
    }
}

/// Bridges the tracker and the [KeyValueStore]. Every operation reads the whole value, changes
/// it and writes the whole value back.
pub struct UsageStore<S: KeyValueStore> {
    store: S,
    clock: Box<dyn Clock>,
}

impl<S: KeyValueStore> UsageStore<S> {
    pub fn new(store: S, clock: Box<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.time().date_naive()
    }

    async fn ledger(&self) -> Result<UsageLedger> {
        match self.store.get(USAGE_DATA_KEY).await? {
            Some(value) => serde_json::from_value(value).context("Usage data has unexpected shape"),
            None => Ok(UsageLedger::default()),
        }
    }

    /// Adds `duration_ms` to today's entry for `domain`. Returns the new value for the domain.
    pub async fn accumulate(&self, domain: &str, duration_ms: u64) -> Result<u64> {
        let mut ledger = self.ledger().await?;
        let key = date_key(self.today());
        let updated = ledger.add(&key, domain, duration_ms);
        self.store
            .set(USAGE_DATA_KEY, serde_json::to_value(&ledger)?)
            .await?;
        debug!("Accumulated {duration_ms}ms for {domain} on {key}, now {updated}ms");
        Ok(updated)
    }

    pub async fn today_usage(&self) -> Result<DayUsage> {
        self.usage_for(self.today()).await
    }

    pub async fn usage_for(&self, date: NaiveDate) -> Result<DayUsage> {
        let ledger = self.ledger().await?;
        Ok(ledger.day(&date_key(date)).cloned().unwrap_or_default())
    }

    /// Clears the entire ledger, every day included.
    pub async fn reset_all(&self) -> Result<()> {
        self.store
            .set(USAGE_DATA_KEY, serde_json::to_value(UsageLedger::default())?)
            .await?;
        info!("Usage data was reset");
        Ok(())
    }

    /// Reads settings. Missing or unusable settings fall back to the defaults.
    pub async fn settings(&self) -> Result<SettingsEntity> {
        let Some(value) = self.store.get(SETTINGS_KEY).await? else {
            return Ok(SettingsEntity::default());
        };
        match serde_json::from_value::<SettingsEntity>(value) {
            Ok(settings) if settings.daily_limit > 0 => Ok(settings),
            Ok(_) => {
                warn!("Stored daily limit is zero, using default");
                Ok(SettingsEntity::default())
            }
            Err(e) => {
                warn!("Stored settings are illegal, using default: {e}");
                Ok(SettingsEntity::default())
            }
        }
    }

    pub async fn set_daily_limit(&self, minutes: u32) -> Result<()> {
        if minutes == 0 {
            bail!("Daily limit must be a positive number of minutes");
        }
        let settings = SettingsEntity {
            daily_limit: minutes,
        };
        self.store
            .set(SETTINGS_KEY, serde_json::to_value(settings)?)
            .await?;
        info!("Daily limit set to {minutes} minutes");
        Ok(())
    }

    pub async fn snapshot_for(&self, date: NaiveDate) -> Result<UsageSnapshot> {
        let usage = self.usage_for(date).await?;
        let settings = self.settings().await?;
        Ok(UsageSnapshot {
            date: date_key(date),
            total_ms: day_total(&usage),
            usage,
            daily_limit: settings.daily_limit,
        })
    }

    pub async fn today_snapshot(&self) -> Result<UsageSnapshot> {
        self.snapshot_for(self.today()).await
    }
}
