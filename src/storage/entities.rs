use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const USAGE_DATA_KEY: &str = "usageData";
pub const SETTINGS_KEY: &str = "settings";

pub const DEFAULT_DAILY_LIMIT_MINUTES: u32 = 120;

/// Domain to accumulated milliseconds for a single day.
pub type DayUsage = BTreeMap<String, u64>;

/// The value stored under [USAGE_DATA_KEY]. Shape is `{ [date]: { [domain]: ms } }`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsageLedger(BTreeMap<String, DayUsage>);

impl UsageLedger {
    /// Adds `duration_ms` to `domain` for `date_key`, creating the entries when missing.
    /// Returns the new value for the domain.
    pub fn add(&mut self, date_key: &str, domain: &str, duration_ms: u64) -> u64 {
        let day = self.0.entry(date_key.to_owned()).or_default();
        let value = day.entry(domain.to_owned()).or_insert(0);
        *value = value.saturating_add(duration_ms);
        *value
    }

    pub fn day(&self, date_key: &str) -> Option<&DayUsage> {
        self.0.get(date_key)
    }
}

/// Total of every domain recorded for a day.
pub fn day_total(day: &DayUsage) -> u64 {
    day.values().fold(0u64, |sum, v| sum.saturating_add(*v))
}

/// The value stored under [SETTINGS_KEY].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsEntity {
    /// Allowed minutes per day across every tracked domain.
    #[serde(rename = "dailyLimit")]
    pub daily_limit: u32,
}

impl Default for SettingsEntity {
    fn default() -> Self {
        Self {
            daily_limit: DEFAULT_DAILY_LIMIT_MINUTES,
        }
    }
}

impl SettingsEntity {
    pub fn daily_limit_ms(&self) -> u64 {
        u64::from(self.daily_limit) * 60_000
    }
}
