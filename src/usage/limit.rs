use anyhow::Result;
use tracing::{debug, warn};

use crate::{
    notify::Notification,
    storage::{entities::day_total, KeyValueStore},
};

use super::UsageStore;

/// Whether `total_ms` is strictly over a limit of `daily_limit_minutes`.
pub fn exceeds_limit(total_ms: u64, daily_limit_minutes: u32) -> bool {
    total_ms > u64::from(daily_limit_minutes) * 60_000
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitStatus {
    pub total_ms: u64,
    pub daily_limit: u32,
}

impl LimitStatus {
    pub fn exceeded(&self) -> bool {
        exceeds_limit(self.total_ms, self.daily_limit)
    }

    /// The notification to show, if any. There is no per-day suppression: every check over the
    /// limit produces one.
    pub fn notification(&self) -> Option<Notification> {
        self.exceeded()
            .then(|| Notification::daily_limit_reached(self.daily_limit))
    }
}

impl<S: KeyValueStore> UsageStore<S> {
    /// Sums today's usage across every tracked domain and compares it with the daily limit.
    /// `domain` is the one that triggered the check.
    pub async fn check_daily_limit(&self, domain: &str) -> Result<LimitStatus> {
        let today = self.today_usage().await?;
        let settings = self.settings().await?;
        let status = LimitStatus {
            total_ms: day_total(&today),
            daily_limit: settings.daily_limit,
        };
        if status.exceeded() {
            warn!(
                "Daily limit of {} minutes exceeded while entering {domain}: {}ms used",
                status.daily_limit, status.total_ms
            );
        } else {
            debug!("Limit check for {domain}: {status:?}");
        }
        Ok(status)
    }
}
