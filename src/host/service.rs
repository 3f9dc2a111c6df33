use tracing::{error, info, instrument, warn};

use crate::{
    notify::Notifier,
    storage::KeyValueStore,
    tracker::{domain::TrackedDomains, lookup::TabLookup, SessionState, TabId, TrackerCommand},
    usage::UsageStore,
    utils::clock::Clock,
};

/// Owns the [SessionState] and carries out what the tracker decides. Failures are logged and
/// never stop tracking.
pub struct ActivityService<S: KeyValueStore> {
    session: SessionState,
    domains: TrackedDomains,
    lookup: Box<dyn TabLookup>,
    usage: UsageStore<S>,
    notifier: Box<dyn Notifier>,
    time_provider: Box<dyn Clock>,
}

impl<S: KeyValueStore> ActivityService<S> {
    pub fn new(
        domains: TrackedDomains,
        lookup: Box<dyn TabLookup>,
        usage: UsageStore<S>,
        notifier: Box<dyn Notifier>,
        time_provider: Box<dyn Clock>,
    ) -> Self {
        Self {
            session: SessionState::idle(),
            domains,
            lookup,
            usage,
            notifier,
            time_provider,
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn usage(&self) -> &UsageStore<S> {
        &self.usage
    }

    /// Entry point for both "tab became active" and "navigation completed".
    #[instrument(skip(self))]
    pub async fn update_tab_usage(&mut self, tab_id: TabId) {
        let url = match self.lookup.tab_url(tab_id).await {
            Ok(url) => url,
            Err(e) => {
                warn!("Couldn't look up tab {tab_id}, treating it as untracked: {e:?}");
                None
            }
        };

        let now = self.time_provider.time();
        let transition = self
            .session
            .on_tab(&self.domains, tab_id, url.as_deref(), now);

        match (self.session.active(), transition.next.active()) {
            (_, Some(next)) => info!("Timing {} in tab {}", next.domain, next.tab_id),
            (Some(previous), None) => info!("Stopped timing {}", previous.domain),
            (None, None) => {}
        }
        self.session = transition.next;

        for command in transition.commands {
            self.execute(command).await;
        }
    }

    async fn execute(&self, command: TrackerCommand) {
        match command {
            TrackerCommand::Accumulate {
                domain,
                duration_ms,
            } => {
                if let Err(e) = self.usage.accumulate(&domain, duration_ms).await {
                    error!("Failed to accumulate {duration_ms}ms for {domain}: {e:?}");
                }
            }
            TrackerCommand::CheckLimit { domain } => {
                let status = match self.usage.check_daily_limit(&domain).await {
                    Ok(status) => status,
                    Err(e) => {
                        error!("Failed to check daily limit for {domain}: {e:?}");
                        return;
                    }
                };
                if let Some(notification) = status.notification() {
                    if let Err(e) = self.notifier.notify(notification).await {
                        error!("Failed to show notification {e:?}");
                    }
                }
            }
        }
    }
}
