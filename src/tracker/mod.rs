//! Decides which tracked domain, if any, is being timed. [SessionState::on_tab] is pure: it takes
//! the previous state, the newly active tab and the current time, and returns the next state
//! together with the [TrackerCommand]s the caller has to carry out.

pub mod domain;
pub mod lookup;

use chrono::{DateTime, Utc};

use domain::{extract_domain, TrackedDomains};

/// Browser-assigned identifier of a tab.
pub type TabId = i64;

/// A tracked domain that is currently being timed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSession {
    pub tab_id: TabId,
    pub started: DateTime<Utc>,
    pub domain: String,
}

/// Either nothing is being timed or exactly one [ActiveSession] is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    active: Option<ActiveSession>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerCommand {
    /// Add time spent on the domain that was active before the switch.
    Accumulate { domain: String, duration_ms: u64 },
    /// Compare today's total with the daily limit.
    CheckLimit { domain: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: SessionState,
    pub commands: Vec<TrackerCommand>,
}

impl SessionState {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&ActiveSession> {
        self.active.as_ref()
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    /// Reacts to `tab_id` becoming active with `url`. Time of the previous session is always
    /// flushed before the new tab is looked at.
    pub fn on_tab(
        &self,
        domains: &TrackedDomains,
        tab_id: TabId,
        url: Option<&str>,
        now: DateTime<Utc>,
    ) -> Transition {
        let mut commands = Vec::with_capacity(2);

        if let Some(previous) = &self.active {
            commands.push(TrackerCommand::Accumulate {
                domain: previous.domain.clone(),
                duration_ms: elapsed_ms(previous.started, now),
            });
        }

        let next = match url.filter(|url| domains.is_tracked(url)) {
            Some(url) => {
                let domain = extract_domain(url).to_owned();
                commands.push(TrackerCommand::CheckLimit {
                    domain: domain.clone(),
                });
                SessionState {
                    active: Some(ActiveSession {
                        tab_id,
                        started: now,
                        domain,
                    }),
                }
            }
            None => SessionState::idle(),
        };

        Transition { next, commands }
    }
}

/// Milliseconds between `start` and `now`. A clock that went backwards counts as no time.
fn elapsed_ms(start: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    u64::try_from((now - start).num_milliseconds()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use crate::utils::clock::test_clock::TEST_START_DATE;

    use super::{domain::TrackedDomains, ActiveSession, SessionState, TrackerCommand};

    fn start() -> DateTime<Utc> {
        Utc.from_utc_datetime(&TEST_START_DATE)
    }

    #[test]
    fn test_idle_to_tracked_starts_timing() {
        let domains = TrackedDomains::default();
        let transition =
            SessionState::idle().on_tab(&domains, 7, Some("https://www.facebook.com/feed"), start());

        assert_eq!(
            transition.next.active(),
            Some(&ActiveSession {
                tab_id: 7,
                started: start(),
                domain: "www.facebook.com".into(),
            })
        );
        assert_eq!(
            transition.commands,
            vec![TrackerCommand::CheckLimit {
                domain: "www.facebook.com".into()
            }]
        );
    }

    #[test]
    fn test_idle_to_untracked_does_nothing() {
        let domains = TrackedDomains::default();
        let transition = SessionState::idle().on_tab(&domains, 1, Some("https://example.com"), start());
        assert!(transition.next.is_idle());
        assert!(transition.commands.is_empty());

        let transition = SessionState::idle().on_tab(&domains, 1, None, start());
        assert!(transition.next.is_idle());
        assert!(transition.commands.is_empty());
    }

    #[test]
    fn test_switch_between_tracked_flushes_previous_first() {
        let domains = TrackedDomains::default();
        let state = SessionState::idle()
            .on_tab(&domains, 1, Some("https://twitter.com/home"), start())
            .next;

        let transition = state.on_tab(
            &domains,
            2,
            Some("https://www.instagram.com/"),
            start() + Duration::seconds(90),
        );

        assert_eq!(
            transition.commands,
            vec![
                TrackerCommand::Accumulate {
                    domain: "twitter.com".into(),
                    duration_ms: 90_000
                },
                TrackerCommand::CheckLimit {
                    domain: "www.instagram.com".into()
                },
            ]
        );
        let active = transition.next.active().unwrap();
        assert_eq!(active.tab_id, 2);
        assert_eq!(active.started, start() + Duration::seconds(90));
    }

    #[test]
    fn test_untracked_in_between_restarts_timing() {
        let domains = TrackedDomains::default();
        let state = SessionState::idle()
            .on_tab(&domains, 1, Some("https://www.facebook.com/"), start())
            .next;

        let away = state.on_tab(
            &domains,
            2,
            Some("https://example.com"),
            start() + Duration::seconds(10),
        );
        assert!(away.next.is_idle());
        assert_eq!(
            away.commands,
            vec![TrackerCommand::Accumulate {
                domain: "www.facebook.com".into(),
                duration_ms: 10_000
            }]
        );

        let back = away.next.on_tab(
            &domains,
            3,
            Some("https://twitter.com/"),
            start() + Duration::seconds(60),
        );
        assert_eq!(
            back.commands,
            vec![TrackerCommand::CheckLimit {
                domain: "twitter.com".into()
            }]
        );
        assert_eq!(
            back.next.active().unwrap().started,
            start() + Duration::seconds(60)
        );
    }

    #[test]
    fn test_same_tab_reload_flushes_and_restarts() {
        let domains = TrackedDomains::default();
        let state = SessionState::idle()
            .on_tab(&domains, 1, Some("https://twitter.com/"), start())
            .next;
        let transition = state.on_tab(
            &domains,
            1,
            Some("https://twitter.com/explore"),
            start() + Duration::milliseconds(2500),
        );

        assert_eq!(
            transition.commands[0],
            TrackerCommand::Accumulate {
                domain: "twitter.com".into(),
                duration_ms: 2500
            }
        );
        assert_eq!(
            transition.next.active().unwrap().started,
            start() + Duration::milliseconds(2500)
        );
    }

    #[test]
    fn test_malformed_tracked_url_uses_unknown() {
        let domains = TrackedDomains::default();
        let transition =
            SessionState::idle().on_tab(&domains, 1, Some("facebook.com/feed"), start());
        assert_eq!(transition.next.active().unwrap().domain, "unknown");
    }

    #[test]
    fn test_clock_going_backwards_counts_as_zero() {
        let domains = TrackedDomains::default();
        let state = SessionState::idle()
            .on_tab(&domains, 1, Some("https://twitter.com/"), start())
            .next;
        let transition = state.on_tab(&domains, 1, None, start() - Duration::minutes(5));
        assert_eq!(
            transition.commands,
            vec![TrackerCommand::Accumulate {
                domain: "twitter.com".into(),
                duration_ms: 0
            }]
        );
    }
}
