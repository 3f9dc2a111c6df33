use chrono::{DateTime, Utc};

/// Represents an entity responsible for providing dates across application. This can allow it to
/// be used for testing
pub trait Clock: Sync + Send + 'static {
    fn time(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy)]
pub struct DefaultClock;

impl Clock for DefaultClock {
    fn time(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
pub mod test_clock {
    use std::sync::{Arc, Mutex};

    use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

    use super::Clock;

    pub const TEST_START_DATE: NaiveDateTime = NaiveDateTime::new(
        match NaiveDate::from_ymd_opt(2018, 7, 4) {
            Some(v) => v,
            None => panic!(),
        },
        NaiveTime::MIN,
    );

    /// Clock that only moves when told to. Clones share the same time.
    #[derive(Clone)]
    pub struct ManualClock {
        now: Arc<Mutex<DateTime<Utc>>>,
    }

    impl ManualClock {
        pub fn new(start: DateTime<Utc>) -> Self {
            Self {
                now: Arc::new(Mutex::new(start)),
            }
        }

        pub fn at_test_start() -> Self {
            Self::new(Utc.from_utc_datetime(&TEST_START_DATE))
        }

        pub fn advance(&self, by: Duration) {
            *self.now.lock().unwrap() += by;
        }
    }

    impl Clock for ManualClock {
        fn time(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }
}
