use chrono::{DateTime, Utc};

/// Source of the current time for expiry and rate-limit decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
pub(crate) use manual::ManualClock;

#[cfg(test)]
mod manual {
    use std::sync::Mutex;

    use chrono::{DateTime, Duration, TimeZone, Utc};

    use super::Clock;

    /// Clock that only moves when told to.
    pub struct ManualClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        pub fn new() -> Self {
            Self {
                now: Mutex::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()),
            }
        }

        pub fn advance_secs(&self, secs: i64) {
            *self.now.lock().unwrap() += Duration::seconds(secs);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::new();
        let start = clock.now();
        clock.advance_secs(31);
        assert_eq!((clock.now() - start).num_seconds(), 31);
    }
}
