//! Wall-clock source for sample timestamps

use chrono::{DateTime, Local, NaiveDate, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use std::sync::{Arc, Mutex};

/// Source of "now" in the display time zone
pub trait Clock: Send {
    fn now(&self) -> DateTime<Tz>;

    /// Calendar date in the machine's local zone (names export files)
    fn local_date(&self) -> NaiveDate {
        self.now().with_timezone(&Local).date_naive()
    }
}

/// System wall clock converted into a fixed zone
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.tz)
    }

    fn local_date(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Manually advanced clock; clones share the same time
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Tz>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Tz>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Clock starting at a Unix timestamp (milliseconds) in `tz`
    pub fn at_millis(tz: Tz, millis: i64) -> Self {
        let start = tz
            .timestamp_millis_opt(millis)
            .single()
            .unwrap_or_else(|| Utc::now().with_timezone(&tz));
        Self::new(start)
    }

    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += delta;
    }

    pub fn set(&self, time: DateTime<Tz>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = time;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Tz> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}
