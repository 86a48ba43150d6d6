//! Test data builders for sessions and samples

use chrono::{DateTime, TimeDelta, TimeZone};
use chrono_tz::Tz;
use serialvis::config::ExportScope;
use serialvis::session::AcquisitionSession;
use serialvis::types::{BaudRate, Sample};

/// Epoch seconds every test timeline starts from
pub const BASE_EPOCH_SECS: i64 = 1_700_000_000;

/// Time zone used by the test timelines
pub const TEST_TZ: Tz = chrono_tz::America::New_York;

/// Timestamp `secs` after the base epoch
pub fn at(secs: i64) -> DateTime<Tz> {
    TEST_TZ
        .timestamp_opt(BASE_EPOCH_SECS + secs, 0)
        .single()
        .expect("valid test timestamp")
}

/// Sample `secs` after the base epoch
pub fn sample_at(secs: i64, value: f64) -> Sample {
    Sample::new(at(secs), value)
}

/// Builder for creating test sessions
pub struct SessionBuilder {
    horizon: TimeDelta,
    scope: ExportScope,
    port: Option<String>,
    baud: Option<BaudRate>,
    running: bool,
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self {
            horizon: TimeDelta::seconds(120),
            scope: ExportScope::Window,
            port: Some("COM1".to_string()),
            baud: Some(BaudRate::B9600),
            running: true,
        }
    }

    pub fn horizon_secs(mut self, secs: i64) -> Self {
        self.horizon = TimeDelta::seconds(secs);
        self
    }

    pub fn scope(mut self, scope: ExportScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn port(mut self, port: Option<&str>) -> Self {
        self.port = port.map(str::to_string);
        self
    }

    pub fn idle(mut self) -> Self {
        self.running = false;
        self
    }

    pub fn build(self) -> AcquisitionSession {
        let mut session = AcquisitionSession::new(self.horizon, self.scope);
        session.set_port(self.port);
        if let Some(baud) = self.baud {
            session.set_baud(baud);
        }
        if self.running {
            session.start();
        }
        session
    }
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
