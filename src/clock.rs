use chrono::{DateTime, Duration, Local};

/// Wall-clock bounds of a session plus the 1s display tick.
///
/// The clock is a side channel: nothing in the matcher reads it.
#[derive(Debug, Clone, Default)]
pub struct SessionClock {
    started_at: Option<DateTime<Local>>,
    stopped_at: Option<DateTime<Local>>,
    last_reported_secs: Option<u64>,
}

impl SessionClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the clock unless it was already started in this session.
    pub fn start(&mut self, now: DateTime<Local>) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
    }

    pub fn stop(&mut self, now: DateTime<Local>) {
        if self.is_running() {
            self.stopped_at = Some(now);
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some() && self.stopped_at.is_none()
    }

    pub fn started_at(&self) -> Option<DateTime<Local>> {
        self.started_at
    }

    pub fn stopped_at(&self) -> Option<DateTime<Local>> {
        self.stopped_at
    }

    pub fn elapsed(&self, now: DateTime<Local>) -> Duration {
        match self.started_at {
            Some(start) => (self.stopped_at.unwrap_or(now) - start).max(Duration::zero()),
            None => Duration::zero(),
        }
    }

    /// Elapsed whole seconds, only when the value changed since the last tick.
    pub fn tick(&mut self, now: DateTime<Local>) -> Option<u64> {
        if !self.is_running() {
            return None;
        }

        let secs = self.elapsed(now).num_seconds() as u64;
        if self.last_reported_secs == Some(secs) {
            return None;
        }
        self.last_reported_secs = Some(secs);
        Some(secs)
    }
}
