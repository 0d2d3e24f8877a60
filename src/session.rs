//! Per-run acquisition counters

use chrono::{DateTime, Local};
use std::time::Instant;

/// Tracks trigger checks and captures since the loop was created
#[derive(Debug, Clone)]
pub struct SessionStats {
    started_at: DateTime<Local>,
    start: Instant,
    checks: u64,
    triggers: u64,
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            started_at: Local::now(),
            start: Instant::now(),
            checks: 0,
            triggers: 0,
        }
    }

    pub(crate) fn record_check(&mut self, fired: bool) {
        self.checks += 1;
        if fired {
            self.triggers += 1;
        }
    }

    /// Wall clock time the session started
    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    pub fn checks(&self) -> u64 {
        self.checks
    }

    pub fn triggers(&self) -> u64 {
        self.triggers
    }

    /// Trigger checks per second so far
    pub fn check_rate(&self) -> f64 {
        let elapsed = self.elapsed_secs();
        if elapsed > 0.0 {
            self.checks as f64 / elapsed
        } else {
            0.0
        }
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}
