//! Status indication (LED blink patterns)

use crate::error::Result;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

/// Pipeline events worth showing to the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    Anomaly,
    Nominal,
    /// One learning iteration finished
    Learned,
    /// Learning phase over, inference starts
    LearningComplete,
}

/// Status LEDs on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Led {
    Blue,
    Red,
    Green,
}

/// `pulses` repetitions of (on for `on`, off for `off`) on one LED
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlinkPattern {
    pub led: Led,
    pub pulses: u8,
    pub on: Duration,
    pub off: Duration,
}

impl BlinkPattern {
    const fn new(led: Led, pulses: u8, on_ms: u64, off_ms: u64) -> Self {
        Self {
            led,
            pulses,
            on: Duration::from_millis(on_ms),
            off: Duration::from_millis(off_ms),
        }
    }

    /// Wall time the pattern blocks for
    pub fn total(&self) -> Duration {
        (self.on + self.off) * u32::from(self.pulses)
    }
}

impl StatusKind {
    pub const fn pattern(self) -> BlinkPattern {
        match self {
            StatusKind::Anomaly => BlinkPattern::new(Led::Red, 3, 100, 50),
            StatusKind::Nominal => BlinkPattern::new(Led::Green, 1, 1000, 250),
            StatusKind::Learned => BlinkPattern::new(Led::Blue, 1, 750, 150),
            StatusKind::LearningComplete => BlinkPattern::new(Led::Blue, 3, 750, 50),
        }
    }
}

/// Something that can show a [`StatusKind`] to the operator
pub trait StatusIndicator {
    fn signal(&mut self, kind: StatusKind) -> Result<()>;
}

impl<T: StatusIndicator + ?Sized> StatusIndicator for Box<T> {
    fn signal(&mut self, kind: StatusKind) -> Result<()> {
        (**self).signal(kind)
    }
}

/// Records every signal, mainly for tests
impl StatusIndicator for Vec<StatusKind> {
    fn signal(&mut self, kind: StatusKind) -> Result<()> {
        self.push(kind);
        Ok(())
    }
}

/// Host stand-in for the board LEDs: logs each signal
///
/// With `blocking` set it also sleeps through the blink cadence, matching
/// the pause the device takes while flashing.
#[derive(Debug, Clone, Default)]
pub struct LogIndicator {
    blocking: bool,
}

impl LogIndicator {
    pub fn new(blocking: bool) -> Self {
        Self { blocking }
    }
}

impl StatusIndicator for LogIndicator {
    fn signal(&mut self, kind: StatusKind) -> Result<()> {
        let pattern = kind.pattern();
        match kind {
            StatusKind::Anomaly => warn!(led = ?pattern.led, pulses = pattern.pulses, "anomaly"),
            _ => info!(led = ?pattern.led, pulses = pattern.pulses, status = ?kind, "status"),
        }

        if self.blocking {
            for _ in 0..pattern.pulses {
                thread::sleep(pattern.on);
                thread::sleep(pattern.off);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patterns_are_distinct() {
        let kinds = [
            StatusKind::Anomaly,
            StatusKind::Nominal,
            StatusKind::Learned,
            StatusKind::LearningComplete,
        ];
        for (i, a) in kinds.iter().enumerate() {
            for b in &kinds[i + 1..] {
                assert_ne!(a.pattern(), b.pattern());
            }
        }
    }

    #[test]
    fn test_anomaly_is_three_short_red_pulses() {
        let pattern = StatusKind::Anomaly.pattern();
        assert_eq!(pattern.led, Led::Red);
        assert_eq!(pattern.pulses, 3);
        assert_eq!(pattern.total(), Duration::from_millis(450));
    }

    #[test]
    fn test_non_blocking_indicator_returns_immediately() {
        let mut indicator = LogIndicator::new(false);
        let start = std::time::Instant::now();
        indicator.signal(StatusKind::Nominal).unwrap();
        assert!(start.elapsed() < Duration::from_millis(500));
    }
}
