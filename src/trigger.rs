//! Two-window strum trigger
//!
//! Each check draws a reference window and then an adjacent window of the
//! same size, and fires when the newer window's average amplitude jumps by
//! more than a fixed ratio on any axis. Both windows are fresh on every
//! call, so the detector follows slow drift without keeping any baseline.

use crate::config::{MINI, NOISE, THRESH};
use crate::error::Result;
use crate::sample::SampleStream;
use tracing::trace;

/// Configuration for the strum trigger
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerConfig {
    /// Samples per window
    pub mini: usize,
    /// Ratio `new_avg` must strictly exceed over `ref_avg`
    pub thresh: f32,
    /// New-window averages at or below this on any axis mean "at rest"
    pub noise: f32,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            mini: MINI,
            thresh: THRESH,
            noise: NOISE,
        }
    }
}

/// Why a check did or did not fire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerDecision {
    /// Some axis of the new window sat at or below the noise floor
    Noise,
    /// Above the noise floor but no axis jumped past the ratio
    Quiet,
    Fired,
}

/// Both window averages plus the decision taken on them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerOutcome {
    pub ref_avg: [f32; 3],
    pub new_avg: [f32; 3],
    pub decision: TriggerDecision,
}

impl TriggerOutcome {
    pub fn fired(&self) -> bool {
        self.decision == TriggerDecision::Fired
    }
}

/// Strum gesture detector
#[derive(Debug, Clone, Default)]
pub struct TriggerDetector {
    config: TriggerConfig,
}

impl TriggerDetector {
    pub fn new(config: TriggerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TriggerConfig {
        &self.config
    }

    /// Samples consumed by every call to `check` or `evaluate`
    pub fn samples_per_check(&self) -> usize {
        2 * self.config.mini
    }

    /// Run one trigger check
    ///
    /// Always consumes `2 * mini` samples, including when it returns false.
    pub fn check<St: SampleStream>(&self, stream: &mut St) -> Result<bool> {
        Ok(self.evaluate(stream)?.fired())
    }

    /// Run one trigger check and keep both window averages
    pub fn evaluate<St: SampleStream>(&self, stream: &mut St) -> Result<TriggerOutcome> {
        let ref_avg = self.window_average(stream)?;
        let new_avg = self.window_average(stream)?;
        let decision = self.decide(ref_avg, new_avg);

        trace!(?ref_avg, ?new_avg, ?decision, "trigger check");

        Ok(TriggerOutcome {
            ref_avg,
            new_avg,
            decision,
        })
    }

    /// Compare two window averages
    ///
    /// Both comparisons are strict: a value exactly on the noise floor is
    /// noise, and a value exactly on the ratio does not fire.
    pub fn decide(&self, ref_avg: [f32; 3], new_avg: [f32; 3]) -> TriggerDecision {
        if new_avg.iter().any(|&avg| avg <= self.config.noise) {
            return TriggerDecision::Noise;
        }

        let jumped = new_avg
            .iter()
            .zip(ref_avg.iter())
            .any(|(&new, &reference)| new > reference * self.config.thresh);

        if jumped {
            TriggerDecision::Fired
        } else {
            TriggerDecision::Quiet
        }
    }

    /// |sum / mini| per axis over `mini` fresh samples
    fn window_average<St: SampleStream>(&self, stream: &mut St) -> Result<[f32; 3]> {
        let mut sum = [0.0f32; 3];
        for _ in 0..self.config.mini {
            let sample = stream.next_sample()?;
            sum[0] += sample.x;
            sum[1] += sample.y;
            sum[2] += sample.z;
        }

        let n = self.config.mini as f32;
        Ok(sum.map(|s| (s / n).abs()))
    }
}
