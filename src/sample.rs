//! De-duplicating sample reader
//!
//! The accelerometer output registers are read far faster than the sensor
//! updates them, so consecutive reads often repeat the previous value.
//! [`SampleSource`] polls the sensor until it sees a fresh reading and then
//! scales it to physical units.

use crate::error::{CaptureError, Result};
use crate::sensor::{AccelSensor, RawSample};
use tracing::{debug, warn};

/// One scaled accelerometer reading (g with the default divisor)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Sample {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Convert raw counts by dividing every axis by `divisor`
    pub fn from_raw(raw: RawSample, divisor: f32) -> Self {
        Self {
            x: raw.x as f32 / divisor,
            y: raw.y as f32 / divisor,
            z: raw.z as f32 / divisor,
        }
    }

    pub const fn axes(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f32; 3]> for Sample {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self { x, y, z }
    }
}

/// Anything that yields scaled samples one at a time
pub trait SampleStream {
    fn next_sample(&mut self) -> Result<Sample>;
}

impl<T: SampleStream + ?Sized> SampleStream for &mut T {
    fn next_sample(&mut self) -> Result<Sample> {
        (**self).next_sample()
    }
}

/// When a fresh reading counts as different from the last accepted one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Re-read while any axis still equals its previous value.
    ///
    /// A sensor holding one axis constant stalls acquisition under this
    /// policy.
    #[default]
    AllAxesMustChange,
    /// Re-read only while all three axes equal their previous values
    AnyAxisChanged,
}

impl DuplicatePolicy {
    /// True if `current` must be discarded and the sensor read again
    pub fn rejects(self, last: RawSample, current: RawSample) -> bool {
        match self {
            DuplicatePolicy::AllAxesMustChange => {
                last.x == current.x || last.y == current.y || last.z == current.z
            }
            DuplicatePolicy::AnyAxisChanged => last == current,
        }
    }
}

/// Polls an [`AccelSensor`] and returns only fresh readings
pub struct SampleSource<S> {
    sensor: S,
    last: RawSample,
    divisor: f32,
    policy: DuplicatePolicy,
    retry_limit: Option<u64>,
    accepted: u64,
    rejected: u64,
}

impl<S: AccelSensor> SampleSource<S> {
    /// Wrap an already configured and enabled sensor
    pub fn new(sensor: S, divisor: f32) -> Self {
        Self {
            sensor,
            last: RawSample::ZERO,
            divisor,
            policy: DuplicatePolicy::default(),
            retry_limit: None,
            accepted: 0,
            rejected: 0,
        }
    }

    pub fn with_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Give up with `SensorStalled` after `attempts` consecutive rejected reads
    ///
    /// Without a limit, a frozen sensor blocks `next` forever.
    pub fn with_retry_limit(mut self, attempts: u64) -> Self {
        self.retry_limit = Some(attempts);
        self
    }

    /// Block until the sensor reports a fresh reading
    pub fn next(&mut self) -> Result<Sample> {
        let mut attempts = 0u64;
        let raw = loop {
            let raw = self.sensor.read_axes()?;
            if !self.policy.rejects(self.last, raw) {
                break raw;
            }

            attempts += 1;
            self.rejected += 1;
            if let Some(limit) = self.retry_limit {
                if attempts >= limit {
                    warn!(attempts, last = ?self.last, "sensor stalled");
                    return Err(CaptureError::SensorStalled { attempts });
                }
            }
        };

        if attempts > 0 {
            debug!(attempts, "skipped repeated readings");
        }

        self.last = raw;
        self.accepted += 1;
        Ok(Sample::from_raw(raw, self.divisor))
    }

    /// Samples handed out so far
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    /// Reads discarded as repeats
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

}

impl<S: AccelSensor> SampleStream for SampleSource<S> {
    fn next_sample(&mut self) -> Result<Sample> {
        self.next()
    }
}
