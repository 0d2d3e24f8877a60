//! Accelerometer collaborator interface

use crate::error::{CaptureError, Result};
use std::collections::VecDeque;

/// One raw accelerometer reading in device counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawSample {
    /// X-axis (raw value)
    pub x: i32,
    /// Y-axis (raw value)
    pub y: i32,
    /// Z-axis (raw value)
    pub z: i32,
}

impl RawSample {
    pub const ZERO: RawSample = RawSample { x: 0, y: 0, z: 0 };

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl From<[i32; 3]> for RawSample {
    fn from([x, y, z]: [i32; 3]) -> Self {
        Self { x, y, z }
    }
}

/// A 3-axis accelerometer driver
///
/// Call `configure` and `enable` once before the first `read_axes`.
/// `read_axes` returns whatever the output registers currently hold, so
/// back-to-back calls may repeat the previous reading.
pub trait AccelSensor {
    /// Set output data rate (Hz) and full-scale range (g)
    fn configure(&mut self, output_rate_hz: f32, full_scale_g: f32) -> Result<()>;

    /// Start the accelerometer
    fn enable(&mut self) -> Result<()>;

    /// Read the current axis registers
    fn read_axes(&mut self) -> Result<RawSample>;
}

impl<S: AccelSensor + ?Sized> AccelSensor for Box<S> {
    fn configure(&mut self, output_rate_hz: f32, full_scale_g: f32) -> Result<()> {
        (**self).configure(output_rate_hz, full_scale_g)
    }

    fn enable(&mut self) -> Result<()> {
        (**self).enable()
    }

    fn read_axes(&mut self) -> Result<RawSample> {
        (**self).read_axes()
    }
}

/// In-memory sensor that plays back a fixed list of readings
///
/// Returns `CaptureError::SourceExhausted` once the script runs out.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSensor {
    readings: VecDeque<RawSample>,
    reads: u64,
    configured: Option<(f32, f32)>,
    enabled: bool,
}

impl ScriptedSensor {
    pub fn new<I, R>(readings: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<RawSample>,
    {
        Self {
            readings: readings.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Append more readings to the end of the script
    pub fn extend<I, R>(&mut self, readings: I)
    where
        I: IntoIterator<Item = R>,
        R: Into<RawSample>,
    {
        self.readings.extend(readings.into_iter().map(Into::into));
    }

    /// Total `read_axes` calls that returned a reading
    pub fn reads(&self) -> u64 {
        self.reads
    }

    /// Readings not yet consumed
    pub fn remaining(&self) -> usize {
        self.readings.len()
    }

    pub fn configured(&self) -> Option<(f32, f32)> {
        self.configured
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl AccelSensor for ScriptedSensor {
    fn configure(&mut self, output_rate_hz: f32, full_scale_g: f32) -> Result<()> {
        self.configured = Some((output_rate_hz, full_scale_g));
        Ok(())
    }

    fn enable(&mut self) -> Result<()> {
        self.enabled = true;
        Ok(())
    }

    fn read_axes(&mut self) -> Result<RawSample> {
        let reading = self.readings.pop_front().ok_or(CaptureError::SourceExhausted)?;
        self.reads += 1;
        Ok(reading)
    }
}
