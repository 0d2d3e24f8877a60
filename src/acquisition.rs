//! Trigger polling loop
//!
//! [`AcquisitionLoop`] owns the whole pipeline: the sample source, the
//! trigger detector, the capture buffer and whichever consumer the run was
//! configured with. Everything runs on the calling thread and every call
//! runs to completion; a capture in progress cannot be interrupted.

use crate::capture::CaptureBuffer;
use crate::error::Result;
use crate::sample::SampleSource;
use crate::sensor::AccelSensor;
use crate::session::SessionStats;
use crate::trigger::TriggerDetector;
use tracing::{debug, info};

/// Control flow returned by trigger consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamControl {
    /// Keep polling
    Continue,
    /// Stop the loop after this capture
    Break,
}

/// Receives every filled capture buffer
pub trait TriggerConsumer {
    fn on_trigger(&mut self, buffer: &CaptureBuffer) -> Result<StreamControl>;
}

impl<C: TriggerConsumer + ?Sized> TriggerConsumer for Box<C> {
    fn on_trigger(&mut self, buffer: &CaptureBuffer) -> Result<StreamControl> {
        (**self).on_trigger(buffer)
    }
}

/// Result of a single poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polled {
    /// Trigger check did not fire
    Idle,
    /// Fired, captured and dispatched
    Triggered(StreamControl),
}

pub struct AcquisitionLoop<S, C> {
    source: SampleSource<S>,
    detector: TriggerDetector,
    buffer: CaptureBuffer,
    consumer: C,
    stats: SessionStats,
}

impl<S: AccelSensor, C: TriggerConsumer> AcquisitionLoop<S, C> {
    pub fn new(
        source: SampleSource<S>,
        detector: TriggerDetector,
        buffer: CaptureBuffer,
        consumer: C,
    ) -> Self {
        Self {
            source,
            detector,
            buffer,
            consumer,
            stats: SessionStats::new(),
        }
    }

    /// One trigger check, plus a capture and dispatch if it fired
    pub fn poll(&mut self) -> Result<Polled> {
        let fired = self.detector.check(&mut self.source)?;
        self.stats.record_check(fired);
        if !fired {
            return Ok(Polled::Idle);
        }

        info!(trigger = self.stats.triggers(), "strum detected, capturing");
        self.buffer.fill(&mut self.source)?;
        debug!(
            samples = self.buffer.len(),
            rejected_reads = self.source.rejected(),
            "capture complete"
        );

        let control = self.consumer.on_trigger(&self.buffer)?;
        Ok(Polled::Triggered(control))
    }

    /// Poll until the consumer asks to stop
    ///
    /// Returns the number of captures dispatched. With consumers that always
    /// continue this only returns on error.
    pub fn run(&mut self) -> Result<u64> {
        self.run_while(|_| true)
    }

    /// Poll while `keep_going` holds, checking it between polls only
    pub fn run_while<F>(&mut self, mut keep_going: F) -> Result<u64>
    where
        F: FnMut(&SessionStats) -> bool,
    {
        let mut captures = 0u64;
        while keep_going(&self.stats) {
            if let Polled::Triggered(control) = self.poll()? {
                captures += 1;
                if control == StreamControl::Break {
                    break;
                }
            }
        }
        Ok(captures)
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn source(&self) -> &SampleSource<S> {
        &self.source
    }

    pub fn buffer(&self) -> &CaptureBuffer {
        &self.buffer
    }

    pub fn consumer(&self) -> &C {
        &self.consumer
    }

    pub fn into_parts(self) -> (SampleSource<S>, C) {
        (self.source, self.consumer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CaptureError;
    use crate::sensor::{RawSample, ScriptedSensor};
    use crate::trigger::TriggerConfig;

    /// Stops after `limit` captures and remembers the first sample of each
    struct StopAfter {
        limit: usize,
        firsts: Vec<f32>,
    }

    impl TriggerConsumer for StopAfter {
        fn on_trigger(&mut self, buffer: &CaptureBuffer) -> Result<StreamControl> {
            self.firsts.push(buffer.samples()[0].x);
            if self.firsts.len() >= self.limit {
                Ok(StreamControl::Break)
            } else {
                Ok(StreamControl::Continue)
            }
        }
    }

    /// `n` readings hovering around `level` with every axis changing each step
    fn steady(level: i32, n: usize, phase: i32) -> Vec<RawSample> {
        (0..n as i32)
            .map(|i| {
                let d = if (i + phase) % 2 == 0 { 1 } else { -1 };
                RawSample::new(level + d, level - d, level + 2 * d)
            })
            .collect()
    }

    fn quiet_then_strum(mini: usize, capture: usize) -> Vec<RawSample> {
        let mut readings = steady(200, mini, 0);
        readings.extend(steady(600, mini, 1));
        readings.extend(steady(900, capture, 0));
        readings
    }

    fn detector(mini: usize) -> TriggerDetector {
        TriggerDetector::new(TriggerConfig {
            mini,
            ..TriggerConfig::default()
        })
    }

    #[test]
    fn test_poll_idle_consumes_one_check() {
        let sensor = ScriptedSensor::new(steady(500, 20, 0));
        let source = SampleSource::new(sensor, 1000.0);
        let consumer = StopAfter { limit: 1, firsts: vec![] };
        let mut acq = AcquisitionLoop::new(source, detector(5), CaptureBuffer::new(4), consumer);

        assert_eq!(acq.poll().unwrap(), Polled::Idle);
        assert_eq!(acq.source().accepted(), 10);
        assert_eq!(acq.stats().checks(), 1);
        assert_eq!(acq.stats().triggers(), 0);
    }

    #[test]
    fn test_poll_fires_then_captures() {
        let sensor = ScriptedSensor::new(quiet_then_strum(5, 4));
        let source = SampleSource::new(sensor, 1000.0);
        let consumer = StopAfter { limit: 1, firsts: vec![] };
        let mut acq = AcquisitionLoop::new(source, detector(5), CaptureBuffer::new(4), consumer);

        assert_eq!(acq.poll().unwrap(), Polled::Triggered(StreamControl::Break));
        assert_eq!(acq.source().accepted(), 14);
        assert!(acq.buffer().is_filled());
        assert!((acq.consumer().firsts[0] - 0.901).abs() < 1e-6);
    }

    #[test]
    fn test_run_stops_on_break() {
        let mut readings = quiet_then_strum(5, 4);
        readings.extend(quiet_then_strum(5, 4));
        readings.extend(quiet_then_strum(5, 4));
        let source = SampleSource::new(ScriptedSensor::new(readings), 1000.0);
        let consumer = StopAfter { limit: 2, firsts: vec![] };
        let mut acq = AcquisitionLoop::new(source, detector(5), CaptureBuffer::new(4), consumer);

        assert_eq!(acq.run().unwrap(), 2);
        assert_eq!(acq.stats().triggers(), 2);
        // Third strum never read
        assert_eq!(acq.source().sensor().remaining(), 14);
    }

    #[test]
    fn test_run_while_checks_between_polls() {
        let source = SampleSource::new(ScriptedSensor::new(steady(500, 100, 0)), 1000.0);
        let consumer = StopAfter { limit: 1, firsts: vec![] };
        let mut acq = AcquisitionLoop::new(source, detector(5), CaptureBuffer::new(4), consumer);

        let mut polls = 0;
        let captures = acq
            .run_while(|_| {
                polls += 1;
                polls <= 3
            })
            .unwrap();
        assert_eq!(captures, 0);
        assert_eq!(acq.stats().checks(), 3);
        assert_eq!(acq.source().accepted(), 30);
    }

    #[test]
    fn test_run_surfaces_source_exhaustion() {
        let source = SampleSource::new(ScriptedSensor::new(steady(500, 25, 0)), 1000.0);
        let consumer = StopAfter { limit: 1, firsts: vec![] };
        let mut acq = AcquisitionLoop::new(source, detector(5), CaptureBuffer::new(4), consumer);

        assert!(matches!(acq.run(), Err(CaptureError::SourceExhausted)));
        assert_eq!(acq.stats().checks(), 2);
    }
}
