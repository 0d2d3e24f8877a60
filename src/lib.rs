//! Strum-triggered accelerometer capture
//!
//! This library watches a 3-axis accelerometer for a sudden "strum" gesture,
//! records a fixed-length buffer of motion right after it, and hands that
//! buffer to either a raw-data logger or a learn-then-infer anomaly model.
//!
//! # Quick Start
//!
//! ## Logging captures from a recording
//! ```no_run
//! use strum_capture::{
//!     AcquisitionLoop, CaptureBuffer, DataLogger, ReplaySensor, SampleSource,
//!     TriggerDetector, WriterTransport,
//! };
//!
//! let sensor = ReplaySensor::open("strums.txt")?;
//! let source = SampleSource::new(sensor, 1000.0);
//! let logger = DataLogger::new(WriterTransport::new(std::io::stdout()));
//!
//! let mut acquisition = AcquisitionLoop::new(
//!     source,
//!     TriggerDetector::default(),
//!     CaptureBuffer::new(1024),
//!     logger,
//! );
//! acquisition.run()?;
//! # Ok::<(), strum_capture::CaptureError>(())
//! ```
//!
//! ## Checking for a strum by hand
//! ```
//! use strum_capture::{SampleSource, ScriptedSensor, TriggerDetector};
//!
//! // A quiet reference window followed by a much louder one
//! let mut readings: Vec<[i32; 3]> = (0..5).map(|i| [200 + i, 300 + i, 400 + i]).collect();
//! readings.extend((0..5).map(|i| [900 + i, 900 - i, 950 + i]));
//!
//! let mut source = SampleSource::new(ScriptedSensor::new(readings), 1000.0);
//! let detector = TriggerDetector::default();
//! assert!(detector.check(&mut source)?);
//! # Ok::<(), strum_capture::CaptureError>(())
//! ```
//!
//! ## Learning, then scoring
//! ```no_run
//! use strum_capture::{
//!     AcquisitionLoop, CaptureBuffer, LearnDetectController, LogIndicator, ReplaySensor,
//!     SampleSource, TemplateModel, TriggerDetector, WriterTransport,
//! };
//!
//! let source = SampleSource::new(ReplaySensor::open("strums.txt")?, 1000.0);
//! let controller = LearnDetectController::new(
//!     TemplateModel::new(),
//!     WriterTransport::new(std::io::stdout()),
//!     LogIndicator::new(false),
//!     5,
//!     90,
//! )?;
//!
//! let mut acquisition =
//!     AcquisitionLoop::new(source, TriggerDetector::default(), CaptureBuffer::new(1024), controller);
//! acquisition.run()?;
//! # Ok::<(), strum_capture::CaptureError>(())
//! ```

pub mod acquisition;
pub mod capture;
pub mod config;
pub mod controller;
pub mod error;
pub mod logger;
pub mod model;
pub mod replay;
pub mod sample;
pub mod sensor;
pub mod session;
pub mod status;
pub mod transport;
pub mod trigger;

#[cfg(feature = "ftdi")]
mod ffi;
#[cfg(feature = "ftdi")]
pub mod mpu6050;

// Re-export public API
pub use acquisition::{AcquisitionLoop, Polled, StreamControl, TriggerConsumer};
pub use capture::CaptureBuffer;
pub use config::{AcquisitionConfig, Mode};
pub use controller::{ControllerEvent, LearnDetectController, Phase};
pub use error::{CaptureError, Result};
pub use logger::DataLogger;
pub use model::{AnomalyModel, TemplateModel};
pub use replay::ReplaySensor;
pub use sample::{DuplicatePolicy, Sample, SampleSource, SampleStream};
pub use sensor::{AccelSensor, RawSample, ScriptedSensor};
pub use session::SessionStats;
pub use status::{LogIndicator, StatusIndicator, StatusKind};
pub use transport::{Transport, WriterTransport};
pub use trigger::{TriggerConfig, TriggerDecision, TriggerDetector, TriggerOutcome};

#[cfg(feature = "ftdi")]
pub use mpu6050::Mpu6050;
