//! Error types for the strum capture pipeline

use thiserror::Error;

#[cfg(feature = "ftdi")]
use crate::ffi::{status_to_string, FT_STATUS, FT_OK};

/// Error type for acquisition operations
///
/// The trigger and capture logic itself never fails; every variant here comes
/// from a collaborator (sensor, transport, model) or from user-supplied
/// configuration.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// Sensor kept repeating axis values past the configured retry limit
    #[error("Sensor stalled: {attempts} consecutive reads rejected as duplicates")]
    SensorStalled { attempts: u64 },

    /// Recorded or scripted sensor ran out of samples
    #[error("Sample source exhausted")]
    SourceExhausted,

    /// Sensor collaborator failure
    #[error("Sensor error: {0}")]
    Sensor(String),

    /// Malformed replay row
    #[error("Replay error at line {line}: {reason}")]
    Replay { line: usize, reason: String },

    /// Transport (serial/stdout) write failure
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// Anomaly model failure
    #[error("Model error: {0}")]
    Model(String),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// FTDI driver error
    #[cfg(feature = "ftdi")]
    #[error("FTDI error: {status} ({description})")]
    FtdiError {
        status: FT_STATUS,
        description: String,
    },

    /// No I2C channels found
    #[cfg(feature = "ftdi")]
    #[error("No I2C channels found")]
    NoChannelsFound,

    /// Invalid channel index
    #[cfg(feature = "ftdi")]
    #[error("Invalid channel index: {0}")]
    InvalidChannel(u32),

    /// Invalid WHO_AM_I response
    #[cfg(feature = "ftdi")]
    #[error("Invalid WHO_AM_I response: expected 0x68, got 0x{0:02X}")]
    InvalidDeviceId(u8),
}

#[cfg(feature = "ftdi")]
impl CaptureError {
    /// Map a libMPSSE status code, treating `FT_OK` as success
    pub(crate) fn check_status(status: FT_STATUS) -> Result<()> {
        if status == FT_OK {
            Ok(())
        } else {
            Err(CaptureError::FtdiError {
                status,
                description: status_to_string(status).to_string(),
            })
        }
    }
}

/// Result type for acquisition operations
pub type Result<T> = std::result::Result<T, CaptureError>;
