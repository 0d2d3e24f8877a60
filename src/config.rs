//! Acquisition settings and their factory defaults

use crate::error::{CaptureError, Result};
use crate::sample::DuplicatePolicy;
use crate::trigger::TriggerConfig;

/// Samples per trigger window
pub const MINI: usize = 5;
/// Ratio the new window must exceed over the reference window
pub const THRESH: f32 = 1.4;
/// Window averages at or below this are treated as rest
pub const NOISE: f32 = 0.15;
/// Similarity scores below this are anomalies
pub const THRESH_SIMILARITY: u8 = 90;
/// Samples per capture buffer
pub const CAPTURE_LEN: usize = 1024;
/// Learning iterations before inference starts
pub const LEARNING_TARGET: u32 = 5;
/// Raw counts per physical unit (mg -> g)
pub const SCALE_DIVISOR: f32 = 1000.0;
/// Accelerometer output data rate
pub const OUTPUT_RATE_HZ: f32 = 3330.0;
/// Accelerometer full-scale range
pub const FULL_SCALE_G: f32 = 4.0;

/// What to do with each captured buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Dump every buffer to the transport
    #[default]
    DataCapture,
    /// Learn a fixed number of buffers, then score the rest
    LearnAndInfer,
}

/// Everything the pipeline needs to know before it starts
#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionConfig {
    pub mode: Mode,
    pub trigger: TriggerConfig,
    pub capture_len: usize,
    pub learning_target: u32,
    pub thresh_similarity: u8,
    pub scale_divisor: f32,
    pub output_rate_hz: f32,
    pub full_scale_g: f32,
    pub duplicate_policy: DuplicatePolicy,
    /// `None` busy-polls forever on a frozen sensor
    pub stall_retries: Option<u64>,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            trigger: TriggerConfig::default(),
            capture_len: CAPTURE_LEN,
            learning_target: LEARNING_TARGET,
            thresh_similarity: THRESH_SIMILARITY,
            scale_divisor: SCALE_DIVISOR,
            output_rate_hz: OUTPUT_RATE_HZ,
            full_scale_g: FULL_SCALE_G,
            duplicate_policy: DuplicatePolicy::default(),
            stall_retries: None,
        }
    }
}

impl AcquisitionConfig {
    /// Reject settings that would make the pipeline meaningless
    ///
    /// The built-in defaults always pass; this exists for values coming from
    /// the command line.
    pub fn validate(&self) -> Result<()> {
        if self.trigger.mini == 0 {
            return Err(CaptureError::InvalidParameter(
                "Window size must be at least 1 sample".to_string(),
            ));
        }
        if !(self.trigger.thresh > 0.0) {
            return Err(CaptureError::InvalidParameter(format!(
                "Trigger ratio must be positive, got {}",
                self.trigger.thresh
            )));
        }
        if !(self.trigger.noise >= 0.0) {
            return Err(CaptureError::InvalidParameter(format!(
                "Noise floor must be non-negative, got {}",
                self.trigger.noise
            )));
        }
        if self.capture_len == 0 {
            return Err(CaptureError::InvalidParameter(
                "Capture length must be at least 1 sample".to_string(),
            ));
        }
        if self.mode == Mode::LearnAndInfer && self.learning_target == 0 {
            return Err(CaptureError::InvalidParameter(
                "Learning target must be at least 1 iteration".to_string(),
            ));
        }
        if self.thresh_similarity > 100 {
            return Err(CaptureError::InvalidParameter(format!(
                "Similarity threshold must be 0-100, got {}",
                self.thresh_similarity
            )));
        }
        if !(self.scale_divisor > 0.0) {
            return Err(CaptureError::InvalidParameter(format!(
                "Scale divisor must be positive, got {}",
                self.scale_divisor
            )));
        }
        if self.stall_retries == Some(0) {
            return Err(CaptureError::InvalidParameter(
                "Stall retry limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_firmware_constants() {
        let config = AcquisitionConfig::default();
        assert_eq!(config.trigger.mini, 5);
        assert_eq!(config.trigger.thresh, 1.4);
        assert_eq!(config.trigger.noise, 0.15);
        assert_eq!(config.capture_len, 1024);
        assert_eq!(config.thresh_similarity, 90);
        assert_eq!(config.duplicate_policy, DuplicatePolicy::AllAxesMustChange);
        assert!(config.stall_retries.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_window() {
        let mut config = AcquisitionConfig::default();
        config.trigger.mini = 0;
        assert!(matches!(config.validate(), Err(CaptureError::InvalidParameter(_))));
    }

    #[test]
    fn test_validate_rejects_nan_ratio() {
        let mut config = AcquisitionConfig::default();
        config.trigger.thresh = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_learning_target_only_matters_in_ai_mode() {
        let mut config = AcquisitionConfig {
            learning_target: 0,
            ..AcquisitionConfig::default()
        };
        assert!(config.validate().is_ok());

        config.mode = Mode::LearnAndInfer;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_similarity_above_100() {
        let config = AcquisitionConfig {
            thresh_similarity: 101,
            ..AcquisitionConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
