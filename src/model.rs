//! Anomaly model collaborator

use crate::capture::CaptureBuffer;
use crate::error::{CaptureError, Result};

/// Highest similarity a model may report
pub const MAX_SIMILARITY: u8 = 100;

/// Learn-then-score anomaly model
///
/// Similarity is 0..=100; higher means closer to what was learned.
pub trait AnomalyModel {
    fn initialize(&mut self) -> Result<()>;

    fn learn(&mut self, buffer: &CaptureBuffer) -> Result<()>;

    fn detect(&mut self, buffer: &CaptureBuffer) -> Result<u8>;
}

impl<M: AnomalyModel + ?Sized> AnomalyModel for Box<M> {
    fn initialize(&mut self) -> Result<()> {
        (**self).initialize()
    }

    fn learn(&mut self, buffer: &CaptureBuffer) -> Result<()> {
        (**self).learn(buffer)
    }

    fn detect(&mut self, buffer: &CaptureBuffer) -> Result<u8> {
        (**self).detect(buffer)
    }
}

/// Mean-template model for running the host pipeline without a vendor library
///
/// Keeps the running mean of every learned buffer and scores a new buffer by
/// its RMS distance from that mean, relative to the mean's own RMS.
#[derive(Debug, Clone, Default)]
pub struct TemplateModel {
    template: Vec<f64>,
    learned: u32,
}

impl TemplateModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn learned(&self) -> u32 {
        self.learned
    }

    fn check_len(&self, flat: &[f32]) -> Result<()> {
        if !self.template.is_empty() && flat.len() != self.template.len() {
            return Err(CaptureError::Model(format!(
                "buffer has {} values, model was trained on {}",
                flat.len(),
                self.template.len()
            )));
        }
        Ok(())
    }
}

impl AnomalyModel for TemplateModel {
    fn initialize(&mut self) -> Result<()> {
        self.template.clear();
        self.learned = 0;
        Ok(())
    }

    fn learn(&mut self, buffer: &CaptureBuffer) -> Result<()> {
        let flat = buffer.flatten();
        self.check_len(&flat)?;

        if self.template.is_empty() {
            self.template = vec![0.0; flat.len()];
        }
        self.learned += 1;
        let n = f64::from(self.learned);
        for (mean, &value) in self.template.iter_mut().zip(&flat) {
            *mean += (f64::from(value) - *mean) / n;
        }
        Ok(())
    }

    fn detect(&mut self, buffer: &CaptureBuffer) -> Result<u8> {
        if self.learned == 0 {
            return Err(CaptureError::Model("detect called before any learning".to_string()));
        }
        let flat = buffer.flatten();
        self.check_len(&flat)?;

        let len = self.template.len().max(1) as f64;
        let error_sq: f64 = self
            .template
            .iter()
            .zip(&flat)
            .map(|(&mean, &value)| (f64::from(value) - mean).powi(2))
            .sum();
        let scale_sq: f64 = self.template.iter().map(|m| m * m).sum();

        let error = (error_sq / len).sqrt();
        let scale = (scale_sq / len).sqrt();

        let similarity = if scale == 0.0 {
            if error == 0.0 {
                1.0
            } else {
                0.0
            }
        } else {
            1.0 - error / scale
        };

        Ok((similarity.clamp(0.0, 1.0) * f64::from(MAX_SIMILARITY)).round() as u8)
    }
}
