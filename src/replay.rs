//! Recorded-data sensor
//!
//! Replays raw accelerometer triples from a text recording so the pipeline
//! can run on the host without hardware. One reading per line, three
//! integers separated by whitespace or commas. Blank lines and lines
//! starting with `#` are skipped.
//!
//! ```text
//! # x y z (mg)
//! 12 -40 1003
//! 15,-38,998
//! ```

use crate::error::{CaptureError, Result};
use crate::sensor::{AccelSensor, RawSample};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

pub struct ReplaySensor<R> {
    reader: R,
    line_no: usize,
    line: String,
    readings: u64,
}

impl ReplaySensor<BufReader<File>> {
    /// Open a recording on disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref()).map_err(|e| {
            CaptureError::Sensor(format!(
                "Failed to open recording {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R: BufRead> ReplaySensor<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            line_no: 0,
            line: String::new(),
            readings: 0,
        }
    }

    /// Readings returned so far
    pub fn readings(&self) -> u64 {
        self.readings
    }

    fn parse_line(&self) -> Result<Option<RawSample>> {
        let text = self.line.trim();
        if text.is_empty() || text.starts_with('#') {
            return Ok(None);
        }

        let mut axes = [0i32; 3];
        let mut fields = text
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|f| !f.is_empty());

        for (axis, slot) in axes.iter_mut().enumerate() {
            let field = fields.next().ok_or_else(|| CaptureError::Replay {
                line: self.line_no,
                reason: format!("expected 3 values, found {}", axis),
            })?;
            *slot = field.parse().map_err(|e| CaptureError::Replay {
                line: self.line_no,
                reason: format!("bad value '{}': {}", field, e),
            })?;
        }

        if fields.next().is_some() {
            return Err(CaptureError::Replay {
                line: self.line_no,
                reason: "more than 3 values".to_string(),
            });
        }

        Ok(Some(RawSample::from(axes)))
    }
}

impl<R: BufRead> AccelSensor for ReplaySensor<R> {
    fn configure(&mut self, output_rate_hz: f32, full_scale_g: f32) -> Result<()> {
        // Recording rate and range were fixed at capture time
        debug!(output_rate_hz, full_scale_g, "replay sensor ignores configuration");
        Ok(())
    }

    fn enable(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_axes(&mut self) -> Result<RawSample> {
        loop {
            self.line.clear();
            let read = self
                .reader
                .read_line(&mut self.line)
                .map_err(|e| CaptureError::Sensor(format!("Failed to read recording: {}", e)))?;
            if read == 0 {
                return Err(CaptureError::SourceExhausted);
            }
            self.line_no += 1;

            if let Some(sample) = self.parse_line()? {
                self.readings += 1;
                return Ok(sample);
            }
        }
    }
}
