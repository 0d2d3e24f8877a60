//! Fixed-length capture buffer filled after each trigger

use crate::error::Result;
use crate::sample::{Sample, SampleStream};

/// Number of axes per sample in the flattened layout
pub const AXIS_NUMBER: usize = 3;

/// A fixed number of consecutive samples recorded after a trigger
///
/// The length is set at construction and never changes. Every `fill`
/// overwrites the whole buffer.
#[derive(Debug, Clone)]
pub struct CaptureBuffer {
    samples: Box<[Sample]>,
    filled: bool,
}

impl CaptureBuffer {
    pub fn new(capture_len: usize) -> Self {
        Self {
            samples: vec![Sample::default(); capture_len].into_boxed_slice(),
            filled: false,
        }
    }

    /// Draw exactly `capacity()` samples from `stream`, in arrival order
    ///
    /// Blocks for as long as the stream does. If the stream fails part way
    /// the buffer is left marked unfilled.
    pub fn fill<St: SampleStream>(&mut self, stream: &mut St) -> Result<&Self> {
        self.filled = false;
        for slot in self.samples.iter_mut() {
            *slot = stream.next_sample()?;
        }
        self.filled = true;
        Ok(self)
    }

    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// True once a fill has completed
    pub fn is_filled(&self) -> bool {
        self.filled
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Stride-3 layout: x0 y0 z0 x1 y1 z1 ...
    pub fn flatten(&self) -> Vec<f32> {
        self.samples.iter().flat_map(|s| s.axes()).collect()
    }

    /// Serial dump format: every scalar as `{:.3}` followed by a space, then one newline
    pub fn to_log_line(&self) -> String {
        let mut line: String = self
            .samples
            .iter()
            .flat_map(|s| s.axes())
            .map(|value| format!("{:.3} ", value))
            .collect();
        line.push('\n');
        line
    }
}
