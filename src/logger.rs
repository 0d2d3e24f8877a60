//! Data-capture consumer: dumps each buffer to the transport

use crate::acquisition::{StreamControl, TriggerConsumer};
use crate::capture::CaptureBuffer;
use crate::error::Result;
use crate::transport::Transport;
use tracing::debug;

/// Writes every captured buffer as one text line
pub struct DataLogger<T> {
    transport: T,
    buffers: u64,
}

impl<T: Transport> DataLogger<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            buffers: 0,
        }
    }

    /// Buffers written so far
    pub fn buffers(&self) -> u64 {
        self.buffers
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }
}

impl<T: Transport> TriggerConsumer for DataLogger<T> {
    fn on_trigger(&mut self, buffer: &CaptureBuffer) -> Result<StreamControl> {
        self.transport.emit(&buffer.to_log_line())?;
        self.buffers += 1;
        debug!(buffer = self.buffers, samples = buffer.len(), "buffer logged");
        Ok(StreamControl::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::SampleSource;
    use crate::sensor::ScriptedSensor;

    #[test]
    fn test_each_buffer_is_one_line() {
        let sensor = ScriptedSensor::new([[1000, 2000, 3000], [1500, 2500, 3500]]);
        let mut source = SampleSource::new(sensor, 1000.0);
        let mut buffer = CaptureBuffer::new(1);
        let mut logger = DataLogger::new(Vec::<String>::new());

        buffer.fill(&mut source).unwrap();
        logger.on_trigger(&buffer).unwrap();
        buffer.fill(&mut source).unwrap();
        logger.on_trigger(&buffer).unwrap();

        assert_eq!(logger.buffers(), 2);
        assert_eq!(
            logger.into_transport(),
            vec!["1.000 2.000 3.000 \n".to_string(), "1.500 2.500 3.500 \n".to_string()]
        );
    }
}
