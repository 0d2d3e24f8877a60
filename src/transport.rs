//! Text output collaborator (serial port on the device, stdout on the host)

use crate::error::Result;
use std::io::Write;

/// Sink for data lines
pub trait Transport {
    /// Send `text` exactly as given; callers include the trailing newline
    fn emit(&mut self, text: &str) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn emit(&mut self, text: &str) -> Result<()> {
        (**self).emit(text)
    }
}

/// Collects every emitted chunk, mainly for tests
impl Transport for Vec<String> {
    fn emit(&mut self, text: &str) -> Result<()> {
        self.push(text.to_string());
        Ok(())
    }
}

/// Transport over any `std::io::Write`, flushed after every emit
#[derive(Debug)]
pub struct WriterTransport<W: Write> {
    inner: W,
    bytes_written: u64,
}

impl<W: Write> WriterTransport<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            bytes_written: 0,
        }
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Transport for WriterTransport<W> {
    fn emit(&mut self, text: &str) -> Result<()> {
        self.inner.write_all(text.as_bytes())?;
        self.inner.flush()?;
        self.bytes_written += text.len() as u64;
        Ok(())
    }
}
