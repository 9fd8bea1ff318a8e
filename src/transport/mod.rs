//! Transport layer for serial I/O abstraction

use crate::error::Result;

mod line;
mod mock;
mod serial;

pub use line::LineReader;
pub use mock::MockTransport;
pub use serial::SerialTransport;

/// Transport trait for the testbed serial link
pub trait Transport: Send {
    /// Read data into buffer, returns number of bytes read (0 = no data)
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize>;

    /// Write data from buffer, returns number of bytes written
    fn write(&mut self, data: &[u8]) -> Result<usize>;

    /// Flush any pending writes (blocking until complete)
    fn flush(&mut self) -> Result<()>;

    /// Check if data is available to read
    fn available(&mut self) -> Result<usize> {
        Ok(0) // Default implementation
    }
}
