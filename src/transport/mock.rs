//! In-memory transport for testing
//!
//! Both directions of a fake serial link. Clones share the same
//! buffers, so a test keeps one handle to script the controller side
//! while the app under test owns the other: bytes injected here come
//! out of `read`, and everything the app writes stays inspectable.

use super::Transport;
use crate::error::Result;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct LinkBuffers {
    /// Bytes waiting to be read by the app
    rx: VecDeque<u8>,
    /// Everything the app has written
    tx: Vec<u8>,
}

/// Scriptable serial link for unit tests
#[derive(Clone, Default)]
pub struct MockTransport {
    link: Arc<Mutex<LinkBuffers>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes for the app to read
    pub fn inject_read(&self, data: &[u8]) {
        self.link.lock().unwrap().rx.extend(data);
    }

    /// Everything written so far, as raw bytes
    pub fn get_written(&self) -> Vec<u8> {
        self.link.lock().unwrap().tx.clone()
    }

    /// Everything written so far, decoded for line assertions
    pub fn written_text(&self) -> String {
        String::from_utf8_lossy(&self.link.lock().unwrap().tx).into_owned()
    }

    /// Forget previous output, keeping pending input
    pub fn clear_written(&self) {
        self.link.lock().unwrap().tx.clear();
    }
}

impl Transport for MockTransport {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let mut link = self.link.lock().unwrap();
        let n = link.rx.len().min(buffer.len());
        for (slot, byte) in buffer.iter_mut().zip(link.rx.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        self.link.lock().unwrap().tx.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
