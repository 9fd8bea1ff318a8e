//! Byte stream to line assembly
//!
//! The command protocol is line-oriented while the transport hands out
//! arbitrary byte chunks. `LineReader` buffers bytes until a newline,
//! strips the terminator (and a preceding carriage return), and yields
//! whole lines. Oversized lines are discarded whole, the same way the
//! firmware serial driver drops on buffer overflow.

use super::Transport;
use crate::error::Result;

/// Longest accepted line, terminator excluded
const MAX_LINE_LEN: usize = 127;

/// Accumulates transport bytes into protocol lines
pub struct LineReader {
    buffer: Vec<u8>,
    overflowed: bool,
}

impl LineReader {
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(MAX_LINE_LEN),
            overflowed: false,
        }
    }

    /// Pull available bytes from the transport and return any lines
    /// completed by them
    pub fn poll(&mut self, transport: &mut dyn Transport) -> Result<Vec<String>> {
        let mut chunk = [0u8; 64];
        let mut lines = Vec::new();

        loop {
            let n = transport.read(&mut chunk)?;
            if n == 0 {
                break;
            }
            for &byte in &chunk[..n] {
                if let Some(line) = self.push_byte(byte) {
                    lines.push(line);
                }
            }
        }

        Ok(lines)
    }

    fn push_byte(&mut self, byte: u8) -> Option<String> {
        if byte == b'\n' {
            let complete = !self.overflowed;
            let line = String::from_utf8_lossy(&self.buffer).into_owned();
            self.buffer.clear();
            self.overflowed = false;
            return complete.then_some(line);
        }
        if byte == b'\r' {
            return None;
        }
        if self.buffer.len() >= MAX_LINE_LEN {
            if !self.overflowed {
                log::warn!("Serial line exceeds {} bytes, discarding", MAX_LINE_LEN);
            }
            self.overflowed = true;
            return None;
        }
        if !self.overflowed {
            self.buffer.push(byte);
        }
        None
    }
}

impl Default for LineReader {
    fn default() -> Self {
        Self::new()
    }
}
