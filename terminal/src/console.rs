//! Console output sink.
//!
//! Commands write to an append-only byte stream. On target this is the
//! terminal; tests and the host runner capture it in a [`BufferConsole`].

use alloc::string::String;
use alloc::vec::Vec;

/// Append-only console stream.
pub trait Console {
    /// Append raw bytes.
    fn write_bytes(&mut self, bytes: &[u8]);

    fn write_str(&mut self, s: &str) {
        self.write_bytes(s.as_bytes());
    }

    fn write_line(&mut self, s: &str) {
        self.write_bytes(s.as_bytes());
        self.write_bytes(b"\n");
    }
}

impl<C: Console + ?Sized> Console for &mut C {
    fn write_bytes(&mut self, bytes: &[u8]) {
        (**self).write_bytes(bytes);
    }
}

/// Console that keeps everything written to it.
#[derive(Debug, Default, Clone)]
pub struct BufferConsole {
    buf: Vec<u8>,
}

impl BufferConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Output decoded as UTF-8, invalid sequences replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.buf).into_owned()
    }

    /// Output split into lines, trailing newline ignored.
    pub fn lines(&self) -> Vec<String> {
        self.text().lines().map(String::from).collect()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

impl Console for BufferConsole {
    fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }
}
