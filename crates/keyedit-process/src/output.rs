//! Append-only process output buffering.

/// Output buffer for everything a process wrote to one stream.
///
/// Bytes are only ever appended while the process is alive; callers slice
/// logical windows out of it by offset.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    /// Raw bytes received from the stream
    raw_buffer: Vec<u8>,
    /// Set once the stream reached EOF or failed
    eof: bool,
}

impl OutputBuffer {
    /// Create a new output buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append new output to the buffer.
    pub fn append(&mut self, bytes: &[u8]) {
        self.raw_buffer.extend_from_slice(bytes);
    }

    /// Record that no more output will arrive.
    pub fn mark_eof(&mut self) {
        self.eof = true;
    }

    /// Whether the stream has closed.
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// Get current buffer size.
    pub fn size(&self) -> usize {
        self.raw_buffer.len()
    }

    /// Find the first complete line equal to `marker` at or after `from`.
    ///
    /// `from` must be the start of a line. Returns the byte range of the
    /// line including its terminating newline. A trailing `\r` is ignored.
    pub fn find_line(&self, marker: &str, from: usize) -> Option<(usize, usize)> {
        let marker = marker.as_bytes();
        let mut start = from.min(self.raw_buffer.len());

        while let Some(rel) = self.raw_buffer[start..].iter().position(|&b| b == b'\n') {
            let end = start + rel;
            let line = &self.raw_buffer[start..end];
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            if line == marker {
                return Some((start, end + 1));
            }
            start = end + 1;
        }

        None
    }

    /// Text between two offsets (lossy UTF-8).
    pub fn slice(&self, start: usize, end: usize) -> String {
        let end = end.min(self.raw_buffer.len());
        let start = start.min(end);
        String::from_utf8_lossy(&self.raw_buffer[start..end]).into_owned()
    }

    /// Text from `start` to the end of the buffer.
    pub fn slice_from(&self, start: usize) -> String {
        self.slice(start, self.raw_buffer.len())
    }

    /// Full accumulated text.
    pub fn text(&self) -> String {
        self.slice_from(0)
    }
}
