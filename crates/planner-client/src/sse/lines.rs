/// Carry-over buffer that turns arbitrarily split byte chunks into complete
/// `\n`-terminated logical lines.
///
/// The buffer only ever holds the trailing bytes that have not yet been
/// terminated by a newline. Splitting happens on raw bytes, so a multi-byte
/// UTF-8 character cut across two chunks is reassembled before decoding.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
    // Prefix of `buf` already known to hold no newline.
    scanned: usize,
}

impl LineBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk and returns every line it completed, in order.
    ///
    /// The newline itself is not part of the returned line. Invalid UTF-8 is
    /// decoded lossily; this stage never fails.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        if chunk.is_empty() {
            return Vec::new();
        }
        self.buf.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        let mut from = self.scanned;
        while let Some(offset) = self.buf[from..].iter().position(|b| *b == b'\n') {
            let end = from + offset;
            lines.push(String::from_utf8_lossy(&self.buf[start..end]).into_owned());
            start = end + 1;
            from = start;
        }
        if start > 0 {
            self.buf.drain(..start);
        }
        self.scanned = self.buf.len();
        lines
    }

    /// Consumes the buffer at end-of-stream and returns the residual as a
    /// final line, unless it is empty or whitespace-only.
    pub fn finish(self) -> Option<String> {
        let rest = String::from_utf8_lossy(&self.buf).into_owned();
        if rest.trim().is_empty() {
            None
        } else {
            Some(rest)
        }
    }

    /// Bytes received since the last newline.
    pub fn pending(&self) -> &[u8] {
        &self.buf
    }
}
