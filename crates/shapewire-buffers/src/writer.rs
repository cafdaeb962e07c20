//! Growable text output buffer.

/// An output buffer that grows as needed.
///
/// # Example
///
/// ```
/// use shapewire_buffers::Writer;
///
/// let mut writer = Writer::new();
/// writer.u8(b'[');
/// writer.ascii("1,2");
/// writer.u8(b']');
/// assert_eq!(writer.flush(), b"[1,2]");
/// ```
#[derive(Debug, Clone)]
pub struct Writer {
    uint8: Vec<u8>,
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer {
    const ALLOC_SIZE: usize = 4 * 1024;

    pub fn new() -> Self {
        Self {
            uint8: Vec::with_capacity(Self::ALLOC_SIZE),
        }
    }

    /// Returns the bytes written since the last flush and starts a fresh
    /// buffer.
    pub fn flush(&mut self) -> Vec<u8> {
        std::mem::replace(&mut self.uint8, Vec::with_capacity(Self::ALLOC_SIZE))
    }

    #[inline]
    pub fn u8(&mut self, val: u8) {
        self.uint8.push(val);
    }

    /// Writes a UTF-8 string, returns the number of bytes written.
    pub fn utf8(&mut self, s: &str) -> usize {
        self.uint8.extend_from_slice(s.as_bytes());
        s.len()
    }

    pub fn ascii(&mut self, s: &str) {
        debug_assert!(s.is_ascii());
        self.uint8.extend_from_slice(s.as_bytes());
    }
}
