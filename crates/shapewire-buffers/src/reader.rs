//! Bounds-checked input cursor.

use std::str;

use crate::BufferError;

/// A cursor over a byte slice. Every read checks bounds and reports the
/// offset it failed at.
///
/// # Example
///
/// ```
/// use shapewire_buffers::Reader;
///
/// let mut reader = Reader::new(b"[1]");
/// assert_eq!(reader.peek(), Some(b'['));
/// assert_eq!(reader.try_u8().unwrap(), b'[');
/// assert_eq!(reader.try_buf(2).unwrap(), b"1]");
/// assert_eq!(reader.peek(), None);
/// ```
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    uint8: &'a [u8],
    x: usize,
}

impl<'a> Reader<'a> {
    pub fn new(uint8: &'a [u8]) -> Self {
        Self { uint8, x: 0 }
    }

    /// Current cursor position.
    pub fn x(&self) -> usize {
        self.x
    }

    fn size(&self) -> usize {
        self.uint8.len() - self.x
    }

    /// Unread input.
    pub fn remaining(&self) -> &'a [u8] {
        &self.uint8[self.x..]
    }

    #[inline]
    fn check(&self, size: usize) -> Result<(), BufferError> {
        if size > self.size() {
            Err(BufferError::EndOfBuffer {
                offset: self.x,
                needed: size - self.size(),
            })
        } else {
            Ok(())
        }
    }

    /// The byte at the cursor, `None` at end of input.
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.uint8.get(self.x).copied()
    }

    /// The byte `offset` positions past the cursor.
    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.uint8.get(self.x + offset).copied()
    }

    #[inline]
    pub fn try_u8(&mut self) -> Result<u8, BufferError> {
        self.check(1)?;
        let val = self.uint8[self.x];
        self.x += 1;
        Ok(val)
    }

    /// Advances while `pred` holds, returns the number of bytes skipped.
    pub fn skip_while(&mut self, mut pred: impl FnMut(u8) -> bool) -> usize {
        let start = self.x;
        while let Some(b) = self.peek() {
            if !pred(b) {
                break;
            }
            self.x += 1;
        }
        self.x - start
    }

    pub fn try_buf(&mut self, size: usize) -> Result<&'a [u8], BufferError> {
        self.check(size)?;
        let bin = &self.uint8[self.x..self.x + size];
        self.x += size;
        Ok(bin)
    }

    pub fn try_utf8(&mut self, size: usize) -> Result<&'a str, BufferError> {
        let start = self.x;
        let bin = self.try_buf(size)?;
        str::from_utf8(bin).map_err(|e| BufferError::InvalidUtf8(start + e.valid_up_to()))
    }

    /// Returns `true` and advances past `literal` when the input continues
    /// with it; leaves the cursor untouched otherwise.
    pub fn eat(&mut self, literal: &[u8]) -> bool {
        if self.remaining().starts_with(literal) {
            self.x += literal.len();
            true
        } else {
            false
        }
    }
}
