//! Byte buffers for the shapewire codecs.
//!
//! [`Writer`] is the growable output buffer the JSON serializer writes into;
//! [`Reader`] is the bounds-checked input cursor its deserializer reads from.

mod reader;
mod writer;

pub use reader::Reader;
pub use writer::Writer;

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    #[error("unexpected end of buffer at offset {offset} (needed {needed} more bytes)")]
    EndOfBuffer { offset: usize, needed: usize },
    #[error("invalid utf-8 at offset {0}")]
    InvalidUtf8(usize),
}
