use shapewire_buffers::BufferError;
use thiserror::Error;

use crate::cbor::CborError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SerializeError {
    #[error("unsupported: {0}")]
    Unsupported(&'static str),
    #[error("invalid serializer state: {0}")]
    InvalidState(&'static str),
    #[error("cannot format timestamp as {format}: {reason}")]
    Timestamp { format: &'static str, reason: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeserializeError {
    #[error("syntax error at offset {offset}: expected {expected}, found {found}")]
    Syntax {
        offset: usize,
        expected: &'static str,
        found: String,
    },
    #[error("unexpected end of input at offset {offset}: expected {expected}")]
    UnexpectedEof { offset: usize, expected: &'static str },
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("{value} is out of range for {target} [{min}, {max}]")]
    OutOfRange {
        value: String,
        target: &'static str,
        min: String,
        max: String,
    },
    #[error("invalid number {0:?}")]
    InvalidNumber(String),
    #[error("invalid base64 blob: {0}")]
    InvalidBase64(String),
    #[error("invalid {format} timestamp {value:?}")]
    InvalidTimestamp { value: String, format: &'static str },
    #[error("invalid utf-8 at offset {0}")]
    InvalidUtf8(usize),
    #[error("unsupported: {0}")]
    Unsupported(&'static str),
    #[error("invalid deserializer state: {0}")]
    InvalidState(&'static str),
    #[error("union {0} has more than one variant set")]
    UnionVariants(String),
    #[error("containers nested deeper than {0} levels")]
    TooDeep(usize),
    #[error(transparent)]
    Cbor(#[from] CborError),
}

impl From<BufferError> for DeserializeError {
    fn from(err: BufferError) -> Self {
        match err {
            BufferError::EndOfBuffer { offset, .. } => DeserializeError::UnexpectedEof {
                offset,
                expected: "more input",
            },
            BufferError::InvalidUtf8(offset) => DeserializeError::InvalidUtf8(offset),
        }
    }
}

/// A deserialization failure together with the input it happened on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{source} (offset {offset}, remaining input {snapshot:?})")]
pub struct PayloadError {
    pub offset: usize,
    /// Unparsed input from the failure point on, truncated.
    pub snapshot: String,
    pub source: DeserializeError,
}

impl PayloadError {
    /// Maximum number of input bytes kept in a snapshot.
    pub const SNAPSHOT_LEN: usize = 128;

    pub fn new(source: DeserializeError, offset: usize, remaining: &[u8]) -> Self {
        let end = remaining.len().min(Self::SNAPSHOT_LEN);
        Self {
            offset,
            snapshot: String::from_utf8_lossy(&remaining[..end]).into_owned(),
            source,
        }
    }
}
