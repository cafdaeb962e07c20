use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CborError {
    #[error("unexpected end of input at offset {offset}: needed {needed} bytes, {available} available")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("reserved additional info {minor} for major type {major}")]
    ReservedMinor { major: u8, minor: u8 },
    #[error("indefinite length is not allowed for major type {0}")]
    IndefiniteNotAllowed(u8),
    #[error("map key must be a text string, found major type {major}")]
    NonStringKey { major: u8 },
    #[error("indefinite-length chunk inside an indefinite-length string")]
    NestedIndefinite,
    #[error("chunk of major type {found} inside an indefinite string of major type {expected}")]
    ChunkTypeMismatch { expected: u8, found: u8 },
    #[error("unexpected break")]
    UnexpectedBreak,
    #[error("invalid utf-8 in text string")]
    InvalidUtf8,
    #[error("unsupported simple value {0}")]
    UnsupportedSimple(u8),
    #[error("length {0} does not fit in memory")]
    LengthOverflow(u64),
    #[error("containers nested deeper than {0} levels")]
    TooDeep(usize),
    #[error("{0} trailing bytes after the value")]
    TrailingBytes(usize),
    #[error("{0} has no document representation")]
    NotADocument(&'static str),
}
