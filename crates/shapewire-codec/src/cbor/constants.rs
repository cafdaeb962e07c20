pub const MAJOR_UNSIGNED: u8 = 0;
pub const MAJOR_NEGATIVE: u8 = 1;
pub const MAJOR_BYTES: u8 = 2;
pub const MAJOR_TEXT: u8 = 3;
pub const MAJOR_ARRAY: u8 = 4;
pub const MAJOR_MAP: u8 = 5;
pub const MAJOR_TAG: u8 = 6;
pub const MAJOR_SIMPLE: u8 = 7;

/// Additional info marking an indefinite length (or a break in major 7).
pub const MINOR_INDEFINITE: u8 = 31;
pub const BREAK: u8 = 0xff;

pub const SIMPLE_FALSE: u8 = 20;
pub const SIMPLE_TRUE: u8 = 21;
pub const SIMPLE_NULL: u8 = 22;
pub const SIMPLE_UNDEFINED: u8 = 23;
pub const SIMPLE_ONE_BYTE: u8 = 24;
pub const FLOAT_HALF: u8 = 25;
pub const FLOAT_SINGLE: u8 = 26;
pub const FLOAT_DOUBLE: u8 = 27;

/// Upper bound on up-front allocation for a definite-length container;
/// the declared length is untrusted.
pub const PREALLOC_CAP: usize = 1024;

pub const TAG_POSITIVE_BIGNUM: u64 = 2;
pub const TAG_NEGATIVE_BIGNUM: u64 = 3;
pub const TAG_DECIMAL_FRACTION: u64 = 4;
