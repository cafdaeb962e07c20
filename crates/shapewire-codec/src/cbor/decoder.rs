//! CBOR (RFC 8949) decoder.
//!
//! Every function takes the input starting at the item it decodes and returns
//! the number of bytes it consumed; containers decode their children from
//! forward sub-slices. A `Span` travels along with each sub-slice so errors
//! report absolute offsets and nesting stops at [`MAX_DEPTH`].

use std::str;

use super::constants::*;
use super::{CborError, Value};
use crate::MAX_DEPTH;

type Result<T> = std::result::Result<T, CborError>;

/// Where a sub-slice sits in the whole payload.
#[derive(Debug, Clone, Copy)]
struct Span {
    /// Absolute offset of the sub-slice's first byte.
    at: usize,
    /// Arrays, maps and tags enclosing it.
    depth: usize,
}

impl Span {
    const ROOT: Span = Span { at: 0, depth: 0 };

    fn advance(self, by: usize) -> Self {
        Span {
            at: self.at + by,
            ..self
        }
    }

    fn descend(self) -> Result<Self> {
        if self.depth == MAX_DEPTH {
            return Err(CborError::TooDeep(MAX_DEPTH));
        }
        Ok(Span {
            depth: self.depth + 1,
            ..self
        })
    }
}

fn eof(at: usize, needed: usize, input: &[u8]) -> CborError {
    CborError::UnexpectedEof {
        offset: at,
        needed,
        available: input.len(),
    }
}

fn array<const N: usize>(input: &[u8], at: usize) -> Result<[u8; N]> {
    input
        .get(..N)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or_else(|| eof(at, N, input))
}

fn take(input: &[u8], len: usize, at: usize) -> Result<&[u8]> {
    input.get(..len).ok_or_else(|| eof(at, len, input))
}

fn length(arg: u64) -> Result<usize> {
    usize::try_from(arg).map_err(|_| CborError::LengthOverflow(arg))
}

/// Decodes the argument of an item whose initial byte carried `minor`.
/// `input` starts right after the initial byte; returns the argument and the
/// number of extra bytes it occupied.
pub fn decode_argument(major: u8, minor: u8, input: &[u8]) -> Result<(u64, usize)> {
    argument(major, minor, input, 0)
}

fn argument(major: u8, minor: u8, input: &[u8], at: usize) -> Result<(u64, usize)> {
    match minor {
        0..=23 => Ok((minor.into(), 0)),
        24 => Ok((array::<1>(input, at)?[0].into(), 1)),
        25 => Ok((u16::from_be_bytes(array(input, at)?).into(), 2)),
        26 => Ok((u32::from_be_bytes(array(input, at)?).into(), 4)),
        27 => Ok((u64::from_be_bytes(array(input, at)?), 8)),
        28..=30 => Err(CborError::ReservedMinor { major, minor }),
        _ => Err(CborError::IndefiniteNotAllowed(major)),
    }
}

/// Decodes one data item from the front of `input`.
///
/// Returns the item and the number of bytes it occupied; bytes after it are
/// left alone.
pub fn decode(input: &[u8]) -> Result<(Value, usize)> {
    item(input, Span::ROOT)
}

/// Decodes exactly one data item spanning all of `input`.
pub fn decode_exact(input: &[u8]) -> Result<Value> {
    let (value, used) = decode(input)?;
    match input.len() - used {
        0 => Ok(value),
        trailing => Err(CborError::TrailingBytes(trailing)),
    }
}

fn item(input: &[u8], span: Span) -> Result<(Value, usize)> {
    let initial = *input.first().ok_or_else(|| eof(span.at, 1, input))?;
    let major = initial >> 5;
    let minor = initial & 0x1f;
    let rest = &input[1..];
    let span = span.advance(1);
    let (value, used) = if major == MAJOR_SIMPLE {
        simple(minor, rest, span.at)?
    } else if minor == MINOR_INDEFINITE {
        indefinite(major, rest, span)?
    } else {
        let (arg, n) = argument(major, minor, rest, span.at)?;
        let (value, used) = definite(major, arg, &rest[n..], span.advance(n))?;
        (value, n + used)
    };
    Ok((value, 1 + used))
}

fn definite(major: u8, arg: u64, body: &[u8], span: Span) -> Result<(Value, usize)> {
    match major {
        MAJOR_UNSIGNED => Ok((Value::Unsigned(arg), 0)),
        MAJOR_NEGATIVE => Ok((Value::Negative(-1 - i128::from(arg)), 0)),
        MAJOR_BYTES => {
            let len = length(arg)?;
            Ok((Value::Bytes(take(body, len, span.at)?.to_vec()), len))
        }
        MAJOR_TEXT => {
            let len = length(arg)?;
            let bytes = take(body, len, span.at)?;
            let text = str::from_utf8(bytes).map_err(|_| CborError::InvalidUtf8)?;
            Ok((Value::Text(text.to_owned()), len))
        }
        MAJOR_ARRAY => {
            let inner = span.descend()?;
            let count = length(arg)?;
            let mut items = Vec::with_capacity(count.min(PREALLOC_CAP));
            let mut offset = 0;
            for _ in 0..count {
                let (value, used) = item(&body[offset..], inner.advance(offset))?;
                items.push(value);
                offset += used;
            }
            Ok((Value::Array(items), offset))
        }
        MAJOR_MAP => {
            let inner = span.descend()?;
            let count = length(arg)?;
            let mut pairs = Vec::with_capacity(count.min(PREALLOC_CAP));
            let mut offset = 0;
            for _ in 0..count {
                let (entry, used) = pair(&body[offset..], inner.advance(offset))?;
                pairs.push(entry);
                offset += used;
            }
            Ok((Value::Map(pairs), offset))
        }
        _ => {
            debug_assert_eq!(major, MAJOR_TAG);
            let (value, used) = item(body, span.descend()?)?;
            Ok((Value::Tag(arg, Box::new(value)), used))
        }
    }
}

fn pair(input: &[u8], span: Span) -> Result<((String, Value), usize)> {
    let initial = *input.first().ok_or_else(|| eof(span.at, 1, input))?;
    if initial >> 5 != MAJOR_TEXT {
        return Err(CborError::NonStringKey { major: initial >> 5 });
    }
    let (key, key_len) = item(input, span)?;
    let Value::Text(key) = key else {
        return Err(CborError::NonStringKey { major: MAJOR_TEXT });
    };
    let (value, value_len) = item(&input[key_len..], span.advance(key_len))?;
    Ok(((key, value), key_len + value_len))
}

fn indefinite(major: u8, body: &[u8], span: Span) -> Result<(Value, usize)> {
    match major {
        MAJOR_BYTES => {
            let (bytes, used) = chunks(major, body, span.at)?;
            Ok((Value::Bytes(bytes), used))
        }
        MAJOR_TEXT => {
            let (bytes, used) = chunks(major, body, span.at)?;
            let text = String::from_utf8(bytes).map_err(|_| CborError::InvalidUtf8)?;
            Ok((Value::Text(text), used))
        }
        MAJOR_ARRAY => {
            let inner = span.descend()?;
            let mut items = Vec::new();
            let mut offset = 0;
            while body.get(offset) != Some(&BREAK) {
                let (value, used) = item(&body[offset..], inner.advance(offset))?;
                items.push(value);
                offset += used;
            }
            Ok((Value::Array(items), offset + 1))
        }
        MAJOR_MAP => {
            let inner = span.descend()?;
            let mut pairs = Vec::new();
            let mut offset = 0;
            while body.get(offset) != Some(&BREAK) {
                let (entry, used) = pair(&body[offset..], inner.advance(offset))?;
                pairs.push(entry);
                offset += used;
            }
            Ok((Value::Map(pairs), offset + 1))
        }
        _ => Err(CborError::IndefiniteNotAllowed(major)),
    }
}

/// Concatenates definite-length chunks of `major` up to the break.
fn chunks(major: u8, body: &[u8], at: usize) -> Result<(Vec<u8>, usize)> {
    let mut out = Vec::new();
    let mut offset = 0;
    loop {
        let initial = *body
            .get(offset)
            .ok_or_else(|| eof(at + offset, 1, &body[offset..]))?;
        if initial == BREAK {
            return Ok((out, offset + 1));
        }
        let (chunk_major, minor) = (initial >> 5, initial & 0x1f);
        if chunk_major != major {
            return Err(CborError::ChunkTypeMismatch {
                expected: major,
                found: chunk_major,
            });
        }
        if minor == MINOR_INDEFINITE {
            return Err(CborError::NestedIndefinite);
        }
        let rest = &body[offset + 1..];
        let (arg, n) = argument(major, minor, rest, at + offset + 1)?;
        let len = length(arg)?;
        let chunk = take(&rest[n..], len, at + offset + 1 + n)?;
        if major == MAJOR_TEXT && str::from_utf8(chunk).is_err() {
            return Err(CborError::InvalidUtf8);
        }
        out.extend_from_slice(chunk);
        offset += 1 + n + len;
    }
}

fn simple(minor: u8, rest: &[u8], at: usize) -> Result<(Value, usize)> {
    match minor {
        SIMPLE_FALSE => Ok((Value::Bool(false), 0)),
        SIMPLE_TRUE => Ok((Value::Bool(true), 0)),
        SIMPLE_NULL => Ok((Value::Null, 0)),
        SIMPLE_UNDEFINED => Ok((Value::Undefined, 0)),
        SIMPLE_ONE_BYTE => Err(CborError::UnsupportedSimple(array::<1>(rest, at)?[0])),
        FLOAT_HALF => Ok((Value::Float32(f16_to_f32(u16::from_be_bytes(array(rest, at)?))), 2)),
        FLOAT_SINGLE => Ok((Value::Float32(f32::from_be_bytes(array(rest, at)?)), 4)),
        FLOAT_DOUBLE => Ok((Value::Float64(f64::from_be_bytes(array(rest, at)?)), 8)),
        28..=30 => Err(CborError::ReservedMinor {
            major: MAJOR_SIMPLE,
            minor,
        }),
        MINOR_INDEFINITE => Err(CborError::UnexpectedBreak),
        _ => Err(CborError::UnsupportedSimple(minor)),
    }
}

/// IEEE 754 binary16 to binary32. Every half value is exactly representable,
/// subnormals come out normalized and NaN payloads are kept.
pub fn f16_to_f32(half: u16) -> f32 {
    let sign = u32::from(half >> 15) << 31;
    let exponent = u32::from((half >> 10) & 0x1f);
    let mantissa = u32::from(half & 0x3ff);
    let bits = match (exponent, mantissa) {
        (0, 0) => sign,
        (0, _) => {
            // shift the leading one into the implicit bit position
            let shift = mantissa.leading_zeros() - 21;
            sign | ((113 - shift) << 23) | (((mantissa << shift) & 0x3ff) << 13)
        }
        (0x1f, _) => sign | 0x7f80_0000 | (mantissa << 13),
        _ => sign | ((exponent + 112) << 23) | (mantissa << 13),
    };
    f32::from_bits(bits)
}
