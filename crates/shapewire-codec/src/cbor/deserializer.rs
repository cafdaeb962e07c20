//! `CborDeserializer`: [`ShapeDeserializer`] over a decoded [`Value`] tree.

use std::vec;

use shapewire_schema::{Schema, TimestampFormat};
use time::OffsetDateTime;
use tracing::trace;

use super::constants::{TAG_DECIMAL_FRACTION, TAG_NEGATIVE_BIGNUM, TAG_POSITIVE_BIGNUM};
use super::{decode_exact, Value};
use crate::numeric::{float_sentinel, narrow, IntWidth};
use crate::shape::{DeserializableShape, DeserializeResult, ShapeDeserializer};
use crate::timestamp::{from_epoch_seconds, parse_text};
use crate::{DeserializeError, Document};

enum Frame {
    List(vec::IntoIter<Value>),
    Map(vec::IntoIter<(String, Value)>),
    Struct {
        entries: vec::IntoIter<(String, Value)>,
        union: bool,
        variant_seen: bool,
    },
}

pub struct CborDeserializer {
    /// The value the next `read_*` consumes.
    pending: Option<Value>,
    stack: Vec<Frame>,
}

/// Decodes `bytes` as one CBOR item and reads a `T` from it.
pub fn from_slice<T: DeserializableShape>(bytes: &[u8]) -> DeserializeResult<T> {
    let mut deserializer = CborDeserializer::from_slice(bytes)?;
    let value = T::deserialize(&mut deserializer)?;
    deserializer.finish()?;
    Ok(value)
}

fn mismatch(expected: &'static str, found: &Value) -> DeserializeError {
    DeserializeError::TypeMismatch {
        expected,
        found: found.kind_name(),
    }
}

impl CborDeserializer {
    pub fn new(root: Value) -> Self {
        Self {
            pending: Some(root),
            stack: Vec::new(),
        }
    }

    pub fn from_slice(bytes: &[u8]) -> DeserializeResult<Self> {
        Ok(Self::new(decode_exact(bytes)?))
    }

    /// Fails unless the root value and every container were consumed.
    pub fn finish(&mut self) -> DeserializeResult<()> {
        if self.pending.is_some() || !self.stack.is_empty() {
            return Err(DeserializeError::InvalidState("unconsumed input"));
        }
        Ok(())
    }

    /// Takes the pending value with its tags removed.
    fn take(&mut self) -> DeserializeResult<Value> {
        let mut value = self
            .pending
            .take()
            .ok_or(DeserializeError::InvalidState("no value to read"))?;
        while let Value::Tag(tag, inner) = value {
            if matches!(tag, TAG_POSITIVE_BIGNUM | TAG_NEGATIVE_BIGNUM | TAG_DECIMAL_FRACTION) {
                return Err(DeserializeError::Unsupported("arbitrary-precision number"));
            }
            value = *inner;
        }
        Ok(value)
    }

    fn integer<T: IntWidth>(&mut self) -> DeserializeResult<T> {
        let value = self.take()?;
        match value.as_i128() {
            Some(v) => narrow(v),
            None => Err(mismatch("integer", &value)),
        }
    }

    fn entries(&mut self, expected: &'static str) -> DeserializeResult<vec::IntoIter<(String, Value)>> {
        match self.take()? {
            Value::Map(pairs) => Ok(pairs.into_iter()),
            other => Err(mismatch(expected, &other)),
        }
    }
}

impl ShapeDeserializer for CborDeserializer {
    fn read_bool(&mut self, _schema: &Schema) -> DeserializeResult<bool> {
        match self.take()? {
            Value::Bool(b) => Ok(b),
            other => Err(mismatch("boolean", &other)),
        }
    }

    fn read_int8(&mut self, _schema: &Schema) -> DeserializeResult<i8> {
        self.integer()
    }

    fn read_int16(&mut self, _schema: &Schema) -> DeserializeResult<i16> {
        self.integer()
    }

    fn read_int32(&mut self, _schema: &Schema) -> DeserializeResult<i32> {
        self.integer()
    }

    fn read_int64(&mut self, _schema: &Schema) -> DeserializeResult<i64> {
        self.integer()
    }

    fn read_float32(&mut self, schema: &Schema) -> DeserializeResult<f32> {
        self.read_float64(schema).map(|v| v as f32)
    }

    fn read_float64(&mut self, _schema: &Schema) -> DeserializeResult<f64> {
        match self.take()? {
            Value::Float32(f) => Ok(f.into()),
            Value::Float64(f) => Ok(f),
            Value::Unsigned(u) => Ok(u as f64),
            Value::Negative(n) => Ok(n as f64),
            Value::Text(s) => float_sentinel(&s).ok_or(DeserializeError::InvalidNumber(s)),
            other => Err(mismatch("number", &other)),
        }
    }

    fn read_string(&mut self, _schema: &Schema) -> DeserializeResult<String> {
        match self.take()? {
            Value::Text(s) => Ok(s),
            other => Err(mismatch("text string", &other)),
        }
    }

    fn read_blob(&mut self, _schema: &Schema) -> DeserializeResult<Vec<u8>> {
        match self.take()? {
            Value::Bytes(b) => Ok(b),
            other => Err(mismatch("byte string", &other)),
        }
    }

    /// Epoch seconds (optionally under tag 1) or an RFC 3339 text string
    /// (tag 0).
    fn read_time(&mut self, _schema: &Schema) -> DeserializeResult<OffsetDateTime> {
        match self.take()? {
            Value::Text(s) => parse_text(&s, TimestampFormat::DateTime),
            Value::Float32(f) => from_epoch_seconds(f.into()),
            Value::Float64(f) => from_epoch_seconds(f),
            other => match other.as_i128() {
                Some(seconds) => from_epoch_seconds(seconds as f64),
                None => Err(mismatch("timestamp", &other)),
            },
        }
    }

    fn read_document(&mut self, _schema: &Schema) -> DeserializeResult<Document> {
        Ok(Document::try_from(self.take()?)?)
    }

    fn read_nil(&mut self, _schema: &Schema) -> DeserializeResult<bool> {
        if self.pending.is_none() {
            return Err(DeserializeError::InvalidState("no value to read"));
        }
        let is_nil = matches!(self.pending, Some(Value::Null | Value::Undefined));
        if is_nil {
            self.pending = None;
        }
        Ok(is_nil)
    }

    fn read_list(&mut self, _schema: &Schema) -> DeserializeResult<()> {
        match self.take()? {
            Value::Array(items) => {
                self.stack.push(Frame::List(items.into_iter()));
                Ok(())
            }
            other => Err(mismatch("array", &other)),
        }
    }

    fn read_list_item(&mut self) -> DeserializeResult<bool> {
        let Some(Frame::List(items)) = self.stack.last_mut() else {
            return Err(DeserializeError::InvalidState("read_list_item outside a list"));
        };
        match items.next() {
            Some(item) => {
                self.pending = Some(item);
                Ok(true)
            }
            None => {
                self.stack.pop();
                Ok(false)
            }
        }
    }

    fn read_map(&mut self, _schema: &Schema) -> DeserializeResult<()> {
        let entries = self.entries("map")?;
        self.stack.push(Frame::Map(entries));
        Ok(())
    }

    fn read_map_key(&mut self) -> DeserializeResult<Option<String>> {
        let Some(Frame::Map(entries)) = self.stack.last_mut() else {
            return Err(DeserializeError::InvalidState("read_map_key outside a map"));
        };
        match entries.next() {
            Some((key, value)) => {
                self.pending = Some(value);
                Ok(Some(key))
            }
            None => {
                self.stack.pop();
                Ok(None)
            }
        }
    }

    fn read_struct(&mut self, _schema: &Schema) -> DeserializeResult<()> {
        let entries = self.entries("map")?;
        self.stack.push(Frame::Struct {
            entries,
            union: false,
            variant_seen: false,
        });
        Ok(())
    }

    fn read_struct_member<'s>(&mut self, schema: &'s Schema) -> DeserializeResult<Option<&'s Schema>> {
        loop {
            let Some(Frame::Struct {
                entries,
                union,
                variant_seen,
            }) = self.stack.last_mut()
            else {
                return Err(DeserializeError::InvalidState("read_struct_member outside a structure"));
            };
            let Some((key, value)) = entries.next() else {
                self.stack.pop();
                return Ok(None);
            };
            let Some(member) = schema.member(&key) else {
                trace!(shape = %schema.id(), key = %key, "skipping unknown member");
                continue;
            };
            if *union {
                if matches!(value, Value::Null | Value::Undefined) {
                    continue;
                }
                if std::mem::replace(variant_seen, true) {
                    return Err(DeserializeError::UnionVariants(schema.id().to_string()));
                }
            }
            self.pending = Some(value);
            return Ok(Some(member));
        }
    }

    fn read_union<'s>(&mut self, schema: &'s Schema) -> DeserializeResult<Option<&'s Schema>> {
        let entries = self.entries("map")?;
        self.stack.push(Frame::Struct {
            entries,
            union: true,
            variant_seen: false,
        });
        self.read_struct_member(schema)
    }
}
