//! `JsonDeserializer`: pull deserializer over [`Tokenizer`].

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use indexmap::IndexMap;
use shapewire_schema::{Schema, TimestampFormat};
use time::OffsetDateTime;
use tracing::trace;

use super::tokenizer::Tokenizer;
use super::{member_key, JsonCodecOptions};
use crate::numeric::{float_sentinel, parse_float, parse_int};
use crate::shape::{DeserializeResult, ShapeDeserializer};
use crate::timestamp::{from_epoch_seconds, parse_text, resolve_format};
use crate::{DeserializeError, Document, PayloadError, MAX_DEPTH};

/// Open container being iterated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Object { first: bool },
    Union { first: bool, variant_seen: bool },
    Array { first: bool },
    Map { first: bool },
}

pub struct JsonDeserializer<'a> {
    tokens: Tokenizer<'a>,
    stack: Vec<Frame>,
    options: JsonCodecOptions,
}

impl<'a> JsonDeserializer<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self::with_options(input, JsonCodecOptions::default())
    }

    pub fn with_options(input: &'a [u8], options: JsonCodecOptions) -> Self {
        Self {
            tokens: Tokenizer::new(input),
            stack: Vec::new(),
            options,
        }
    }

    /// Current input offset.
    pub fn offset(&self) -> usize {
        self.tokens.offset()
    }

    /// Checks that every container was drained and nothing but whitespace
    /// follows the document.
    pub fn finish(&mut self) -> DeserializeResult<()> {
        if !self.stack.is_empty() {
            return Err(DeserializeError::InvalidState("unclosed container"));
        }
        self.tokens.end()
    }

    /// Wraps `err` with the input position it happened at.
    pub fn payload_error(&self, err: DeserializeError) -> PayloadError {
        PayloadError::new(err, self.tokens.offset(), self.tokens.remaining())
    }

    /// Advances the top frame to its next entry: `true` when one follows,
    /// `false` (frame popped) at the closing bracket.
    fn next_entry(&mut self, close: u8) -> DeserializeResult<bool> {
        let first = match self.stack.last_mut() {
            Some(
                Frame::Object { first }
                | Frame::Union { first, .. }
                | Frame::Array { first }
                | Frame::Map { first },
            ) => std::mem::replace(first, false),
            None => return Err(DeserializeError::InvalidState("no open container")),
        };
        if self.tokens.eat(close) {
            self.stack.pop();
            return Ok(false);
        }
        if !first {
            self.tokens.expect(b',', "',' or closing bracket")?;
        }
        Ok(true)
    }

    fn next_key(&mut self) -> DeserializeResult<Option<String>> {
        if !self.next_entry(b'}')? {
            return Ok(None);
        }
        let key = self.tokens.read_string()?;
        self.tokens.expect(b':', "':'")?;
        Ok(Some(key))
    }

    fn find_member<'s>(&self, schema: &'s Schema, key: &str) -> Option<&'s Schema> {
        if self.options.use_json_name {
            schema
                .members()
                .values()
                .find(|m| member_key(m, true) == Some(key))
                .map(|m| m.as_ref())
        } else {
            schema.member(key)
        }
    }

    fn top_is(&self, matches: fn(&Frame) -> bool) -> bool {
        self.stack.last().is_some_and(matches)
    }

    fn document(&mut self, depth: usize) -> DeserializeResult<Document> {
        let peeked = self.tokens.peek();
        if matches!(peeked, Some(b'{' | b'[')) && depth == MAX_DEPTH {
            return Err(DeserializeError::TooDeep(MAX_DEPTH));
        }
        match peeked {
            Some(b'{') => {
                self.tokens.expect(b'{', "'{'")?;
                self.stack.push(Frame::Map { first: true });
                let mut map = IndexMap::new();
                while let Some(key) = self.next_key()? {
                    let value = self.document(depth + 1)?;
                    map.insert(key, value);
                }
                Ok(Document::Map(map))
            }
            Some(b'[') => {
                self.tokens.expect(b'[', "'['")?;
                self.stack.push(Frame::Array { first: true });
                let mut items = Vec::new();
                while self.next_entry(b']')? {
                    items.push(self.document(depth + 1)?);
                }
                Ok(Document::Array(items))
            }
            Some(b'"') => self.tokens.read_string().map(Document::String),
            Some(b't' | b'f') => self.tokens.read_bool().map(Document::Bool),
            Some(b'n') => self.tokens.read_null().map(|()| Document::Null),
            _ => {
                let literal = self.tokens.read_number()?;
                if literal.bytes().any(|b| matches!(b, b'.' | b'e' | b'E')) {
                    parse_float(literal).map(Document::Float64)
                } else {
                    // integers wider than i64 degrade to a float
                    parse_int::<i64>(literal)
                        .map(Document::Int64)
                        .or_else(|_| parse_float(literal).map(Document::Float64))
                }
            }
        }
    }
}

impl ShapeDeserializer for JsonDeserializer<'_> {
    fn read_bool(&mut self, _schema: &Schema) -> DeserializeResult<bool> {
        self.tokens.read_bool()
    }

    fn read_int8(&mut self, _schema: &Schema) -> DeserializeResult<i8> {
        parse_int(self.tokens.read_number()?)
    }

    fn read_int16(&mut self, _schema: &Schema) -> DeserializeResult<i16> {
        parse_int(self.tokens.read_number()?)
    }

    fn read_int32(&mut self, _schema: &Schema) -> DeserializeResult<i32> {
        parse_int(self.tokens.read_number()?)
    }

    fn read_int64(&mut self, _schema: &Schema) -> DeserializeResult<i64> {
        parse_int(self.tokens.read_number()?)
    }

    fn read_float32(&mut self, schema: &Schema) -> DeserializeResult<f32> {
        self.read_float64(schema).map(|v| v as f32)
    }

    fn read_float64(&mut self, _schema: &Schema) -> DeserializeResult<f64> {
        if self.tokens.peek() == Some(b'"') {
            let text = self.tokens.read_string()?;
            return float_sentinel(&text).ok_or(DeserializeError::InvalidNumber(text));
        }
        parse_float(self.tokens.read_number()?)
    }

    fn read_string(&mut self, _schema: &Schema) -> DeserializeResult<String> {
        self.tokens.read_string()
    }

    fn read_blob(&mut self, _schema: &Schema) -> DeserializeResult<Vec<u8>> {
        let text = self.tokens.read_string()?;
        STANDARD
            .decode(text.as_bytes())
            .map_err(|e| DeserializeError::InvalidBase64(e.to_string()))
    }

    fn read_time(&mut self, schema: &Schema) -> DeserializeResult<OffsetDateTime> {
        match resolve_format(schema, self.options.default_timestamp_format) {
            TimestampFormat::EpochSeconds => {
                let seconds = parse_float(self.tokens.read_number()?)?;
                from_epoch_seconds(seconds)
            }
            format => parse_text(&self.tokens.read_string()?, format),
        }
    }

    fn read_document(&mut self, _schema: &Schema) -> DeserializeResult<Document> {
        self.document(0)
    }

    fn read_nil(&mut self, _schema: &Schema) -> DeserializeResult<bool> {
        Ok(self.tokens.eat_null())
    }

    fn read_list(&mut self, _schema: &Schema) -> DeserializeResult<()> {
        if self.tokens.peek() != Some(b'[') {
            return Err(self.tokens.mismatch("array"));
        }
        self.tokens.expect(b'[', "'['")?;
        self.stack.push(Frame::Array { first: true });
        Ok(())
    }

    fn read_list_item(&mut self) -> DeserializeResult<bool> {
        if !self.top_is(|f| matches!(f, Frame::Array { .. })) {
            return Err(DeserializeError::InvalidState("read_list_item outside a list"));
        }
        self.next_entry(b']')
    }

    fn read_map(&mut self, _schema: &Schema) -> DeserializeResult<()> {
        if self.tokens.peek() != Some(b'{') {
            return Err(self.tokens.mismatch("object"));
        }
        self.tokens.expect(b'{', "'{'")?;
        self.stack.push(Frame::Map { first: true });
        Ok(())
    }

    fn read_map_key(&mut self) -> DeserializeResult<Option<String>> {
        if !self.top_is(|f| matches!(f, Frame::Map { .. })) {
            return Err(DeserializeError::InvalidState("read_map_key outside a map"));
        }
        self.next_key()
    }

    fn read_struct(&mut self, _schema: &Schema) -> DeserializeResult<()> {
        if self.tokens.peek() != Some(b'{') {
            return Err(self.tokens.mismatch("object"));
        }
        self.tokens.expect(b'{', "'{'")?;
        self.stack.push(Frame::Object { first: true });
        Ok(())
    }

    fn read_struct_member<'s>(&mut self, schema: &'s Schema) -> DeserializeResult<Option<&'s Schema>> {
        if !self.top_is(|f| matches!(f, Frame::Object { .. } | Frame::Union { .. })) {
            return Err(DeserializeError::InvalidState("read_struct_member outside a structure"));
        }
        while let Some(key) = self.next_key()? {
            let in_union = self.top_is(|f| matches!(f, Frame::Union { .. }));
            let member = match self.find_member(schema, &key) {
                // a null union member is an unset variant
                Some(_) if in_union && self.tokens.eat_null() => continue,
                Some(member) => member,
                None => {
                    trace!(shape = %schema.id(), key = %key, "skipping unknown member");
                    self.tokens.skip_value()?;
                    continue;
                }
            };
            if let Some(Frame::Union { variant_seen, .. }) = self.stack.last_mut() {
                if std::mem::replace(variant_seen, true) {
                    return Err(DeserializeError::UnionVariants(schema.id().to_string()));
                }
            }
            return Ok(Some(member));
        }
        Ok(None)
    }

    fn read_union<'s>(&mut self, schema: &'s Schema) -> DeserializeResult<Option<&'s Schema>> {
        if self.tokens.peek() != Some(b'{') {
            return Err(self.tokens.mismatch("object"));
        }
        self.tokens.expect(b'{', "'{'")?;
        self.stack.push(Frame::Union {
            first: true,
            variant_seen: false,
        });
        self.read_struct_member(schema)
    }
}
