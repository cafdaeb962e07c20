//! `JsonSerializer`: stack-driven push serializer writing UTF-8 JSON to a
//! [`Writer`].

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use shapewire_buffers::Writer;
use shapewire_schema::{Schema, TimestampFormat};
use time::OffsetDateTime;

use super::{member_key, JsonCodecOptions};
use crate::shape::{SerializableShape, SerializeResult, ShapeSerializer};
use crate::timestamp::{epoch_seconds_literal, format_text, resolve_format};
use crate::{Document, SerializeError};

/// Where the next value goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    /// Structure scope; values are keyed by their member name.
    Object { first: bool },
    /// Map scope; values need a preceding `write_key`.
    Map { first: bool },
    Array { first: bool },
    /// Slot for exactly one value, opened by `write_key` or `write_union`.
    Value,
}

pub struct JsonSerializer {
    writer: Writer,
    stack: Vec<Cursor>,
    options: JsonCodecOptions,
    write_zero_values: bool,
    root_written: bool,
}

impl Default for JsonSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonSerializer {
    pub fn new() -> Self {
        Self::with_options(JsonCodecOptions::default())
    }

    pub fn with_options(options: JsonCodecOptions) -> Self {
        Self {
            writer: Writer::new(),
            stack: Vec::new(),
            write_zero_values: options.write_zero_values,
            options,
            root_written: false,
        }
    }

    /// Zero values are dropped only as structure members.
    fn skip_zero(&self, is_zero: bool) -> bool {
        is_zero && !self.write_zero_values && matches!(self.stack.last(), Some(Cursor::Object { .. }))
    }

    /// Writes whatever has to precede the next value (separator, key) and
    /// updates the cursor stack.
    fn place(&mut self, schema: &Schema, container: bool) -> SerializeResult {
        let mut consume_slot = false;
        match self.stack.last_mut() {
            None => {
                if self.root_written {
                    return Err(SerializeError::InvalidState("document root already written"));
                }
                self.root_written = true;
            }
            Some(Cursor::Object { first }) => {
                let key = member_key(schema, self.options.use_json_name)
                    .ok_or(SerializeError::InvalidState("structure value without a member name"))?;
                if !std::mem::replace(first, false) {
                    self.writer.u8(b',');
                }
                write_str(&mut self.writer, key);
                self.writer.u8(b':');
            }
            Some(Cursor::Array { first }) => {
                if !std::mem::replace(first, false) {
                    self.writer.u8(b',');
                }
            }
            Some(Cursor::Map { .. }) => {
                return Err(SerializeError::InvalidState("map value written without a key"));
            }
            // A container keeps the slot beneath it; `close` drops it.
            Some(Cursor::Value) => consume_slot = !container,
        }
        if consume_slot {
            self.stack.pop();
        }
        Ok(())
    }

    fn scalar(
        &mut self,
        schema: &Schema,
        is_zero: bool,
        write: impl FnOnce(&mut Writer),
    ) -> SerializeResult {
        if self.skip_zero(is_zero) {
            return Ok(());
        }
        self.place(schema, false)?;
        write(&mut self.writer);
        Ok(())
    }

    fn open(&mut self, schema: &Schema, cursor: Cursor) -> SerializeResult {
        self.place(schema, true)?;
        self.writer.u8(match cursor {
            Cursor::Array { .. } => b'[',
            _ => b'{',
        });
        self.stack.push(cursor);
        Ok(())
    }

    fn close(&mut self, is_open: fn(&Cursor) -> bool, what: &'static str) -> SerializeResult {
        let cursor = match self.stack.last() {
            Some(cursor) if is_open(cursor) => *cursor,
            _ => return Err(SerializeError::InvalidState(what)),
        };
        self.stack.pop();
        self.writer.u8(match cursor {
            Cursor::Array { .. } => b']',
            _ => b'}',
        });
        if self.stack.last() == Some(&Cursor::Value) {
            self.stack.pop();
        }
        Ok(())
    }
}

impl ShapeSerializer for JsonSerializer {
    fn set_write_zero_values(&mut self, on: bool) -> bool {
        std::mem::replace(&mut self.write_zero_values, on)
    }

    fn write_bool(&mut self, schema: &Schema, value: bool) -> SerializeResult {
        self.scalar(schema, !value, |w| w.ascii(if value { "true" } else { "false" }))
    }

    fn write_int8(&mut self, schema: &Schema, value: i8) -> SerializeResult {
        self.scalar(schema, value == 0, |w| w.ascii(&value.to_string()))
    }

    fn write_int16(&mut self, schema: &Schema, value: i16) -> SerializeResult {
        self.scalar(schema, value == 0, |w| w.ascii(&value.to_string()))
    }

    fn write_int32(&mut self, schema: &Schema, value: i32) -> SerializeResult {
        self.scalar(schema, value == 0, |w| w.ascii(&value.to_string()))
    }

    fn write_int64(&mut self, schema: &Schema, value: i64) -> SerializeResult {
        self.scalar(schema, value == 0, |w| w.ascii(&value.to_string()))
    }

    fn write_float32(&mut self, schema: &Schema, value: f32) -> SerializeResult {
        self.scalar(schema, value == 0.0, |w| write_f32(w, value))
    }

    fn write_float64(&mut self, schema: &Schema, value: f64) -> SerializeResult {
        self.scalar(schema, value == 0.0, |w| write_f64(w, value))
    }

    fn write_string(&mut self, schema: &Schema, value: &str) -> SerializeResult {
        self.scalar(schema, value.is_empty(), |w| write_str(w, value))
    }

    fn write_blob(&mut self, schema: &Schema, value: &[u8]) -> SerializeResult {
        let encoded = STANDARD.encode(value);
        self.scalar(schema, false, |w| {
            w.u8(b'"');
            w.ascii(&encoded);
            w.u8(b'"');
        })
    }

    fn write_time(&mut self, schema: &Schema, value: OffsetDateTime) -> SerializeResult {
        match resolve_format(schema, self.options.default_timestamp_format) {
            TimestampFormat::EpochSeconds => {
                let literal = epoch_seconds_literal(value);
                self.scalar(schema, false, |w| w.ascii(&literal))
            }
            format => {
                let text = format_text(value, format)?;
                self.scalar(schema, false, |w| write_str(w, &text))
            }
        }
    }

    fn write_document(&mut self, schema: &Schema, value: &Document) -> SerializeResult {
        self.scalar(schema, false, |w| write_document_value(w, value))
    }

    fn write_nil(&mut self, schema: &Schema) -> SerializeResult {
        self.scalar(schema, false, |w| w.ascii("null"))
    }

    fn write_list(&mut self, schema: &Schema) -> SerializeResult {
        self.open(schema, Cursor::Array { first: true })
    }

    fn close_list(&mut self) -> SerializeResult {
        self.close(|c| matches!(c, Cursor::Array { .. }), "close_list without an open list")
    }

    fn write_map(&mut self, schema: &Schema) -> SerializeResult {
        self.open(schema, Cursor::Map { first: true })
    }

    fn write_key(&mut self, _schema: &Schema, key: &str) -> SerializeResult {
        let Some(Cursor::Map { first }) = self.stack.last_mut() else {
            return Err(SerializeError::InvalidState("write_key outside a map"));
        };
        if !std::mem::replace(first, false) {
            self.writer.u8(b',');
        }
        write_str(&mut self.writer, key);
        self.writer.u8(b':');
        self.stack.push(Cursor::Value);
        Ok(())
    }

    fn close_map(&mut self) -> SerializeResult {
        self.close(|c| matches!(c, Cursor::Map { .. }), "close_map without an open map")
    }

    fn write_struct(&mut self, schema: &Schema, value: &dyn SerializableShape) -> SerializeResult {
        self.open(schema, Cursor::Object { first: true })?;
        value.serialize(self)?;
        self.close(|c| matches!(c, Cursor::Object { .. }), "structure closed out of order")
    }

    fn write_union(
        &mut self,
        schema: &Schema,
        variant: &Schema,
        value: &dyn SerializableShape,
    ) -> SerializeResult {
        let is_variant = variant
            .member_name()
            .and_then(|name| schema.member(name))
            .is_some();
        if !is_variant {
            return Err(SerializeError::InvalidState("union variant is not a member of the union"));
        }
        self.open(schema, Cursor::Object { first: true })?;
        // key the variant, then hand its value slot to the shape
        self.place(variant, true)?;
        self.stack.push(Cursor::Value);
        value.serialize(self)?;
        if self.stack.last() == Some(&Cursor::Value) {
            return Err(SerializeError::InvalidState("union variant wrote no value"));
        }
        self.close(|c| matches!(c, Cursor::Object { .. }), "union closed out of order")
    }

    fn finish(&mut self) -> Result<Vec<u8>, SerializeError> {
        if !self.stack.is_empty() {
            return Err(SerializeError::InvalidState("unclosed container"));
        }
        if !self.root_written {
            return Err(SerializeError::InvalidState("nothing written"));
        }
        self.root_written = false;
        Ok(self.writer.flush())
    }
}

/// Writes a JSON string literal, escaping quotes, backslashes and control
/// characters.
pub(crate) fn write_str(w: &mut Writer, s: &str) {
    w.u8(b'"');
    let bytes = s.as_bytes();
    let mut start = 0;
    for (i, &b) in bytes.iter().enumerate() {
        let escape = match b {
            b'"' => "\\\"",
            b'\\' => "\\\\",
            b'\n' => "\\n",
            b'\r' => "\\r",
            b'\t' => "\\t",
            0x08 => "\\b",
            0x0c => "\\f",
            0x00..=0x1f => {
                w.utf8(&s[start..i]);
                w.ascii(&format!("\\u{b:04x}"));
                start = i + 1;
                continue;
            }
            _ => continue,
        };
        w.utf8(&s[start..i]);
        w.ascii(escape);
        start = i + 1;
    }
    w.utf8(&s[start..]);
    w.u8(b'"');
}

fn write_f64(w: &mut Writer, value: f64) {
    if value.is_nan() {
        w.ascii("\"NaN\"");
    } else if value.is_infinite() {
        w.ascii(if value > 0.0 { "\"Infinity\"" } else { "\"-Infinity\"" });
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        w.ascii(&(value as i64).to_string());
    } else {
        w.ascii(&value.to_string());
    }
}

fn write_f32(w: &mut Writer, value: f32) {
    if value.is_finite() && value.fract() != 0.0 {
        // f32 Display is the shortest form that round-trips through f32
        w.ascii(&value.to_string());
    } else {
        write_f64(w, value.into());
    }
}

fn write_document_value(w: &mut Writer, value: &Document) {
    match value {
        Document::Null => w.ascii("null"),
        Document::Bool(b) => w.ascii(if *b { "true" } else { "false" }),
        Document::String(s) => write_str(w, s),
        Document::Int8(i) => w.ascii(&i.to_string()),
        Document::Int16(i) => w.ascii(&i.to_string()),
        Document::Int32(i) => w.ascii(&i.to_string()),
        Document::Int64(i) => w.ascii(&i.to_string()),
        Document::Float32(f) => write_f32(w, *f),
        Document::Float64(f) => write_f64(w, *f),
        Document::Array(items) => {
            w.u8(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    w.u8(b',');
                }
                write_document_value(w, item);
            }
            w.u8(b']');
        }
        Document::Map(map) => {
            w.u8(b'{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    w.u8(b',');
                }
                write_str(w, key);
                w.u8(b':');
                write_document_value(w, item);
            }
            w.u8(b'}');
        }
    }
}
