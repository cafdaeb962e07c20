use indexmap::IndexMap;

use super::CborError;
use crate::Document;

/// A decoded CBOR data item.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Unsigned(u64),
    /// Major type 1 value, already computed as `-(argument + 1)`.
    Negative(i128),
    Bytes(Vec<u8>),
    Text(String),
    Array(Vec<Value>),
    /// Text-keyed map in wire order.
    Map(Vec<(String, Value)>),
    Tag(u64, Box<Value>),
    Bool(bool),
    Null,
    Undefined,
    Float32(f32),
    Float64(f64),
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Unsigned(_) | Value::Negative(_) => "integer",
            Value::Bytes(_) => "byte string",
            Value::Text(_) => "text string",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Tag(..) => "tag",
            Value::Bool(_) => "boolean",
            Value::Null => "null",
            Value::Undefined => "undefined",
            Value::Float32(_) | Value::Float64(_) => "float",
        }
    }

    /// The value under any number of tags.
    pub fn untagged(&self) -> &Value {
        let mut value = self;
        while let Value::Tag(_, inner) = value {
            value = inner;
        }
        value
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(pairs) => pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Integral value of major types 0 and 1.
    pub fn as_i128(&self) -> Option<i128> {
        match *self {
            Value::Unsigned(u) => Some(u.into()),
            Value::Negative(n) => Some(n),
            _ => None,
        }
    }
}

fn integer_document(value: i128) -> Document {
    i64::try_from(value)
        .map(Document::Int64)
        .unwrap_or(Document::Float64(value as f64))
}

impl TryFrom<Value> for Document {
    type Error = CborError;

    /// Tags are dropped and `undefined` reads as null. Byte strings have no
    /// document form.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Ok(match value {
            Value::Unsigned(u) => integer_document(u.into()),
            Value::Negative(n) => integer_document(n),
            Value::Bytes(_) => return Err(CborError::NotADocument("byte string")),
            Value::Text(s) => Document::String(s),
            Value::Array(items) => Document::Array(
                items
                    .into_iter()
                    .map(Document::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            Value::Map(pairs) => Document::Map(
                pairs
                    .into_iter()
                    .map(|(k, v)| Document::try_from(v).map(|v| (k, v)))
                    .collect::<Result<IndexMap<_, _>, _>>()?,
            ),
            Value::Tag(_, inner) => Document::try_from(*inner)?,
            Value::Bool(b) => Document::Bool(b),
            Value::Null | Value::Undefined => Document::Null,
            Value::Float32(f) => Document::Float32(f),
            Value::Float64(f) => Document::Float64(f),
        })
    }
}
