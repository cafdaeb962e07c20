//! [`Document`]: protocol-agnostic value for untyped `document` shapes.

use indexmap::IndexMap;

/// An untyped JSON-like value.
///
/// Numbers keep the width they were produced with; decoders produce
/// [`Document::Int64`] for integral literals and [`Document::Float64`]
/// otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Null,
    Bool(bool),
    String(String),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Array(Vec<Document>),
    /// Ordered string-keyed map.
    Map(IndexMap<String, Document>),
}

impl Document {
    pub fn is_null(&self) -> bool {
        matches!(self, Document::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Document::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Document::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integral value of any integer width.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Document::Int8(v) => Some(v.into()),
            Document::Int16(v) => Some(v.into()),
            Document::Int32(v) => Some(v.into()),
            Document::Int64(v) => Some(v),
            _ => None,
        }
    }

    /// Numeric value of any width, widened to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Document::Float32(v) => Some(v.into()),
            Document::Float64(v) => Some(v),
            _ => self.as_i64().map(|v| v as f64),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Document> {
        match self {
            Document::Map(map) => map.get(key),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Document::Null => "null",
            Document::Bool(_) => "boolean",
            Document::String(_) => "string",
            Document::Int8(_)
            | Document::Int16(_)
            | Document::Int32(_)
            | Document::Int64(_)
            | Document::Float32(_)
            | Document::Float64(_) => "number",
            Document::Array(_) => "array",
            Document::Map(_) => "map",
        }
    }
}

impl From<serde_json::Value> for Document {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Document::Null,
            serde_json::Value::Bool(b) => Document::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Document::Int64(i),
                None => Document::Float64(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Document::String(s),
            serde_json::Value::Array(arr) => {
                Document::Array(arr.into_iter().map(Document::from).collect())
            }
            serde_json::Value::Object(obj) => Document::Map(
                obj.into_iter()
                    .map(|(k, v)| (k, Document::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Document> for serde_json::Value {
    /// Non-finite floats have no JSON number form and become `null`.
    fn from(v: Document) -> Self {
        match v {
            Document::Null => serde_json::Value::Null,
            Document::Bool(b) => serde_json::Value::Bool(b),
            Document::String(s) => serde_json::Value::String(s),
            Document::Int8(i) => serde_json::json!(i),
            Document::Int16(i) => serde_json::json!(i),
            Document::Int32(i) => serde_json::json!(i),
            Document::Int64(i) => serde_json::json!(i),
            Document::Float32(f) => serde_json::json!(f),
            Document::Float64(f) => serde_json::json!(f),
            Document::Array(arr) => {
                serde_json::Value::Array(arr.into_iter().map(serde_json::Value::from).collect())
            }
            Document::Map(map) => serde_json::Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}
