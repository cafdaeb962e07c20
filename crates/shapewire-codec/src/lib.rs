//! `shapewire-codec`: the serializer/deserializer contracts generated shapes
//! are written against, and their wire-format implementations.
//!
//! - [`json`]: [`JsonSerializer`] (push) and [`JsonDeserializer`] (pull),
//!   bundled as [`JsonCodec`].
//! - [`cbor`]: a CBOR decoder producing [`cbor::Value`] trees and a
//!   [`cbor::CborDeserializer`] reading shapes from them.
//!
//! Generated code only sees [`ShapeSerializer`] / [`ShapeDeserializer`]; the
//! [`Schema`](shapewire_schema::Schema) passed with every call tells the
//! implementation where the value goes and how to format it.

pub mod cbor;
mod document;
mod error;
pub mod json;
mod numeric;
mod shape;
pub mod timestamp;

/// Deepest container nesting the decoders build values for. Deeper input
/// fails with a `TooDeep` error instead of exhausting the stack.
pub const MAX_DEPTH: usize = 512;

pub use document::Document;
pub use error::{DeserializeError, PayloadError, SerializeError};
pub use json::{JsonCodec, JsonCodecOptions, JsonDeserializer, JsonSerializer};
pub use shape::{
    Codec, DeserializableShape, DeserializeResult, SerializableShape, SerializeResult,
    ShapeDeserializer, ShapeSerializer,
};
