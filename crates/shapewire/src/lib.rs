//! shapewire: the runtime layer behind generated shape code.
//!
//! Generated types implement [`SerializableShape`] / [`DeserializableShape`]
//! against the format-agnostic contracts in [`codec`], passing the
//! [`Schema`] of every member they write or read. [`JsonCodec`] and the
//! [`cbor`] deserializer drive the same generated code; [`waiter`] supplies
//! the backoff used when polling long-running operations.
//!
//! Sub-crates are re-exported whole under their short names.

pub use shapewire_buffers as buffers;
pub use shapewire_codec as codec;
pub use shapewire_schema as schema;
pub use shapewire_waiter as waiter;

pub use shapewire_codec::{
    cbor, Codec, DeserializableShape, DeserializeError, DeserializeResult, Document, JsonCodec,
    JsonCodecOptions, PayloadError, SerializableShape, SerializeError, SerializeResult,
    ShapeDeserializer, ShapeSerializer,
};
pub use shapewire_schema::{prelude, traits, Schema, SchemaError, SchemaRegistry, ShapeId, ShapeType};
pub use shapewire_waiter::{compute_delay, DelayDecision, Waiter, WaiterError, WaiterOptions};
