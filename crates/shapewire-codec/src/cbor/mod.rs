//! CBOR decoding: a from-scratch decoder producing a [`Value`] tree, and a
//! [`CborDeserializer`] that reads shapes from it.

mod constants;
mod decoder;
mod deserializer;
mod error;
mod value;

pub use decoder::{decode, decode_argument, decode_exact, f16_to_f32};
pub use deserializer::{from_slice, CborDeserializer};
pub use error::CborError;
pub use value::Value;
