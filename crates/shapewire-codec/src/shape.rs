//! Format-agnostic serializer/deserializer contracts driven by generated code.
//!
//! A generated shape implements [`SerializableShape`] by calling one `write_*`
//! per member, in member order, passing the member's [`Schema`]. It
//! implements [`DeserializableShape`] by opening its container with
//! `read_struct`/`read_list`/`read_map` and pulling members until the
//! iteration method reports the end. Every wire format provides exactly one
//! implementation of each contract.

use shapewire_schema::Schema;
use time::OffsetDateTime;

use crate::{DeserializeError, Document, PayloadError, SerializeError};

pub type SerializeResult = Result<(), SerializeError>;
pub type DeserializeResult<T> = Result<T, DeserializeError>;

/// A value that knows how to write its members.
pub trait SerializableShape {
    fn serialize(&self, serializer: &mut dyn ShapeSerializer) -> SerializeResult;
}

/// A value that knows how to read itself.
pub trait DeserializableShape: Sized {
    fn deserialize(deserializer: &mut dyn ShapeDeserializer) -> DeserializeResult<Self>;
}

macro_rules! write_opt {
    ($($opt:ident => $write:ident($ty:ty);)*) => {$(
        /// Writes the value only when present; a present zero value is
        /// always written.
        fn $opt(&mut self, schema: &Schema, value: Option<$ty>) -> SerializeResult {
            let Some(value) = value else {
                return Ok(());
            };
            let previous = self.set_write_zero_values(true);
            let result = self.$write(schema, value);
            self.set_write_zero_values(previous);
            result
        }
    )*};
}

/// Push serializer. Placement of each value (object key, list slot, map
/// value, document root) is decided by the implementation from its own
/// cursor state and the schema passed in.
pub trait ShapeSerializer {
    /// Whether non-optional zero values are written; returns the previous
    /// setting.
    fn set_write_zero_values(&mut self, on: bool) -> bool;

    fn write_bool(&mut self, schema: &Schema, value: bool) -> SerializeResult;
    fn write_int8(&mut self, schema: &Schema, value: i8) -> SerializeResult;
    fn write_int16(&mut self, schema: &Schema, value: i16) -> SerializeResult;
    fn write_int32(&mut self, schema: &Schema, value: i32) -> SerializeResult;
    fn write_int64(&mut self, schema: &Schema, value: i64) -> SerializeResult;
    fn write_float32(&mut self, schema: &Schema, value: f32) -> SerializeResult;
    fn write_float64(&mut self, schema: &Schema, value: f64) -> SerializeResult;
    fn write_string(&mut self, schema: &Schema, value: &str) -> SerializeResult;
    fn write_blob(&mut self, schema: &Schema, value: &[u8]) -> SerializeResult;
    fn write_time(&mut self, schema: &Schema, value: OffsetDateTime) -> SerializeResult;
    fn write_document(&mut self, schema: &Schema, value: &Document) -> SerializeResult;
    fn write_nil(&mut self, schema: &Schema) -> SerializeResult;

    /// Arbitrary-precision integers are not supported.
    fn write_big_integer(&mut self, _schema: &Schema, _digits: &str) -> SerializeResult {
        Err(SerializeError::Unsupported("bigInteger"))
    }

    /// Arbitrary-precision decimals are not supported.
    fn write_big_decimal(&mut self, _schema: &Schema, _digits: &str) -> SerializeResult {
        Err(SerializeError::Unsupported("bigDecimal"))
    }

    fn write_list(&mut self, schema: &Schema) -> SerializeResult;
    fn close_list(&mut self) -> SerializeResult;

    fn write_map(&mut self, schema: &Schema) -> SerializeResult;
    /// Places the next write as the value of `key`.
    fn write_key(&mut self, schema: &Schema, key: &str) -> SerializeResult;
    fn close_map(&mut self) -> SerializeResult;

    /// Opens a structure for `schema`, lets `value` write its members, closes
    /// it.
    fn write_struct(&mut self, schema: &Schema, value: &dyn SerializableShape) -> SerializeResult;

    /// Like [`ShapeSerializer::write_struct`], with one more level keyed by
    /// `variant` (a member schema of `schema`) around `value`.
    fn write_union(
        &mut self,
        schema: &Schema,
        variant: &Schema,
        value: &dyn SerializableShape,
    ) -> SerializeResult;

    /// Returns the encoded bytes. Fails if a container is still open.
    fn finish(&mut self) -> Result<Vec<u8>, SerializeError>;

    write_opt! {
        write_bool_opt => write_bool(bool);
        write_int8_opt => write_int8(i8);
        write_int16_opt => write_int16(i16);
        write_int32_opt => write_int32(i32);
        write_int64_opt => write_int64(i64);
        write_float32_opt => write_float32(f32);
        write_float64_opt => write_float64(f64);
        write_string_opt => write_string(&str);
        write_blob_opt => write_blob(&[u8]);
        write_time_opt => write_time(OffsetDateTime);
    }
}

macro_rules! read_opt {
    ($($opt:ident => $read:ident -> $ty:ty;)*) => {$(
        /// `None` when the value is null; allocates only when present.
        fn $opt(&mut self, schema: &Schema) -> DeserializeResult<Option<$ty>> {
            if self.read_nil(schema)? {
                Ok(None)
            } else {
                self.$read(schema).map(Some)
            }
        }
    )*};
}

/// Pull deserializer, the read-side mirror of [`ShapeSerializer`].
pub trait ShapeDeserializer {
    fn read_bool(&mut self, schema: &Schema) -> DeserializeResult<bool>;
    fn read_int8(&mut self, schema: &Schema) -> DeserializeResult<i8>;
    fn read_int16(&mut self, schema: &Schema) -> DeserializeResult<i16>;
    fn read_int32(&mut self, schema: &Schema) -> DeserializeResult<i32>;
    fn read_int64(&mut self, schema: &Schema) -> DeserializeResult<i64>;
    fn read_float32(&mut self, schema: &Schema) -> DeserializeResult<f32>;
    fn read_float64(&mut self, schema: &Schema) -> DeserializeResult<f64>;
    fn read_string(&mut self, schema: &Schema) -> DeserializeResult<String>;
    fn read_blob(&mut self, schema: &Schema) -> DeserializeResult<Vec<u8>>;
    fn read_time(&mut self, schema: &Schema) -> DeserializeResult<OffsetDateTime>;
    fn read_document(&mut self, schema: &Schema) -> DeserializeResult<Document>;

    /// Consumes a null if one is next; returns whether it did.
    fn read_nil(&mut self, schema: &Schema) -> DeserializeResult<bool>;

    fn read_big_integer(&mut self, _schema: &Schema) -> DeserializeResult<String> {
        Err(DeserializeError::Unsupported("bigInteger"))
    }

    fn read_big_decimal(&mut self, _schema: &Schema) -> DeserializeResult<String> {
        Err(DeserializeError::Unsupported("bigDecimal"))
    }

    fn read_list(&mut self, schema: &Schema) -> DeserializeResult<()>;
    /// `true` when another element follows; read it next.
    fn read_list_item(&mut self) -> DeserializeResult<bool>;

    fn read_map(&mut self, schema: &Schema) -> DeserializeResult<()>;
    /// Next key, `None` at the end of the map; read the value next.
    fn read_map_key(&mut self) -> DeserializeResult<Option<String>>;

    fn read_struct(&mut self, schema: &Schema) -> DeserializeResult<()>;
    /// Schema of the next known member of `schema`, `None` at the end.
    /// Unknown members are skipped.
    fn read_struct_member<'s>(&mut self, schema: &'s Schema) -> DeserializeResult<Option<&'s Schema>>;

    /// Opens a union and returns the schema of its variant, `None` if no
    /// known variant is present. After reading the variant value, drain the
    /// union with [`ShapeDeserializer::read_struct_member`]; a second known
    /// variant is an error.
    fn read_union<'s>(&mut self, schema: &'s Schema) -> DeserializeResult<Option<&'s Schema>>;

    read_opt! {
        read_bool_opt => read_bool -> bool;
        read_int8_opt => read_int8 -> i8;
        read_int16_opt => read_int16 -> i16;
        read_int32_opt => read_int32 -> i32;
        read_int64_opt => read_int64 -> i64;
        read_float32_opt => read_float32 -> f32;
        read_float64_opt => read_float64 -> f64;
        read_string_opt => read_string -> String;
        read_blob_opt => read_blob -> Vec<u8>;
        read_time_opt => read_time -> OffsetDateTime;
    }
}

/// A serializer/deserializer pair for one wire format.
pub trait Codec {
    type Serializer: ShapeSerializer;
    type Deserializer<'a>: ShapeDeserializer;

    fn media_type(&self) -> &'static str;
    fn serializer(&self) -> Self::Serializer;
    fn deserializer<'a>(&self, payload: &'a [u8]) -> Self::Deserializer<'a>;

    /// Encodes a top-level structure.
    fn serialize(&self, schema: &Schema, value: &dyn SerializableShape) -> Result<Vec<u8>, SerializeError> {
        let mut serializer = self.serializer();
        serializer.write_struct(schema, value)?;
        serializer.finish()
    }

    /// Decodes a whole payload into `T`, rejecting trailing input.
    fn deserialize<T: DeserializableShape>(&self, payload: &[u8]) -> Result<T, PayloadError>;
}
