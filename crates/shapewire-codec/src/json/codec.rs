use serde::{Deserialize, Serialize};
use shapewire_schema::TimestampFormat;

use super::{JsonDeserializer, JsonSerializer};
use crate::shape::{Codec, DeserializableShape};
use crate::PayloadError;

/// Behavior switches shared by the JSON serializer and deserializer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonCodecOptions {
    /// Write non-optional zero values (`0`, `0.0`, `""`, `false`) of
    /// structure members instead of omitting them.
    pub write_zero_values: bool,
    /// Key members by their `jsonName` trait when present.
    pub use_json_name: bool,
    /// Format for timestamps without a `timestampFormat` trait.
    pub default_timestamp_format: TimestampFormat,
}

impl Default for JsonCodecOptions {
    fn default() -> Self {
        Self {
            write_zero_values: false,
            use_json_name: true,
            default_timestamp_format: TimestampFormat::EpochSeconds,
        }
    }
}

/// `application/json` codec.
#[derive(Debug, Clone, Default)]
pub struct JsonCodec {
    options: JsonCodecOptions,
}

impl JsonCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: JsonCodecOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &JsonCodecOptions {
        &self.options
    }
}

impl Codec for JsonCodec {
    type Serializer = JsonSerializer;
    type Deserializer<'a> = JsonDeserializer<'a>;

    fn media_type(&self) -> &'static str {
        "application/json"
    }

    fn serializer(&self) -> JsonSerializer {
        JsonSerializer::with_options(self.options.clone())
    }

    fn deserializer<'a>(&self, payload: &'a [u8]) -> JsonDeserializer<'a> {
        JsonDeserializer::with_options(payload, self.options.clone())
    }

    fn deserialize<T: DeserializableShape>(&self, payload: &[u8]) -> Result<T, PayloadError> {
        let mut deserializer = self.deserializer(payload);
        let result = T::deserialize(&mut deserializer).and_then(|value| {
            deserializer.finish()?;
            Ok(value)
        });
        result.map_err(|err| deserializer.payload_error(err))
    }
}
