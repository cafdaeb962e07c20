//! JSON codec: push serializer, pull deserializer and the shared options.

mod codec;
mod deserializer;
mod serializer;
mod tokenizer;

pub use codec::{JsonCodec, JsonCodecOptions};
pub use deserializer::JsonDeserializer;
pub use serializer::JsonSerializer;

use shapewire_schema::traits::JsonName;
use shapewire_schema::Schema;

/// Object key of a member schema.
pub(crate) fn member_key(member: &Schema, use_json_name: bool) -> Option<&str> {
    if use_json_name {
        if let Some(JsonName(name)) = member.get_trait::<JsonName>() {
            return Some(name);
        }
    }
    member.member_name()
}
