//! `shapewire-schema`: static shape descriptions consumed by generated code.
//!
//! A [`Schema`] carries a shape's [`ShapeId`], its [`ShapeType`], its members
//! (themselves schemas) and a [`TraitMap`]. Serializers and deserializers look
//! at the schema passed with every value to decide where and how it goes on
//! the wire.

mod error;
pub mod prelude;
mod registry;
mod schema;
mod shape_id;
mod shape_type;
pub mod traits;

pub use error::SchemaError;
pub use registry::SchemaRegistry;
pub use schema::{schema_trait, Members, Schema, SchemaBuilder, Target};
pub use shape_id::ShapeId;
pub use shape_type::ShapeType;
pub use traits::{StaticTrait, TimestampFormat, Trait, TraitMap};
