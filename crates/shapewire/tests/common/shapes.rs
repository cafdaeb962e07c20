//! Hand-written equivalents of generated shape code.

use std::sync::{Arc, LazyLock};

use shapewire::traits::{TimestampFormat, TimestampFormatTrait, TraitMap};
use shapewire::{
    prelude, DeserializableShape, DeserializeResult, Schema, SerializableShape, SerializeError,
    SerializeResult, ShapeDeserializer, ShapeId, ShapeSerializer, ShapeType,
};
use time::OffsetDateTime;

fn id(name: &str) -> ShapeId {
    ShapeId::new("com.example.shapes", name)
}

fn member<'a>(schema: &'a Schema, name: &str) -> &'a Schema {
    schema.member(name).unwrap()
}

pub static WIDGET: LazyLock<Arc<Schema>> = LazyLock::new(|| {
    Schema::builder(id("Widget"), ShapeType::Structure)
        .member("name", &prelude::STRING)
        .member("count", &prelude::INTEGER)
        .build()
        .unwrap()
});

pub static OPTIONALS: LazyLock<Arc<Schema>> = LazyLock::new(|| {
    Schema::builder(id("Optionals"), ShapeType::Structure)
        .member("field", &prelude::INTEGER)
        .member("optional", &prelude::INTEGER)
        .build()
        .unwrap()
});

pub static TINY: LazyLock<Arc<Schema>> = LazyLock::new(|| {
    Schema::builder(id("Tiny"), ShapeType::Structure)
        .member("value", &prelude::BYTE)
        .build()
        .unwrap()
});

pub static EVENT: LazyLock<Arc<Schema>> = LazyLock::new(|| {
    Schema::builder(id("Event"), ShapeType::Union)
        .member("renamed", &prelude::STRING)
        .member_with_traits(
            "created",
            &prelude::TIMESTAMP,
            TraitMap::new().with(TimestampFormatTrait(TimestampFormat::DateTime)),
        )
        .member("widget", &*WIDGET)
        .build()
        .unwrap()
});

pub static ENVELOPE: LazyLock<Arc<Schema>> = LazyLock::new(|| {
    Schema::builder(id("Envelope"), ShapeType::Structure)
        .member("id", &prelude::STRING)
        .member("event", &*EVENT)
        .build()
        .unwrap()
});

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Widget {
    pub name: String,
    pub count: i32,
}

impl SerializableShape for Widget {
    fn serialize(&self, s: &mut dyn ShapeSerializer) -> SerializeResult {
        s.write_string(member(&WIDGET, "name"), &self.name)?;
        s.write_int32(member(&WIDGET, "count"), self.count)
    }
}

impl DeserializableShape for Widget {
    fn deserialize(d: &mut dyn ShapeDeserializer) -> DeserializeResult<Self> {
        let mut out = Widget::default();
        d.read_struct(&WIDGET)?;
        while let Some(m) = d.read_struct_member(&WIDGET)? {
            match m.member_name() {
                Some("name") => out.name = d.read_string(m)?,
                Some("count") => out.count = d.read_int32(m)?,
                _ => {}
            }
        }
        Ok(out)
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Optionals {
    pub field: Option<i32>,
    pub optional: Option<i32>,
}

impl SerializableShape for Optionals {
    fn serialize(&self, s: &mut dyn ShapeSerializer) -> SerializeResult {
        s.write_int32_opt(member(&OPTIONALS, "field"), self.field)?;
        s.write_int32_opt(member(&OPTIONALS, "optional"), self.optional)
    }
}

impl DeserializableShape for Optionals {
    fn deserialize(d: &mut dyn ShapeDeserializer) -> DeserializeResult<Self> {
        let mut out = Optionals::default();
        d.read_struct(&OPTIONALS)?;
        while let Some(m) = d.read_struct_member(&OPTIONALS)? {
            match m.member_name() {
                Some("field") => out.field = d.read_int32_opt(m)?,
                Some("optional") => out.optional = d.read_int32_opt(m)?,
                _ => {}
            }
        }
        Ok(out)
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Tiny {
    pub value: i8,
}

impl DeserializableShape for Tiny {
    fn deserialize(d: &mut dyn ShapeDeserializer) -> DeserializeResult<Self> {
        let mut out = Tiny::default();
        d.read_struct(&TINY)?;
        while let Some(m) = d.read_struct_member(&TINY)? {
            if m.member_name() == Some("value") {
                out.value = d.read_int8(m)?;
            }
        }
        Ok(out)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Renamed(String),
    Created(OffsetDateTime),
    Widget(Widget),
    /// A variant this code does not know, or none at all.
    Unknown,
}

struct Variant<'a> {
    schema: &'a Schema,
    event: &'a Event,
}

impl SerializableShape for Variant<'_> {
    fn serialize(&self, s: &mut dyn ShapeSerializer) -> SerializeResult {
        match self.event {
            Event::Renamed(name) => s.write_string(self.schema, name),
            Event::Created(at) => s.write_time(self.schema, *at),
            Event::Widget(widget) => s.write_struct(self.schema, widget),
            Event::Unknown => Err(SerializeError::InvalidState("unknown union variant")),
        }
    }
}

impl Event {
    fn variant_name(&self) -> &'static str {
        match self {
            Event::Renamed(_) => "renamed",
            Event::Created(_) => "created",
            Event::Widget(_) => "widget",
            Event::Unknown => "",
        }
    }

    pub fn write(&self, s: &mut dyn ShapeSerializer, union: &Schema) -> SerializeResult {
        let variant = union
            .member(self.variant_name())
            .ok_or(SerializeError::InvalidState("unknown union variant"))?;
        s.write_union(union, variant, &Variant { schema: variant, event: self })
    }

    pub fn read(d: &mut dyn ShapeDeserializer, union: &Schema) -> DeserializeResult<Self> {
        let Some(variant) = d.read_union(union)? else {
            return Ok(Event::Unknown);
        };
        let event = match variant.member_name() {
            Some("renamed") => Event::Renamed(d.read_string(variant)?),
            Some("created") => Event::Created(d.read_time(variant)?),
            Some("widget") => Event::Widget(Widget::deserialize(d)?),
            _ => Event::Unknown,
        };
        while d.read_struct_member(union)?.is_some() {}
        Ok(event)
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Envelope {
    pub id: String,
    pub event: Option<Event>,
}

impl SerializableShape for Envelope {
    fn serialize(&self, s: &mut dyn ShapeSerializer) -> SerializeResult {
        s.write_string(member(&ENVELOPE, "id"), &self.id)?;
        if let Some(event) = &self.event {
            event.write(s, member(&ENVELOPE, "event"))?;
        }
        Ok(())
    }
}

impl DeserializableShape for Envelope {
    fn deserialize(d: &mut dyn ShapeDeserializer) -> DeserializeResult<Self> {
        let mut out = Envelope::default();
        d.read_struct(&ENVELOPE)?;
        while let Some(m) = d.read_struct_member(&ENVELOPE)? {
            match m.member_name() {
                Some("id") => out.id = d.read_string(m)?,
                Some("event") => {
                    if !d.read_nil(m)? {
                        out.event = Some(Event::read(d, m)?);
                    }
                }
                _ => {}
            }
        }
        Ok(out)
    }
}
