use std::sync::{Arc, LazyLock};

use shapewire_codec::{
    Codec, DeserializableShape, DeserializeError, DeserializeResult, Document, JsonCodec,
    JsonCodecOptions, SerializableShape, SerializeResult, ShapeDeserializer, ShapeSerializer,
};
use shapewire_schema::{prelude, Schema, SchemaRegistry, ShapeId, ShapeType};

fn id(name: &str) -> ShapeId {
    ShapeId::new("com.example", name)
}

static NODE: LazyLock<Arc<Schema>> = LazyLock::new(|| {
    let mut registry = SchemaRegistry::new();
    let node = registry.declare(id("Node"), ShapeType::Structure).unwrap();
    let schema = Schema::builder(id("Node"), ShapeType::Structure)
        .member("value", &prelude::INTEGER)
        .member("tags", &*TAGS)
        .member("next", &node)
        .build()
        .unwrap();
    registry.define(Arc::clone(&schema)).unwrap();
    registry.validate().unwrap();
    schema
});

static TAGS: LazyLock<Arc<Schema>> = LazyLock::new(|| {
    Schema::builder(id("Tags"), ShapeType::Map)
        .member("key", &prelude::STRING)
        .member("value", &prelude::DOCUMENT)
        .build()
        .unwrap()
});

#[derive(Debug, Default, PartialEq)]
struct Node {
    value: i32,
    tags: Vec<(String, Document)>,
    next: Option<Box<Node>>,
}

impl SerializableShape for Node {
    fn serialize(&self, s: &mut dyn ShapeSerializer) -> SerializeResult {
        s.write_int32(NODE.member("value").unwrap(), self.value)?;
        if !self.tags.is_empty() {
            struct Tags<'a>(&'a [(String, Document)]);
            impl SerializableShape for Tags<'_> {
                fn serialize(&self, s: &mut dyn ShapeSerializer) -> SerializeResult {
                    let value = TAGS.member("value").unwrap();
                    for (key, doc) in self.0 {
                        s.write_key(&TAGS, key)?;
                        s.write_document(value, doc)?;
                    }
                    Ok(())
                }
            }
            let member = NODE.member("tags").unwrap();
            s.write_map(member)?;
            Tags(&self.tags).serialize(s)?;
            s.close_map()?;
        }
        if let Some(next) = &self.next {
            s.write_struct(NODE.member("next").unwrap(), next.as_ref())?;
        }
        Ok(())
    }
}

impl DeserializableShape for Node {
    fn deserialize(d: &mut dyn ShapeDeserializer) -> DeserializeResult<Self> {
        let mut node = Node::default();
        d.read_struct(&NODE)?;
        while let Some(member) = d.read_struct_member(&NODE)? {
            match member.member_name() {
                Some("value") => node.value = d.read_int32(member)?,
                Some("tags") => {
                    d.read_map(member)?;
                    while let Some(key) = d.read_map_key()? {
                        let doc = d.read_document(TAGS.member("value").unwrap())?;
                        node.tags.push((key, doc));
                    }
                }
                Some("next") => {
                    if !d.read_nil(member)? {
                        node.next = Some(Box::new(Node::deserialize(d)?));
                    }
                }
                _ => {}
            }
        }
        Ok(node)
    }
}

fn chain() -> Node {
    Node {
        value: 1,
        tags: vec![
            ("a".into(), Document::from(serde_json::json!({"x": [0, false, ""]}))),
            ("b".into(), Document::Null),
        ],
        next: Some(Box::new(Node {
            value: 0,
            tags: Vec::new(),
            next: Some(Box::new(Node {
                value: 3,
                ..Node::default()
            })),
        })),
    }
}

#[test]
fn recursive_structure_round_trip() {
    let codec = JsonCodec::new();
    let bytes = codec.serialize(&NODE, &chain()).unwrap();
    assert_eq!(
        std::str::from_utf8(&bytes).unwrap(),
        r#"{"value":1,"tags":{"a":{"x":[0,false,""]},"b":null},"next":{"next":{"value":3}}}"#
    );
    let back: Node = codec.deserialize(&bytes).unwrap();
    assert_eq!(back, chain());
}

#[test]
fn zero_values_round_trip_when_enabled() {
    let codec = JsonCodec::with_options(JsonCodecOptions {
        write_zero_values: true,
        ..JsonCodecOptions::default()
    });
    let bytes = codec.serialize(&NODE, &Node::default()).unwrap();
    assert_eq!(bytes, br#"{"value":0}"#);
    assert_eq!(codec.deserialize::<Node>(&bytes).unwrap(), Node::default());
}

#[test]
fn explicit_null_link() {
    let node: Node = JsonCodec::new()
        .deserialize(br#"{"next":null,"value":7,"ignored":{"next":1}}"#)
        .unwrap();
    assert_eq!(node, Node { value: 7, ..Node::default() });
}

#[test]
fn payload_errors_carry_offset_and_snapshot() {
    let codec = JsonCodec::new();
    let err = codec.deserialize::<Node>(br#"{"value":"x"}"#).unwrap_err();
    assert_eq!(err.offset, 9);
    assert_eq!(err.snapshot, r#""x"}"#);
    assert_eq!(
        err.source,
        DeserializeError::TypeMismatch {
            expected: "number",
            found: "string"
        }
    );

    let err = codec.deserialize::<Node>(br#"{"value":1} []"#).unwrap_err();
    assert!(matches!(
        err.source,
        DeserializeError::Syntax {
            expected: "end of input",
            ..
        }
    ));
    assert_eq!(err.snapshot, "[]");

    let err = codec.deserialize::<Node>(br#"{"value":1,"next":{"value":"#).unwrap_err();
    assert!(matches!(err.source, DeserializeError::UnexpectedEof { .. }));
    assert!(err.snapshot.is_empty());
}

#[test]
fn snapshot_is_bounded() {
    let mut input = br#"{"value":true,"pad":""#.to_vec();
    input.extend(std::iter::repeat(b'a').take(1000));
    input.extend_from_slice(br#""}"#);
    let err = JsonCodec::new().deserialize::<Node>(&input).unwrap_err();
    assert_eq!(err.snapshot.len(), shapewire_codec::PayloadError::SNAPSHOT_LEN);
    assert!(err.to_string().contains("expected number"));
}
