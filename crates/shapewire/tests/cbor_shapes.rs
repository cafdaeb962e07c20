mod common;

use common::decode_hex;
use common::shapes::{Envelope, Event, Optionals, Tiny, Widget};
use shapewire::cbor::{self, Value};
use shapewire::{DeserializeError, Document};
use time::macros::datetime;

#[test]
fn same_shapes_read_from_cbor() {
    // {"name": "x", "count": 0}
    let widget: Widget =
        cbor::from_slice(&decode_hex("a2 646e616d65 6178 65636f756e74 00")).unwrap();
    assert_eq!(
        widget,
        Widget {
            name: "x".into(),
            count: 0
        }
    );

    // {"field": 5, "optional": null}
    let optionals: Optionals =
        cbor::from_slice(&decode_hex("a2 656669656c64 05 686f7074696f6e616c f6")).unwrap();
    assert_eq!(
        optionals,
        Optionals {
            field: Some(5),
            optional: None
        }
    );
}

#[test]
fn indefinite_containers_read_like_definite_ones() {
    let definite = decode_hex("a2 646e616d65 627879 65636f756e74 03");
    // map, name as two text chunks
    let indefinite = decode_hex("bf 646e616d65 7f 6178 6179 ff 65636f756e74 03 ff");
    let a: Widget = cbor::from_slice(&definite).unwrap();
    let b: Widget = cbor::from_slice(&indefinite).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.name, "xy");

    assert_eq!(
        cbor::decode(&decode_hex("9f 01 02 03 ff")).unwrap().0,
        cbor::decode(&decode_hex("83 01 02 03")).unwrap().0
    );
}

#[test]
fn byte_members_are_range_checked() {
    let tiny: Tiny = cbor::from_slice(&decode_hex("a1 6576616c7565 187f")).unwrap();
    assert_eq!(tiny.value, 127);
    let tiny: Tiny = cbor::from_slice(&decode_hex("a1 6576616c7565 387f")).unwrap();
    assert_eq!(tiny.value, -128);
    let err = cbor::from_slice::<Tiny>(&decode_hex("a1 6576616c7565 1880")).unwrap_err();
    assert!(matches!(err, DeserializeError::OutOfRange { target: "int8", .. }));
}

#[test]
fn union_variants_from_cbor() {
    // {"id": "e1", "event": {"created": 0("2018-01-09T21:31:21Z")}}
    let text_time = decode_hex(
        "a2 626964 626531 656576656e74 a1 6763726561746564
         c0 74 323031382d30312d30395432313a33313a32315a",
    );
    // {"id": "e1", "event": {"created": 1(1515533481)}}
    let epoch_time = decode_hex(
        "a2 626964 626531 656576656e74 a1 6763726561746564 c1 1a5a5534a9",
    );
    let expected = Envelope {
        id: "e1".into(),
        event: Some(Event::Created(datetime!(2018-01-09 21:31:21 UTC))),
    };
    assert_eq!(cbor::from_slice::<Envelope>(&text_time).unwrap(), expected);
    assert_eq!(cbor::from_slice::<Envelope>(&epoch_time).unwrap(), expected);

    // {"event": {"renamed": undefined, "widget": {"name": "w", "count": 3}}}
    let nested = decode_hex(
        "a1 656576656e74 a2 6772656e616d6564 f7
         66776964676574 a2 646e616d65 6177 65636f756e74 03",
    );
    let envelope: Envelope = cbor::from_slice(&nested).unwrap();
    assert_eq!(
        envelope.event,
        Some(Event::Widget(Widget {
            name: "w".into(),
            count: 3
        }))
    );

    // {"event": {"renamed": "a", "created": 1}}
    let doubled =
        decode_hex("a1 656576656e74 a2 6772656e616d6564 6161 6763726561746564 01");
    assert!(matches!(
        cbor::from_slice::<Envelope>(&doubled),
        Err(DeserializeError::UnionVariants(_))
    ));
}

#[test]
fn reference_vectors() {
    let cases: &[(&str, Value, usize)] = &[
        ("00", Value::Unsigned(0), 1),
        ("18ff", Value::Unsigned(255), 2),
        ("7f 626865 636c6c6f ff", Value::Text("hello".into()), 9),
        ("f93c00", Value::Float32(1.0), 3),
        ("f5", Value::Bool(true), 1),
        ("f6", Value::Null, 1),
    ];
    for (hex, value, consumed) in cases {
        let (decoded, used) = cbor::decode(&decode_hex(hex)).unwrap();
        assert_eq!(&decoded, value, "{hex}");
        assert_eq!(used, *consumed, "{hex}");
    }
}

#[test]
fn trees_convert_to_documents() {
    // {"a": [1, -2, 1.5], "b": 0("x")} with an indefinite inner array
    let bytes = decode_hex("a2 6161 9f 01 21 f93e00 ff 6162 c0 6178");
    let doc = Document::try_from(cbor::decode_exact(&bytes).unwrap()).unwrap();
    assert_eq!(
        serde_json::Value::from(doc),
        serde_json::json!({"a": [1, -2, 1.5], "b": "x"})
    );
}
