use serde_json::json;

use super::*;
use crate::tags::{LIST, SHORTCUTS};

#[test]
fn anonymous_envelope_is_a_triple() {
    let envelope = Envelope {
        tag: LIST,
        name: None,
        version: Version::new(1),
        payload: json!([]),
    };
    assert_eq!(envelope.to_value(), json!([26, 1, []]));
    assert_eq!(envelope.to_text(), "[26,1,[]]");
}

#[test]
fn named_envelope_is_a_quadruple() {
    let envelope = Envelope {
        tag: SHORTCUTS,
        name: Some("main".to_string()),
        version: Version::new(3),
        payload: json!({"keys": ["a"]}),
    };
    let value = envelope.clone().into_value();
    assert_eq!(value, json!([2, "main", 3, {"keys": ["a"]}]));
    assert_eq!(Envelope::from_value(value).expect("parse"), envelope);
}

#[test]
fn wrong_arity_is_malformed() {
    for value in [json!([]), json!([26, 1]), json!([2, "n", 1, [], 9])] {
        let err = Envelope::from_value(value.clone()).expect_err("bad arity");
        assert!(
            matches!(err, SerialError::MalformedPayload(_)),
            "{value} gave {err:?}"
        );
    }
}

#[test]
fn non_array_is_malformed() {
    let err = Envelope::from_value(json!({"tag": 26})).expect_err("object");
    assert!(err.to_string().contains("must be an array"), "{err}");
}

#[test]
fn field_types_are_checked() {
    let cases = [
        json!(["26", 1, []]),
        json!([-1, 1, []]),
        json!([26, 0, []]),
        json!([26, 1.5, []]),
        json!([2, 7, 1, []]),
        json!([4294967296u64, 1, []]),
    ];
    for value in cases {
        let err = Envelope::from_value(value.clone()).expect_err("bad field");
        assert!(
            matches!(err, SerialError::MalformedPayload(_)),
            "{value} gave {err:?}"
        );
    }
}

#[test]
fn text_parse_errors_carry_source() {
    let err = Envelope::from_text("[26, 1", &CodecLimits::default()).expect_err("truncated");
    match err {
        SerialError::Text { src, .. } => assert_eq!(src, "[26, 1"),
        other => panic!("expected text error, got {other:?}"),
    }
}

#[test]
fn oversized_text_is_refused() {
    let limits = CodecLimits {
        max_text_bytes: 4,
        ..CodecLimits::default()
    };
    let err = Envelope::from_text("[26,1,[]]", &limits).expect_err("too long");
    assert!(matches!(err, SerialError::LimitExceeded(_)));
}

#[test]
fn header_summarises_without_registry() {
    let envelope =
        Envelope::from_text(r#"[900,"x",2,{"a":1}]"#, &CodecLimits::default()).expect("parse");
    let header = envelope.header();
    assert_eq!(header.tag, TypeTag::new(900));
    assert_eq!(header.label, None);
    assert_eq!(header.name.as_deref(), Some("x"));
    assert_eq!(header.version, Version::new(2));
    assert_eq!(header.payload_kind, "object");
}
