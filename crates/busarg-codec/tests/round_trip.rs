//! Integration tests: encode with one signature, decode with the same one,
//! and get the same native value back.

use std::collections::BTreeMap;

use busarg_codec::{Argument, Decoder, Encoder, ErrorKind, Value};

fn round_trip(signature: &str, value: Value) -> Value {
    let arg = Encoder::default().encode(signature, &value).unwrap();
    assert_eq!(arg.signature(), signature);
    Decoder::default().decode(signature, &arg).unwrap()
}

// =========================================================================
// Scalars
// =========================================================================

#[test]
fn test_scalar_round_trips_at_boundaries() {
    let cases: Vec<(&str, Value)> = vec![
        ("y", 13u8.into()),
        ("y", u8::MAX.into()),
        ("b", false.into()),
        ("n", i16::MIN.into()),
        ("q", u16::MAX.into()),
        ("i", i32::MIN.into()),
        ("u", u32::MAX.into()),
        ("x", (-1i64).into()),
        ("x", i64::MAX.into()),
        ("t", 0x6464_6464_6464_6464u64.into()),
        ("t", u64::MAX.into()),
        ("d", f64::MIN_POSITIVE.into()),
        ("d", (-0.0f64).into()),
        ("s", "".into()),
        ("s", "héllo wörld".into()),
        ("o", "/".into()),
        ("g", "a{s(iv)}".into()),
    ];
    for (signature, value) in cases {
        assert_eq!(round_trip(signature, value.clone()), value, "{signature}");
    }
}

#[test]
fn test_float_comes_back_as_double() {
    assert_eq!(round_trip("d", Value::Float(3.25)), Value::Double(3.25));
}

// =========================================================================
// Containers
// =========================================================================

#[test]
fn test_array_keeps_order_and_length() {
    let value = Value::seq([-8i32, -88, 888, 8888]);
    assert_eq!(round_trip("ai", value.clone()), value);
}

#[test]
fn test_empty_array() {
    assert_eq!(round_trip("ay", Value::Seq(vec![])), Value::Seq(vec![]));
}

#[test]
fn test_jagged_array() {
    let value = Value::from(vec![vec![1i32, 2, 3], vec![4, 5, 6]]);
    assert_eq!(round_trip("aai", value.clone()), value);

    let ragged = Value::from(vec![vec![1i32], vec![], vec![2, 3, 4]]);
    assert_eq!(round_trip("aai", ragged.clone()), ragged);
}

#[test]
fn test_struct_members_are_typed() {
    let value = Value::Seq(vec![
        42i32.into(),
        "Hello".into(),
        "World".into(),
        88i32.into(),
    ]);
    let back = round_trip("(issi)", value.clone());
    assert_eq!(back, value);
    assert_eq!(back.as_seq().unwrap()[3], Value::Int32(88));
}

#[test]
fn test_dictionary() {
    let map: BTreeMap<&str, i32> = [("apple", 2), ("pear", 1), ("bannana", 0), ("kiwi", -1)]
        .into_iter()
        .collect();
    let back = round_trip("a{si}", map.clone().into());
    assert_eq!(back.as_map().unwrap().len(), 4);
    for (key, value) in map {
        assert_eq!(back.get(&key.into()), Some(&Value::Int32(value)));
    }
}

#[test]
fn test_deeply_mixed_signature() {
    let signature = "(i(suasi(issi)(a{sv})))";
    let props = Value::map([("on", Value::Arg(Argument::Bool(true)))]);
    let value = Value::Seq(vec![
        1i32.into(),
        Value::Seq(vec![
            "name".into(),
            7u32.into(),
            Value::seq(["a", "b"]),
            (-2i32).into(),
            Value::Seq(vec![1i32.into(), "x".into(), "y".into(), 2i32.into()]),
            Value::Seq(vec![props]),
        ]),
    ]);
    let back = round_trip(signature, value.clone());
    assert_eq!(back, value);
}

// =========================================================================
// Variants
// =========================================================================

#[test]
fn test_variant_type_discrimination() {
    let encoder = Encoder::default();
    let decoder = Decoder::default();

    let inner = encoder.encode("i", &420i32.into()).unwrap();
    let v = encoder.encode("v", &inner.into()).unwrap();

    assert_eq!(decoder.decode("i", &v).unwrap(), Value::Int32(420));
    let err = decoder.decode("x", &v).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SignatureMismatch);
    assert!(err.is_probe_failure());
}

#[test]
fn test_probe_variant_content() {
    let decoder = Decoder::default();
    let v = Argument::from_variant(Argument::String("text".into()));

    let probed = ["u", "d", "s"]
        .into_iter()
        .find_map(|sig| decoder.decode(sig, &v).ok().map(|value| (sig, value)));
    assert_eq!(probed, Some(("s", Value::from("text"))));
}

#[test]
fn test_array_of_variants() {
    let items = Value::seq([Argument::String("one".into()), Argument::String("two".into())]);
    assert_eq!(round_trip("av", items.clone()), items);

    let mixed = Value::seq([Argument::Int32(1), Argument::String("two".into())]);
    let err = Encoder::default().encode("av", &mixed).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
}

// =========================================================================
// Strict typing
// =========================================================================

#[test]
fn test_no_implicit_widening() {
    let encoder = Encoder::default();
    for value in [Value::Bool(true), Value::Byte(7), "text".into()] {
        let err = encoder.encode("i", &value).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert!(!err.is_probe_failure());
    }
    assert!(encoder.encode("x", &1i32.into()).is_err());
    assert!(encoder.encode("u", &1i32.into()).is_err());
}

#[test]
fn test_decode_does_not_narrow() {
    let arg = Encoder::default().encode("x", &5i64.into()).unwrap();
    let err = Decoder::default().decode("i", &arg).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SignatureMismatch);
}
