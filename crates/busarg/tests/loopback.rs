//! Integration tests: arguments built on one side of a loopback transport
//! and read back on the other.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;

use busarg::prelude::*;
use busarg::{CodecError, ErrorKind, JsonCodec, TransportError};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

#[test]
fn test_call_and_reply_over_loopback() {
    init_tracing();
    let transport = LoopbackTransport::new();

    let mut props = BTreeMap::new();
    props.insert("brightness".to_owned(), Argument::UInt32(80));
    props.insert("on".to_owned(), Argument::Bool(true));
    let call = Envelope::new(
        1,
        "SetState",
        vec![
            Argument::from_typed(&"/org/lamp/1".to_owned()).unwrap(),
            Argument::from_typed(&props).unwrap(),
        ],
    );
    transport.send(&call).unwrap();

    let received = transport.recv().unwrap().unwrap();
    assert_eq!(received, call);
    assert_eq!(received.signature().unwrap(), "sa{sv}");

    let state: BTreeMap<String, Argument> = received.args[1].to_typed().unwrap();
    assert_eq!(state["on"], Argument::Bool(true));
    assert_eq!(
        received.args[1].dict_lookup("{sv}", &"brightness".into()).unwrap(),
        Value::Arg(Argument::UInt32(80))
    );
}

#[test]
fn test_variant_probe_after_transport() {
    let transport = LoopbackTransport::with_codec(JsonCodec);
    let reply = Envelope::from_values(2, "Get", "v", &[Argument::Double(0.5).into()]).unwrap();
    transport.send(&reply).unwrap();

    let received = transport.recv().unwrap().unwrap();
    let decoder = Decoder::default();
    let err = decoder.decode("i", &received.args[0]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SignatureMismatch);
    assert_eq!(
        decoder.decode("d", &received.args[0]).unwrap(),
        Value::Double(0.5)
    );
}

#[test]
fn test_tampered_frame_rejected() {
    let transport = LoopbackTransport::new();
    // An `ai` array holding a string never survives decoding.
    let frame = br#"{"seq": 9, "member": "X", "args": [
        {"type": "Array", "value": {"element": "i", "items": [{"type": "String", "value": "no"}]}}
    ]}"#;
    transport.inject(frame.to_vec()).unwrap();
    let err = transport.recv().unwrap_err();
    assert!(matches!(err, TransportError::Frame(CodecError::Decode(_))));
}

#[test]
fn test_concurrent_senders() {
    let transport = Arc::new(LoopbackTransport::new());
    thread::scope(|scope| {
        for sender in 0..4u64 {
            let transport = Arc::clone(&transport);
            scope.spawn(move || {
                for n in 0..10u64 {
                    let env = Envelope::from_values(
                        sender * 100 + n,
                        "Count",
                        "t",
                        &[n.into()],
                    )
                    .unwrap();
                    transport.send(&env).unwrap();
                }
            });
        }
    });

    let mut seen = Vec::new();
    while let Some(env) = transport.recv().unwrap() {
        seen.push(env.seq);
    }
    seen.sort_unstable();
    assert_eq!(seen.len(), 40);
    assert_eq!(seen[0], 0);
    assert_eq!(seen[39], 309);
}

#[test]
fn test_error_conversion_with_question_mark() {
    fn decode_first(env: &Envelope) -> Result<Value, BusargError> {
        Ok(env.values("i")?.remove(0))
    }

    let env = Envelope::new(1, "Ping", vec![Argument::String("x".into())]);
    let err = decode_first(&env).unwrap_err();
    assert!(matches!(err, BusargError::Codec(_)));
    assert!(err.is_probe_failure());
}
