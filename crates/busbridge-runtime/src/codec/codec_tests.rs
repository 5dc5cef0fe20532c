#![allow(non_snake_case)]

use super::*;

#[derive(Clone, PartialEq, prost::Message)]
struct TestMessage {
    #[prost(uint64, tag = "1")]
    id: u64,
    #[prost(string, tag = "2")]
    name: String,
}

// ProtobufCodec tests

#[test]
fn ProtobufCodec___encode_decode___preserves_data() {
    let codec = ProtobufCodec::new();
    let original = TestMessage {
        id: 42,
        name: "test".to_string(),
    };

    let encoded = codec.encode(&original).unwrap();
    let decoded: TestMessage = codec.decode(&encoded).unwrap();

    assert_eq!(original, decoded);
}

#[test]
fn ProtobufCodec___encode___default_message_is_empty() {
    let codec = ProtobufCodec::new();

    let encoded = codec.encode(&TestMessage::default()).unwrap();

    assert!(encoded.is_empty());
}

#[test]
fn ProtobufCodec___decode___empty_payload_yields_default() {
    let codec = ProtobufCodec::new();

    let decoded: TestMessage = codec.decode(&[]).unwrap();

    assert_eq!(decoded, TestMessage::default());
}

#[test]
fn ProtobufCodec___decode___truncated_payload_returns_decode_error() {
    let codec = ProtobufCodec::new();
    let encoded = codec
        .encode(&TestMessage {
            id: 1,
            name: "truncated".to_string(),
        })
        .unwrap();

    let result: Result<TestMessage, _> = codec.decode(&encoded[..encoded.len() - 2]);

    assert!(matches!(result, Err(CodecError::Decode(_))));
}

#[test]
fn CodecError___display___includes_stage() {
    assert_eq!(
        CodecError::Decode("bad tag".into()).to_string(),
        "decode error: bad tag"
    );
    assert_eq!(
        CodecError::Encode("too big".into()).to_string(),
        "encode error: too big"
    );
}

#[test]
fn encode___free_function___matches_codec() {
    let msg = TestMessage {
        id: 7,
        name: "x".into(),
    };

    assert_eq!(encode(&msg).unwrap(), ProtobufCodec.encode(&msg).unwrap());
    assert_eq!(decode::<TestMessage>(&encode(&msg).unwrap()).unwrap(), msg);
}
