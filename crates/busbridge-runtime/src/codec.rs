//! Codec trait and protobuf implementation

use thiserror::Error;

/// Errors that can occur during encoding/decoding
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("encode error: {0}")]
    Encode(String),

    #[error("decode error: {0}")]
    Decode(String),
}

impl From<prost::EncodeError> for CodecError {
    fn from(err: prost::EncodeError) -> Self {
        CodecError::Encode(err.to_string())
    }
}

impl From<prost::DecodeError> for CodecError {
    fn from(err: prost::DecodeError) -> Self {
        CodecError::Decode(err.to_string())
    }
}

/// Trait for message encoding and decoding
pub trait Codec: Send + Sync {
    /// Encode a value to bytes
    fn encode<T: prost::Message>(&self, value: &T) -> Result<Vec<u8>, CodecError>;

    /// Decode bytes to a value
    fn decode<T: prost::Message + Default>(&self, data: &[u8]) -> Result<T, CodecError>;
}

/// Protobuf codec implementation using prost
#[derive(Debug, Clone, Copy, Default)]
pub struct ProtobufCodec;

impl ProtobufCodec {
    /// Create a new protobuf codec
    pub fn new() -> Self {
        Self
    }
}

impl Codec for ProtobufCodec {
    fn encode<T: prost::Message>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        let mut buf = Vec::with_capacity(value.encoded_len());
        value.encode(&mut buf)?;
        Ok(buf)
    }

    fn decode<T: prost::Message + Default>(&self, data: &[u8]) -> Result<T, CodecError> {
        T::decode(data).map_err(Into::into)
    }
}

/// Encode with the codec generated code uses
pub fn encode<T: prost::Message>(value: &T) -> Result<Vec<u8>, CodecError> {
    ProtobufCodec.encode(value)
}

/// Decode with the codec generated code uses
pub fn decode<T: prost::Message + Default>(data: &[u8]) -> Result<T, CodecError> {
    ProtobufCodec.decode(data)
}

#[cfg(test)]
#[path = "codec/codec_tests.rs"]
mod codec_tests;
