//! Codec trait and implementations for turning argument trees into bytes.
//!
//! The encoder and decoder in this crate work on the logical value model
//! only. Whatever carries an [`Argument`](crate::Argument) between
//! processes needs a byte form for it, and that choice lives here behind
//! the [`Codec`] trait so callers can swap formats without touching the
//! value model.
//!
//! [`JsonCodec`] is the one format provided. It is readable in logs and
//! test output, which is what the loopback transport and the demo want.

use serde::{de::DeserializeOwned, Serialize};

use crate::CodecError;

/// Encodes serializable values to bytes and decodes them back.
///
/// `Send + Sync + 'static` so a codec can live inside a transport that is
/// shared between threads.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `CodecError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CodecError>;

    /// Deserializes bytes back into a value.
    ///
    /// Argument trees are re-validated while deserializing: a heterogeneous
    /// array or a bad signature in the input is a decode error, not a
    /// malformed [`Argument`](crate::Argument).
    ///
    /// # Errors
    /// Returns `CodecError::Decode` if the bytes are malformed or don't
    /// describe a `T`.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, CodecError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// Behind the `json` feature flag (enabled by default).
///
/// ```rust
/// use busarg_codec::{Codec, Encoder, JsonCodec, Value, Argument};
///
/// let arg = Encoder::default()
///     .encode("(is)", &Value::Seq(vec![42i32.into(), "Hello".into()]))
///     .unwrap();
///
/// let bytes = JsonCodec.encode(&arg).unwrap();
/// let back: Argument = JsonCodec.decode(&bytes).unwrap();
/// assert_eq!(arg, back);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(value).map_err(CodecError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, CodecError> {
        serde_json::from_slice(data).map_err(CodecError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{Argument, ErrorKind};

    #[test]
    fn test_json_codec_round_trips_argument() {
        let arg = Argument::from_variant(Argument::String("x".into()));
        let bytes = JsonCodec.encode(&arg).unwrap();
        let back: Argument = JsonCodec.decode(&bytes).unwrap();
        assert_eq!(back, arg);
    }

    #[test]
    fn test_json_codec_decode_garbage() {
        let err = JsonCodec.decode::<Argument>(b"not json").unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)));
        assert_eq!(err.kind(), ErrorKind::Serialization);
    }

    #[test]
    fn test_json_codec_rejects_invalid_tree() {
        let json = br#"{"type": "Struct", "value": {"members": []}}"#;
        assert!(JsonCodec.decode::<Argument>(json).is_err());
    }
}
