//! Error types for the codec layer.
//!
//! Encoding and decoding share one error enum. Whether a failure is an
//! expected outcome (probing a variant, an untrusted signature) or a
//! caller bug (wrong native type for a slot) is told apart by
//! [`ErrorKind`], not by whether the code panicked.

use busarg_signature::SignatureError;

use crate::Value;

/// Errors produced while building, encoding or decoding arguments.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The signature text is malformed.
    #[error("malformed signature: {0}")]
    Signature(#[from] SignatureError),

    /// The signature is well formed but cannot be used for this
    /// operation, e.g. a bare dictionary entry passed to the encoder.
    #[error("unsupported signature {0:?}")]
    UnsupportedSignature(String),

    /// Encoder: the native value does not have the type the signature
    /// asks for. Scalars never widen or narrow, except `f32` into `d`.
    #[error("type mismatch: {expected:?} cannot hold a {found} value")]
    TypeMismatch { expected: String, found: String },

    /// Wrong arity, heterogeneous array items, or a malformed dictionary
    /// entry.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Decoder: the argument does not have the requested signature, even
    /// after unwrapping variants.
    #[error("signature mismatch: requested {expected:?}, argument is {found:?}")]
    SignatureMismatch { expected: String, found: String },

    /// An `o` value that is not a valid object path.
    #[error("invalid object path {0:?}")]
    InvalidObjectPath(String),

    /// A dictionary key appeared more than once under
    /// [`DuplicateKeyPolicy::Reject`](crate::DuplicateKeyPolicy::Reject).
    #[error("duplicate dictionary key {0}")]
    DuplicateKey(String),

    /// The built argument nests deeper than the configured maximum.
    #[error("argument nesting depth {depth} exceeds {max}")]
    TooDeep { depth: usize, max: usize },

    /// A compound signature needs more slots than the collection has left.
    #[error("signature needs {needed} argument slots, only {available} exist")]
    Truncated { needed: usize, available: usize },

    /// A collection index past the end.
    #[error("index {index} out of range for {len} arguments")]
    IndexOutOfRange { index: usize, len: usize },

    /// A collection slot that was never set (or was cleared).
    #[error("argument slot {0} is empty")]
    EmptySlot(usize),

    /// A dictionary lookup on something that is not `a{..}`.
    #[error("not a dictionary: argument is {0:?}")]
    NotADictionary(String),

    /// A dictionary lookup found no entry with the key.
    #[error("dictionary has no element with key {0}")]
    ElementNotFound(String),

    /// Serializing an argument tree to bytes failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserializing an argument tree from bytes failed.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}

/// Coarse classification of a [`CodecError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unbalanced brackets, unknown tags, limits: bad signature text.
    MalformedSignature,
    /// Well-formed signature the operation cannot use.
    UnsupportedSignature,
    /// Caller passed a native value of the wrong type.
    TypeMismatch,
    /// Caller passed the wrong number or shape of values.
    ShapeMismatch,
    /// Requested signature differs from the argument's.
    SignatureMismatch,
    /// A configured or structural limit was exceeded.
    Limit,
    /// A collection slot or dictionary element could not be found.
    Lookup,
    /// Byte-level serialization of an argument tree failed.
    Serialization,
}

impl CodecError {
    /// Returns the coarse kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Signature(SignatureError::NotSingleElement { .. }) => {
                ErrorKind::UnsupportedSignature
            }
            Self::Signature(_) => ErrorKind::MalformedSignature,
            Self::UnsupportedSignature(_) => ErrorKind::UnsupportedSignature,
            Self::TypeMismatch { .. } | Self::InvalidObjectPath(_) => {
                ErrorKind::TypeMismatch
            }
            Self::ShapeMismatch(_) | Self::DuplicateKey(_) => ErrorKind::ShapeMismatch,
            Self::SignatureMismatch { .. } | Self::NotADictionary(_) => {
                ErrorKind::SignatureMismatch
            }
            Self::TooDeep { .. } | Self::Truncated { .. } => ErrorKind::Limit,
            Self::IndexOutOfRange { .. } | Self::EmptySlot(_) | Self::ElementNotFound(_) => {
                ErrorKind::Lookup
            }
            #[cfg(feature = "json")]
            Self::Encode(_) | Self::Decode(_) => ErrorKind::Serialization,
        }
    }

    /// Returns `true` for outcomes a well-written caller anticipates:
    /// malformed external signatures, signature mismatches while probing
    /// a variant, and missing dictionary elements.
    pub fn is_probe_failure(&self) -> bool {
        matches!(
            self,
            Self::Signature(_)
                | Self::SignatureMismatch { .. }
                | Self::NotADictionary(_)
                | Self::ElementNotFound(_)
        ) && self.kind() != ErrorKind::UnsupportedSignature
    }

    pub(crate) fn type_mismatch(expected: impl ToString, found: &Value) -> Self {
        Self::TypeMismatch {
            expected: expected.to_string(),
            found: found.kind().to_owned(),
        }
    }
}
