//! Unified error type for busarg.

use busarg_codec::CodecError;
use busarg_signature::SignatureError;

use crate::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates a `From` impl, so `?`
/// converts errors from the member crates automatically.
#[derive(Debug, thiserror::Error)]
pub enum BusargError {
    /// A signature could not be parsed or composed.
    #[error(transparent)]
    Signature(#[from] SignatureError),

    /// Encoding, decoding or collection access failed.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Sending or receiving an envelope failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl BusargError {
    /// Returns `true` for failures a caller is expected to handle by trying
    /// something else, such as probing a variant with another signature.
    pub fn is_probe_failure(&self) -> bool {
        match self {
            Self::Signature(_) => true,
            Self::Codec(err) => err.is_probe_failure(),
            Self::Transport(_) => false,
        }
    }
}
