//! Codec configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::CodecError;

// ---------------------------------------------------------------------------
// DuplicateKeyPolicy
// ---------------------------------------------------------------------------

/// What to do when a dictionary holds the same key twice.
///
/// Encoding from a `HashMap` or `BTreeMap` can never produce duplicates,
/// but a [`Value::Map`](crate::Value::Map) built by hand, or an argument
/// tree received from elsewhere, can.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateKeyPolicy {
    /// Fail with [`CodecError::DuplicateKey`](crate::CodecError::DuplicateKey).
    #[default]
    Reject,
    /// Keep the first position, take the last value.
    LastWriteWins,
}

impl DuplicateKeyPolicy {
    /// Applies the policy to dictionary items tagged with their key
    /// fingerprints, in input order.
    ///
    /// # Errors
    /// [`CodecError::DuplicateKey`] under [`Reject`](Self::Reject).
    pub(crate) fn apply<T>(self, keyed: Vec<(String, T)>) -> Result<Vec<T>, CodecError> {
        let mut seen: HashMap<String, usize> = HashMap::with_capacity(keyed.len());
        let mut out: Vec<T> = Vec::with_capacity(keyed.len());
        for (fingerprint, item) in keyed {
            match (seen.get(&fingerprint), self) {
                (Some(_), Self::Reject) => return Err(CodecError::DuplicateKey(fingerprint)),
                (Some(&index), Self::LastWriteWins) => {
                    tracing::warn!(
                        key = %fingerprint,
                        "duplicate dictionary key, keeping last value"
                    );
                    out[index] = item;
                }
                (None, _) => {
                    seen.insert(fingerprint, out.len());
                    out.push(item);
                }
            }
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// CodecConfig
// ---------------------------------------------------------------------------

/// Settings shared by the [`Encoder`](crate::Encoder) and
/// [`Decoder`](crate::Decoder).
///
/// Missing fields take their defaults when deserialized, so a config file
/// only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Maximum container nesting of a built argument, variants included.
    pub max_depth: usize,

    /// Handling of repeated dictionary keys, on encode and decode.
    pub duplicate_keys: DuplicateKeyPolicy,

    /// Check `o` strings against object-path syntax when encoding.
    pub validate_object_paths: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            duplicate_keys: DuplicateKeyPolicy::Reject,
            validate_object_paths: true,
        }
    }
}
