//! Error types for signature parsing.
//!
//! Every variant means the same thing to a caller: the signature is
//! malformed. The variants only differ in what they tell a human reading
//! the log. Offsets are byte offsets into the signature string.

/// A signature failed to parse.
///
/// Signatures often come from outside the process (a reply, a config
/// file), so this is a returned value and never a panic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    /// The signature exceeds [`MAX_SIGNATURE_LEN`](crate::MAX_SIGNATURE_LEN).
    #[error("signature is {len} bytes long, the maximum is {max}")]
    TooLong { len: usize, max: usize },

    /// A character that is not in the tag alphabet.
    #[error("unknown type code {tag:?} at offset {offset}")]
    UnknownTag { tag: char, offset: usize },

    /// A `(` or `{` that is never closed.
    #[error("unterminated {open:?} opened at offset {offset}")]
    Unbalanced { open: char, offset: usize },

    /// A `)` or `}` with nothing to close.
    #[error("unexpected {close:?} at offset {offset}")]
    UnexpectedClose { close: char, offset: usize },

    /// An `a` at the end of the signature with no element type.
    #[error("array at offset {offset} has no element type")]
    MissingElement { offset: usize },

    /// `()` with no members.
    #[error("empty struct at offset {offset}")]
    EmptyStruct { offset: usize },

    /// A `{...}` that is not the element type of an array.
    #[error("dictionary entry at offset {offset} is not inside an array")]
    DictEntryOutsideArray { offset: usize },

    /// A dictionary key that is not a basic type.
    #[error("dictionary key {key:?} at offset {offset} is not a basic type")]
    InvalidDictKey { key: char, offset: usize },

    /// A dictionary entry without exactly one key and one value.
    #[error("dictionary entry at offset {offset} must hold exactly a key and a value")]
    InvalidDictEntry { offset: usize },

    /// Arrays or structs nested deeper than the grammar allows.
    #[error("{container} nesting exceeds {max} at offset {offset}")]
    TooDeep {
        container: &'static str,
        max: usize,
        offset: usize,
    },

    /// A `*` in a signature parsed with the caller grammar.
    #[error("wildcard at offset {offset} is not allowed here")]
    WildcardNotAllowed { offset: usize },

    /// The input held a different number of complete elements than the
    /// operation needs (for example a compound signature where a single
    /// type is expected).
    #[error("expected a single complete type, found {found} in {signature:?}")]
    NotSingleElement { signature: String, found: usize },
}
