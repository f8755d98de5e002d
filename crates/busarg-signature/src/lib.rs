//! Type signatures for busarg message arguments.
//!
//! A signature describes the shape of one or more values as a string over
//! a one-character-per-type alphabet:
//!
//! ```text
//! y  u8        b  bool      n  i16       q  u16
//! i  i32       u  u32       x  i64       t  u64
//! d  f64       s  string    o  object    g  signature
//! v  variant   a<T>  array of T          (T...)  struct
//! a{KV}  dictionary (array of key/value entries, K a basic type)
//! ```
//!
//! This crate knows nothing about values. It provides:
//!
//! - **Tags** ([`Tag`]): the alphabet.
//! - **Signatures** ([`Signature`]): a validated newtype with accessors
//!   for array elements, struct members and dictionary entries.
//! - **Tokenizer** ([`split_top_level`], [`Grammar`]): splits a compound
//!   signature into its top-level elements.
//! - **Errors** ([`SignatureError`]): why a signature is malformed.

mod error;
mod signature;
mod tag;

pub use error::SignatureError;
pub use signature::{split_top_level, Grammar, Signature};
pub use tag::Tag;

/// Longest signature accepted, in bytes.
pub const MAX_SIGNATURE_LEN: usize = 255;

/// Deepest allowed nesting of arrays within one signature.
pub const MAX_ARRAY_DEPTH: usize = 32;

/// Deepest allowed nesting of structs and dictionary entries within one
/// signature.
pub const MAX_STRUCT_DEPTH: usize = 32;
