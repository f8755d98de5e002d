//! Message arguments for busarg.
//!
//! This crate turns native values into self-describing argument trees and
//! back, driven by a type signature:
//!
//! - **Values** ([`Argument`], [`Value`]): the tagged argument tree, and
//!   the native values callers hand in and get out.
//! - **Encoder** ([`Encoder`]): `Set(signature, value)`. Strict per-tag
//!   typing; containers recurse.
//! - **Decoder** ([`Decoder`]): `Get(signature, argument)`. Resolves
//!   through variants; a mismatch is an ordinary error a caller can probe
//!   with.
//! - **Collection** ([`ArgList`]): a fixed number of argument slots, the
//!   shape of a method call's arguments.
//! - **Typed helpers** ([`BusType`]): Rust types with a fixed signature.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): bytes for a transport.
//! - **Errors** ([`CodecError`], [`ErrorKind`]).
//!
//! # Architecture
//!
//! ```text
//! Signature (busarg-signature) → Encoder → Argument → Decoder → Value
//!                                             ↓
//!                                   Codec (bytes, transport side)
//! ```
//!
//! Nothing here does I/O or holds global state. A built [`Argument`] is a
//! plain owned tree: share it freely once built, mutate it from one place.

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod argument;
mod codec;
mod collection;
mod config;
mod decode;
mod encode;
mod error;
mod typed;
mod value;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use argument::{is_valid_object_path, Argument, ArrayArg, DictEntry, StructArg};
pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use collection::ArgList;
pub use config::{CodecConfig, DuplicateKeyPolicy};
pub use decode::Decoder;
pub use encode::Encoder;
pub use error::{CodecError, ErrorKind};
pub use typed::BusType;
pub use value::Value;

pub use busarg_signature::{Signature, Tag};
