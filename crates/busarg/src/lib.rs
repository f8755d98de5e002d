//! # busarg
//!
//! Signature-driven message arguments for bus-style IPC.
//!
//! busarg builds self-describing argument trees from native values and
//! reads them back, guided by a compact type signature such as `a{sv}` or
//! `(issi)`. It is the value layer of a message bus: transports carry the
//! trees, this crate gives them their shape.
//!
//! ## Quick Start
//!
//! ```rust
//! use busarg::prelude::*;
//!
//! let encoder = Encoder::default();
//! let arg = encoder
//!     .encode("(issi)", &Value::Seq(vec![
//!         42i32.into(), "Hello".into(), "World".into(), 88i32.into(),
//!     ]))
//!     .unwrap();
//! assert_eq!(arg.signature(), "(issi)");
//!
//! let v = encoder.encode("v", &Argument::Int32(420).into()).unwrap();
//! let decoder = Decoder::default();
//! assert_eq!(decoder.decode("i", &v).unwrap(), Value::Int32(420));
//! assert!(decoder.decode("x", &v).is_err());
//! ```

mod error;
mod message;
mod transport;

pub use error::BusargError;
pub use message::Envelope;
pub use transport::{ArgTransport, LoopbackTransport, TransportError};

pub use busarg_codec::{
    is_valid_object_path, ArgList, Argument, ArrayArg, BusType, Codec, CodecConfig,
    CodecError, Decoder, DictEntry, DuplicateKeyPolicy, Encoder, ErrorKind, JsonCodec,
    StructArg, Value,
};
pub use busarg_signature::{split_top_level, Grammar, Signature, SignatureError, Tag};

/// The types most programs need.
pub mod prelude {
    pub use crate::{
        ArgList, ArgTransport, Argument, BusType, BusargError, Decoder, Encoder, Envelope,
        LoopbackTransport, Signature, Value,
    };
}
