//! The tag alphabet: one character per type in a signature.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The type discriminator of a single signature element.
///
/// Scalar tags map to exactly one native representation. Container tags
/// (`Array`, `Struct`, `DictEntry`) are identified by the character that
/// opens them in a signature: `a`, `(` and `{`.
///
/// `Wildcard` (`*`) is never legal in a caller-supplied signature. It only
/// exists so the encoder can describe "an array whose element type is
/// taken from its first item".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    Byte,
    Bool,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Double,
    String,
    ObjectPath,
    Signature,
    Array,
    Struct,
    DictEntry,
    Variant,
    Wildcard,
}

impl Tag {
    /// Every tag, in alphabet order.
    pub const ALL: [Tag; 17] = [
        Tag::Byte,
        Tag::Bool,
        Tag::Int16,
        Tag::UInt16,
        Tag::Int32,
        Tag::UInt32,
        Tag::Int64,
        Tag::UInt64,
        Tag::Double,
        Tag::String,
        Tag::ObjectPath,
        Tag::Signature,
        Tag::Array,
        Tag::Struct,
        Tag::DictEntry,
        Tag::Variant,
        Tag::Wildcard,
    ];

    /// Looks up the tag that a signature character opens.
    ///
    /// Closing brackets are not tags and return `None`.
    pub fn from_char(c: char) -> Option<Self> {
        let tag = match c {
            'y' => Self::Byte,
            'b' => Self::Bool,
            'n' => Self::Int16,
            'q' => Self::UInt16,
            'i' => Self::Int32,
            'u' => Self::UInt32,
            'x' => Self::Int64,
            't' => Self::UInt64,
            'd' => Self::Double,
            's' => Self::String,
            'o' => Self::ObjectPath,
            'g' => Self::Signature,
            'a' => Self::Array,
            '(' => Self::Struct,
            '{' => Self::DictEntry,
            'v' => Self::Variant,
            '*' => Self::Wildcard,
            _ => return None,
        };
        Some(tag)
    }

    /// The character this tag is written as.
    pub fn as_char(self) -> char {
        match self {
            Self::Byte => 'y',
            Self::Bool => 'b',
            Self::Int16 => 'n',
            Self::UInt16 => 'q',
            Self::Int32 => 'i',
            Self::UInt32 => 'u',
            Self::Int64 => 'x',
            Self::UInt64 => 't',
            Self::Double => 'd',
            Self::String => 's',
            Self::ObjectPath => 'o',
            Self::Signature => 'g',
            Self::Array => 'a',
            Self::Struct => '(',
            Self::DictEntry => '{',
            Self::Variant => 'v',
            Self::Wildcard => '*',
        }
    }

    /// Returns `true` for the basic types: numbers, booleans and the three
    /// string kinds. Only these may be dictionary keys.
    pub fn is_scalar(self) -> bool {
        !matches!(
            self,
            Self::Array | Self::Struct | Self::DictEntry | Self::Variant | Self::Wildcard
        )
    }

    /// Returns `true` for `s`, `o` and `g`, which share a string payload.
    pub fn is_string_like(self) -> bool {
        matches!(self, Self::String | Self::ObjectPath | Self::Signature)
    }

    /// Lower-case type name, used as the element name in XML renderings.
    pub fn name(self) -> &'static str {
        match self {
            Self::Byte => "byte",
            Self::Bool => "boolean",
            Self::Int16 => "int16",
            Self::UInt16 => "uint16",
            Self::Int32 => "int32",
            Self::UInt32 => "uint32",
            Self::Int64 => "int64",
            Self::UInt64 => "uint64",
            Self::Double => "double",
            Self::String => "string",
            Self::ObjectPath => "object_path",
            Self::Signature => "signature",
            Self::Array => "array",
            Self::Struct => "struct",
            Self::DictEntry => "dict_entry",
            Self::Variant => "variant",
            Self::Wildcard => "wildcard",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}
