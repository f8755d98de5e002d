//! The argument value model: a self-describing tree of typed values.
//!
//! An [`Argument`] is what the encoder produces and the decoder reads.
//! Scalars are plain enum variants. Containers wrap small structs with
//! private fields ([`ArrayArg`], [`StructArg`], [`DictEntry`]) so their
//! invariants can only be established through the checked constructors:
//!
//! - every item of an array has the array's element signature,
//! - a struct has at least one member and its signature follows them,
//! - a dictionary entry's key is a basic type.
//!
//! Containers store their own signature, so reading it never allocates a
//! new string tree and never fails.

use std::fmt;

use busarg_signature::{Signature, Tag};
use serde::{Deserialize, Serialize};

use crate::{CodecError, Value};

// ---------------------------------------------------------------------------
// Argument
// ---------------------------------------------------------------------------

/// One typed value, possibly containing other arguments.
///
/// `#[serde(tag = "type", content = "value")]` gives the adjacently
/// tagged form `{"type": "Int32", "value": 42}` when an argument tree
/// travels through a [`Codec`](crate::Codec).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Argument {
    Byte(u8),
    Bool(bool),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Double(f64),
    String(String),
    ObjectPath(String),
    Signature(Signature),
    Array(ArrayArg),
    Struct(StructArg),
    DictEntry(Box<DictEntry>),
    Variant(Box<Argument>),
}

impl Argument {
    // -- Construction primitives --

    /// Builds a scalar argument for `tag` from a native value.
    ///
    /// Types must match exactly. The one widening allowed is `f32` into
    /// `d`, because the grammar has no single-precision tag. `g` values are
    /// parsed as signatures. `o` values are not checked here; the
    /// [`Encoder`](crate::Encoder) checks them when configured to.
    ///
    /// # Errors
    /// - [`CodecError::TypeMismatch`] if the value has the wrong type.
    /// - [`CodecError::Signature`] if a `g` value is not a valid signature.
    /// - [`CodecError::UnsupportedSignature`] if `tag` is not a scalar tag.
    pub fn from_scalar(tag: Tag, value: &Value) -> Result<Self, CodecError> {
        let arg = match (tag, value) {
            (Tag::Byte, Value::Byte(v)) => Self::Byte(*v),
            (Tag::Bool, Value::Bool(v)) => Self::Bool(*v),
            (Tag::Int16, Value::Int16(v)) => Self::Int16(*v),
            (Tag::UInt16, Value::UInt16(v)) => Self::UInt16(*v),
            (Tag::Int32, Value::Int32(v)) => Self::Int32(*v),
            (Tag::UInt32, Value::UInt32(v)) => Self::UInt32(*v),
            (Tag::Int64, Value::Int64(v)) => Self::Int64(*v),
            (Tag::UInt64, Value::UInt64(v)) => Self::UInt64(*v),
            (Tag::Double, Value::Double(v)) => Self::Double(*v),
            (Tag::Double, Value::Float(v)) => Self::Double(f64::from(*v)),
            (Tag::String, Value::Str(s)) => Self::String(s.clone()),
            (Tag::ObjectPath, Value::Str(s)) => Self::ObjectPath(s.clone()),
            (Tag::Signature, Value::Str(s)) => Self::Signature(Signature::parse(s)?),
            (tag, value) if tag.is_scalar() => {
                return Err(CodecError::type_mismatch(tag, value))
            }
            (tag, _) => {
                return Err(CodecError::UnsupportedSignature(format!(
                    "{tag} is not a scalar type"
                )))
            }
        };
        Ok(arg)
    }

    /// Builds an array whose items all have signature `element`.
    ///
    /// # Errors
    /// [`CodecError::ShapeMismatch`] if an item has a different signature.
    pub fn from_array(
        element: Signature,
        items: Vec<Argument>,
    ) -> Result<Self, CodecError> {
        Ok(Self::Array(ArrayArg::new(element, items)?))
    }

    /// Builds an array whose element signature is taken from the first
    /// item. This is what the `*` wildcard resolves to.
    ///
    /// # Errors
    /// [`CodecError::ShapeMismatch`] if `items` is empty or a later item
    /// disagrees with the first.
    pub fn from_wildcard_array(items: Vec<Argument>) -> Result<Self, CodecError> {
        let Some(first) = items.first() else {
            return Err(CodecError::ShapeMismatch(
                "cannot infer the element type of an empty array".into(),
            ));
        };
        let element = first.signature();
        Self::from_array(element, items)
    }

    /// Builds a struct, checking the members against the expected member
    /// signatures.
    ///
    /// # Errors
    /// [`CodecError::ShapeMismatch`] on an arity or member-type mismatch.
    pub fn from_struct(
        members: &[Signature],
        items: Vec<Argument>,
    ) -> Result<Self, CodecError> {
        if members.len() != items.len() {
            return Err(CodecError::ShapeMismatch(format!(
                "struct has {} members, got {} values",
                members.len(),
                items.len()
            )));
        }
        for (index, (sig, item)) in members.iter().zip(&items).enumerate() {
            if !item.has_signature(sig.as_str()) {
                return Err(CodecError::ShapeMismatch(format!(
                    "struct member {index} is {}, expected {sig}",
                    item.signature()
                )));
            }
        }
        Ok(Self::Struct(StructArg::new(items)?))
    }

    /// Builds a dictionary entry.
    ///
    /// # Errors
    /// [`CodecError::ShapeMismatch`] if the key is not a basic type.
    pub fn from_dict_entry(key: Argument, value: Argument) -> Result<Self, CodecError> {
        Ok(Self::DictEntry(Box::new(DictEntry::new(key, value)?)))
    }

    /// Wraps an argument in a variant. The inner argument is kept exactly
    /// as given.
    pub fn from_variant(inner: Argument) -> Self {
        Self::Variant(Box::new(inner))
    }

    /// Looks up `key` in this dictionary with the default decoder. See
    /// [`Decoder::dict_lookup`](crate::Decoder::dict_lookup).
    ///
    /// # Errors
    /// As for [`Decoder::dict_lookup`](crate::Decoder::dict_lookup).
    pub fn dict_lookup(&self, entry_signature: &str, key: &Value) -> Result<Value, CodecError> {
        crate::Decoder::default().dict_lookup(self, entry_signature, key)
    }

    // -- Introspection --

    /// The tag of this argument.
    pub fn tag(&self) -> Tag {
        match self {
            Self::Byte(_) => Tag::Byte,
            Self::Bool(_) => Tag::Bool,
            Self::Int16(_) => Tag::Int16,
            Self::UInt16(_) => Tag::UInt16,
            Self::Int32(_) => Tag::Int32,
            Self::UInt32(_) => Tag::UInt32,
            Self::Int64(_) => Tag::Int64,
            Self::UInt64(_) => Tag::UInt64,
            Self::Double(_) => Tag::Double,
            Self::String(_) => Tag::String,
            Self::ObjectPath(_) => Tag::ObjectPath,
            Self::Signature(_) => Tag::Signature,
            Self::Array(_) => Tag::Array,
            Self::Struct(_) => Tag::Struct,
            Self::DictEntry(_) => Tag::DictEntry,
            Self::Variant(_) => Tag::Variant,
        }
    }

    /// The complete signature of this argument.
    ///
    /// A variant's signature is `v`, whatever it holds.
    pub fn signature(&self) -> Signature {
        match self {
            Self::Array(array) => array.signature.clone(),
            Self::Struct(st) => st.signature.clone(),
            Self::DictEntry(entry) => entry.signature.clone(),
            // Every remaining tag is a leaf with a one-character signature.
            other => Signature::from_tag(other.tag()).unwrap_or_default(),
        }
    }

    /// Returns `true` if this argument's signature is exactly `signature`.
    pub fn has_signature(&self, signature: &str) -> bool {
        match self {
            Self::Array(array) => array.signature == signature,
            Self::Struct(st) => st.signature == signature,
            Self::DictEntry(entry) => entry.signature == signature,
            other => {
                let mut chars = signature.chars();
                chars.next() == Some(other.tag().as_char()) && chars.next().is_none()
            }
        }
    }

    /// Container nesting depth: 0 for scalars, one more than the deepest
    /// child for containers. Variants count.
    pub fn depth(&self) -> usize {
        match self {
            Self::Array(array) => 1 + max_depth(&array.items),
            Self::Struct(st) => 1 + max_depth(&st.members),
            Self::DictEntry(entry) => 1 + entry.key.depth().max(entry.value.depth()),
            Self::Variant(inner) => 1 + inner.depth(),
            _ => 0,
        }
    }

    /// Renders this argument as indented XML.
    ///
    /// ```text
    /// <struct>
    ///   <int32>42</int32>
    ///   <string>Hello</string>
    /// </struct>
    /// ```
    pub fn to_xml(&self, indent: usize) -> String {
        let mut out = String::new();
        self.write_xml(&mut out, indent);
        out
    }

    pub(crate) fn write_xml(&self, out: &mut String, indent: usize) {
        let pad = " ".repeat(indent);
        let name = self.tag().name();
        match self {
            Self::Array(array) if array.items.is_empty() => {
                out.push_str(&format!(
                    "{pad}<{name} type_sig=\"{}\"/>",
                    escape_xml(array.element.as_str())
                ));
            }
            Self::Array(array) => {
                out.push_str(&format!(
                    "{pad}<{name} type_sig=\"{}\">",
                    escape_xml(array.element.as_str())
                ));
                write_children(out, &array.items, indent);
                out.push_str(&format!("\n{pad}</{name}>"));
            }
            Self::Struct(st) => {
                out.push_str(&format!("{pad}<{name}>"));
                write_children(out, &st.members, indent);
                out.push_str(&format!("\n{pad}</{name}>"));
            }
            Self::DictEntry(entry) => {
                out.push_str(&format!("{pad}<{name}>"));
                for child in [&entry.key, &entry.value] {
                    out.push('\n');
                    child.write_xml(out, indent + 2);
                }
                out.push_str(&format!("\n{pad}</{name}>"));
            }
            Self::Variant(inner) => {
                out.push_str(&format!(
                    "{pad}<{name} signature=\"{}\">\n",
                    escape_xml(inner.signature().as_str())
                ));
                inner.write_xml(out, indent + 2);
                out.push_str(&format!("\n{pad}</{name}>"));
            }
            scalar => {
                out.push_str(&format!(
                    "{pad}<{name}>{}</{name}>",
                    escape_xml(&scalar.scalar_text())
                ));
            }
        }
    }

    fn scalar_text(&self) -> String {
        match self {
            Self::Byte(v) => v.to_string(),
            Self::Bool(v) => u8::from(*v).to_string(),
            Self::Int16(v) => v.to_string(),
            Self::UInt16(v) => v.to_string(),
            Self::Int32(v) => v.to_string(),
            Self::UInt32(v) => v.to_string(),
            Self::Int64(v) => v.to_string(),
            Self::UInt64(v) => v.to_string(),
            Self::Double(v) => v.to_string(),
            Self::String(s) | Self::ObjectPath(s) => s.clone(),
            Self::Signature(sig) => sig.to_string(),
            _ => String::new(),
        }
    }

    /// A string that is equal for two basic-typed arguments exactly when
    /// they are equal. Used to spot duplicate dictionary keys.
    pub(crate) fn key_fingerprint(&self) -> String {
        match self {
            Self::Double(v) => format!("d:{}", v.to_bits()),
            other => format!("{}:{}", other.tag(), other.scalar_text()),
        }
    }
}

fn max_depth(items: &[Argument]) -> usize {
    items.iter().map(Argument::depth).max().unwrap_or(0)
}

fn write_children(out: &mut String, items: &[Argument], indent: usize) {
    for item in items {
        out.push('\n');
        item.write_xml(out, indent + 2);
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xml(0))
    }
}

/// Returns `true` if `path` is a valid object path: `/`, or `/`-separated
/// non-empty segments of `[A-Za-z0-9_]` with no trailing slash.
pub fn is_valid_object_path(path: &str) -> bool {
    let Some(rest) = path.strip_prefix('/') else {
        return false;
    };
    if rest.is_empty() {
        return true;
    }
    rest.split('/').all(|segment| {
        !segment.is_empty()
            && segment
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_')
    })
}

// ---------------------------------------------------------------------------
// ArrayArg
// ---------------------------------------------------------------------------

/// A homogeneous, fixed-length sequence of arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ArrayRepr", into = "ArrayRepr")]
pub struct ArrayArg {
    element: Signature,
    signature: Signature,
    items: Vec<Argument>,
}

#[derive(Serialize, Deserialize)]
struct ArrayRepr {
    element: Signature,
    items: Vec<Argument>,
}

impl ArrayArg {
    /// Checks every item against `element` and builds the array.
    ///
    /// # Errors
    /// - [`CodecError::ShapeMismatch`] naming the first disagreeing item.
    /// - [`CodecError::Signature`] if `a<element>` is not a valid signature.
    pub fn new(element: Signature, items: Vec<Argument>) -> Result<Self, CodecError> {
        let signature = Signature::array_of(&element)?;
        if let Some((index, item)) = items
            .iter()
            .enumerate()
            .find(|(_, item)| !item.has_signature(element.as_str()))
        {
            return Err(CodecError::ShapeMismatch(format!(
                "array item {index} is {}, expected {element}",
                item.signature()
            )));
        }
        Ok(Self {
            element,
            signature,
            items,
        })
    }

    /// Signature shared by every item.
    pub fn element_signature(&self) -> &Signature {
        &self.element
    }

    /// Signature of the array itself, `a<element>`.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn items(&self) -> &[Argument] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<Argument> {
        self.items
    }
}

impl TryFrom<ArrayRepr> for ArrayArg {
    type Error = CodecError;

    fn try_from(repr: ArrayRepr) -> Result<Self, Self::Error> {
        Self::new(repr.element, repr.items)
    }
}

impl From<ArrayArg> for ArrayRepr {
    fn from(array: ArrayArg) -> Self {
        Self {
            element: array.element,
            items: array.items,
        }
    }
}

// ---------------------------------------------------------------------------
// StructArg
// ---------------------------------------------------------------------------

/// A fixed-arity, heterogeneous sequence of arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StructRepr", into = "StructRepr")]
pub struct StructArg {
    signature: Signature,
    members: Vec<Argument>,
}

#[derive(Serialize, Deserialize)]
struct StructRepr {
    members: Vec<Argument>,
}

impl StructArg {
    /// Builds a struct from its members. The signature follows them.
    ///
    /// # Errors
    /// [`CodecError::ShapeMismatch`] for zero members.
    pub fn new(members: Vec<Argument>) -> Result<Self, CodecError> {
        if members.is_empty() {
            return Err(CodecError::ShapeMismatch("a struct needs at least one member".into()));
        }
        let sigs: Vec<Signature> = members.iter().map(Argument::signature).collect();
        let signature = Signature::struct_of(&sigs)?;
        Ok(Self { signature, members })
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn members(&self) -> &[Argument] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn into_members(self) -> Vec<Argument> {
        self.members
    }
}

impl TryFrom<StructRepr> for StructArg {
    type Error = CodecError;

    fn try_from(repr: StructRepr) -> Result<Self, Self::Error> {
        Self::new(repr.members)
    }
}

impl From<StructArg> for StructRepr {
    fn from(st: StructArg) -> Self {
        Self { members: st.members }
    }
}

// ---------------------------------------------------------------------------
// DictEntry
// ---------------------------------------------------------------------------

/// One key/value pair of a dictionary. A dictionary is an array of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DictEntryRepr", into = "DictEntryRepr")]
pub struct DictEntry {
    signature: Signature,
    key: Argument,
    value: Argument,
}

#[derive(Serialize, Deserialize)]
struct DictEntryRepr {
    key: Argument,
    value: Argument,
}

impl DictEntry {
    /// # Errors
    /// [`CodecError::ShapeMismatch`] if `key` is not a basic type.
    pub fn new(key: Argument, value: Argument) -> Result<Self, CodecError> {
        if !key.tag().is_scalar() {
            return Err(CodecError::ShapeMismatch(format!(
                "dictionary key must be a basic type, got {}",
                key.signature()
            )));
        }
        let signature = Signature::dict_entry_of(&key.signature(), &value.signature())?;
        Ok(Self {
            signature,
            key,
            value,
        })
    }

    /// Signature of the entry, `{<key><value>}`.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn key(&self) -> &Argument {
        &self.key
    }

    pub fn value(&self) -> &Argument {
        &self.value
    }

    pub fn into_parts(self) -> (Argument, Argument) {
        (self.key, self.value)
    }
}

impl TryFrom<DictEntryRepr> for DictEntry {
    type Error = CodecError;

    fn try_from(repr: DictEntryRepr) -> Result<Self, Self::Error> {
        Self::new(repr.key, repr.value)
    }
}

impl From<DictEntry> for DictEntryRepr {
    fn from(entry: DictEntry) -> Self {
        Self {
            key: entry.key,
            value: entry.value,
        }
    }
}
