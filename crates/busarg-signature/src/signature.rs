//! The [`Signature`] newtype and the tokenizer behind it.
//!
//! A signature is a string over the tag alphabet describing one or more
//! values. Parsing walks it with a small recursive-descent [`Scanner`]
//! that validates every element completely, so a [`Signature`] value is
//! always well formed and its accessors never fail.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    SignatureError, Tag, MAX_ARRAY_DEPTH, MAX_SIGNATURE_LEN, MAX_STRUCT_DEPTH,
};

// ---------------------------------------------------------------------------
// Grammar
// ---------------------------------------------------------------------------

/// Which extensions of the caller grammar a parse accepts.
///
/// The default is the caller grammar: no `*`, and `{...}` only as the
/// element type of an array. [`Grammar::STORED`] also accepts a top-level
/// `{kv}`, which is what the element signature of a dictionary array looks
/// like on its own. `with_wildcard` accepts `*` wherever a complete type
/// may appear, for internal use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Grammar {
    wildcard: bool,
    bare_dict_entry: bool,
}

impl Grammar {
    /// The grammar accepted from callers.
    pub const CALLER: Self = Self {
        wildcard: false,
        bare_dict_entry: false,
    };

    /// The grammar of signatures stored inside argument trees: the caller
    /// grammar plus bare dictionary entries.
    pub const STORED: Self = Self {
        wildcard: false,
        bare_dict_entry: true,
    };

    /// Also accept the `*` wildcard.
    pub const fn with_wildcard(self) -> Self {
        Self {
            wildcard: true,
            ..self
        }
    }

    /// Splits `text` into its top-level element signatures.
    ///
    /// Each returned slice is one complete type: a scalar character, an
    /// `a` glued to its element, or a whole `(...)` / `{...}` run.
    ///
    /// # Errors
    /// Returns a [`SignatureError`] describing the first problem found.
    pub fn split<'a>(
        &self,
        text: &'a str,
    ) -> Result<Vec<&'a str>, SignatureError> {
        if text.len() > MAX_SIGNATURE_LEN {
            return Err(SignatureError::TooLong {
                len: text.len(),
                max: MAX_SIGNATURE_LEN,
            });
        }

        let mut scanner = Scanner::new(text, *self);
        let mut elements = Vec::new();
        while !scanner.at_end() {
            let start = scanner.pos;
            if self.bare_dict_entry && scanner.peek() == Some(b'{') {
                scanner.dict_entry()?;
            } else {
                scanner.element()?;
            }
            elements.push(&text[start..scanner.pos]);
        }
        Ok(elements)
    }

    /// Validates `text` and wraps it as a [`Signature`].
    ///
    /// # Errors
    /// Returns a [`SignatureError`] if `text` is malformed under this
    /// grammar.
    pub fn parse(&self, text: &str) -> Result<Signature, SignatureError> {
        self.split(text)?;
        Ok(Signature(text.to_owned()))
    }
}

/// Splits a caller-supplied signature into its top-level elements.
///
/// ```
/// use busarg_signature::split_top_level;
///
/// assert_eq!(split_top_level("issi").unwrap(), ["i", "s", "s", "i"]);
/// assert!(split_top_level("a{si").is_err());
/// ```
///
/// # Errors
/// Returns a [`SignatureError`] if the signature is malformed, including
/// an unterminated `(` or `{`.
pub fn split_top_level(signature: &str) -> Result<Vec<&str>, SignatureError> {
    Grammar::CALLER.split(signature)
}

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

/// Recursive-descent walker over the bytes of a signature.
///
/// Every accepted character is ASCII, so `pos` is always on a char
/// boundary when an error is reported.
struct Scanner<'a> {
    text: &'a str,
    pos: usize,
    arrays: usize,
    structs: usize,
    grammar: Grammar,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str, grammar: Grammar) -> Self {
        Self {
            text,
            pos: 0,
            arrays: 0,
            structs: 0,
            grammar,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn char_at(&self, offset: usize) -> char {
        self.text[offset..].chars().next().unwrap_or('\0')
    }

    /// Advances over one complete type.
    fn element(&mut self) -> Result<(), SignatureError> {
        let offset = self.pos;
        let Some(c) = self.peek() else {
            return Err(SignatureError::MissingElement { offset });
        };

        match c {
            b'a' => self.array(offset),
            b'(' => self.structure(offset),
            b'{' => Err(SignatureError::DictEntryOutsideArray { offset }),
            b')' | b'}' => Err(SignatureError::UnexpectedClose {
                close: c as char,
                offset,
            }),
            b'*' if self.grammar.wildcard => {
                self.pos += 1;
                Ok(())
            }
            b'*' => Err(SignatureError::WildcardNotAllowed { offset }),
            _ => match Tag::from_char(self.char_at(offset)) {
                Some(tag) if tag.is_scalar() || tag == Tag::Variant => {
                    self.pos += 1;
                    Ok(())
                }
                _ => Err(SignatureError::UnknownTag {
                    tag: self.char_at(offset),
                    offset,
                }),
            },
        }
    }

    fn array(&mut self, offset: usize) -> Result<(), SignatureError> {
        self.arrays += 1;
        if self.arrays > MAX_ARRAY_DEPTH {
            return Err(SignatureError::TooDeep {
                container: "array",
                max: MAX_ARRAY_DEPTH,
                offset,
            });
        }
        self.pos += 1;

        match self.peek() {
            None => return Err(SignatureError::MissingElement { offset }),
            Some(b'{') => self.dict_entry()?,
            Some(_) => self.element()?,
        }
        self.arrays -= 1;
        Ok(())
    }

    fn enter_struct(&mut self, offset: usize) -> Result<(), SignatureError> {
        // Dictionary entries count against the struct limit as well.
        self.structs += 1;
        if self.structs > MAX_STRUCT_DEPTH {
            return Err(SignatureError::TooDeep {
                container: "struct",
                max: MAX_STRUCT_DEPTH,
                offset,
            });
        }
        Ok(())
    }

    fn structure(&mut self, offset: usize) -> Result<(), SignatureError> {
        self.enter_struct(offset)?;
        self.pos += 1;

        let mut members = 0usize;
        loop {
            match self.peek() {
                None => {
                    return Err(SignatureError::Unbalanced { open: '(', offset })
                }
                Some(b')') => break,
                Some(_) => {
                    self.element()?;
                    members += 1;
                }
            }
        }
        if members == 0 {
            return Err(SignatureError::EmptyStruct { offset });
        }

        self.pos += 1;
        self.structs -= 1;
        Ok(())
    }

    /// Advances over `{kv}`. The caller has already seen the `{`.
    fn dict_entry(&mut self) -> Result<(), SignatureError> {
        let offset = self.pos;
        self.enter_struct(offset)?;
        self.pos += 1;

        let key_offset = self.pos;
        match self.peek() {
            None => return Err(SignatureError::Unbalanced { open: '{', offset }),
            Some(b'}') => return Err(SignatureError::InvalidDictEntry { offset }),
            Some(_) => match Tag::from_char(self.char_at(key_offset)) {
                Some(tag) if tag.is_scalar() => self.pos += 1,
                _ => {
                    return Err(SignatureError::InvalidDictKey {
                        key: self.char_at(key_offset),
                        offset: key_offset,
                    })
                }
            },
        }

        match self.peek() {
            None => return Err(SignatureError::Unbalanced { open: '{', offset }),
            Some(b'}') => return Err(SignatureError::InvalidDictEntry { offset }),
            Some(_) => self.element()?,
        }

        match self.peek() {
            None => Err(SignatureError::Unbalanced { open: '{', offset }),
            Some(b'}') => {
                self.pos += 1;
                self.structs -= 1;
                Ok(())
            }
            Some(_) => Err(SignatureError::InvalidDictEntry { offset }),
        }
    }
}

/// Returns the end offset of the element starting at `start`.
///
/// Only used on text that already passed the scanner.
fn element_end(bytes: &[u8], start: usize) -> usize {
    let mut pos = start;
    while bytes.get(pos) == Some(&b'a') {
        pos += 1;
    }
    match bytes.get(pos) {
        Some(b'(') | Some(b'{') => {
            let mut depth = 0usize;
            while let Some(&c) = bytes.get(pos) {
                pos += 1;
                match c {
                    b'(' | b'{' => depth += 1,
                    b')' | b'}' => {
                        depth = depth.saturating_sub(1);
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
            }
            pos
        }
        Some(_) => pos + 1,
        None => pos,
    }
}

fn split_validated(text: &str) -> Vec<Signature> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        let end = element_end(bytes, pos);
        out.push(Signature(text[pos..end].to_owned()));
        pos = end;
    }
    out
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// A validated type signature.
///
/// May be empty, a single complete type such as `"a{sv}"`, or a compound
/// of several (`"issi"`). Construct one with [`Signature::parse`] (caller
/// grammar), [`Grammar::parse`], or the composition helpers
/// ([`array_of`](Self::array_of), [`struct_of`](Self::struct_of), ...).
///
/// Serialized as a plain string. Deserialization accepts the
/// [`Grammar::STORED`] grammar because argument trees store dictionary
/// element signatures such as `{sv}` on their own.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Signature(String);

impl Signature {
    /// Parses a caller-supplied signature.
    ///
    /// # Errors
    /// Returns a [`SignatureError`] if the text is malformed.
    pub fn parse(text: &str) -> Result<Self, SignatureError> {
        Grammar::CALLER.parse(text)
    }

    /// Parses a signature that must hold exactly one complete type.
    ///
    /// # Errors
    /// Returns [`SignatureError::NotSingleElement`] for empty or compound
    /// input, or the parse error for malformed input.
    pub fn parse_single(text: &str) -> Result<Self, SignatureError> {
        let found = Grammar::CALLER.split(text)?.len();
        if found != 1 {
            return Err(SignatureError::NotSingleElement {
                signature: text.to_owned(),
                found,
            });
        }
        Ok(Self(text.to_owned()))
    }

    /// The single-character signature of a scalar or variant tag.
    ///
    /// Returns `None` for container tags and the wildcard, which have no
    /// signature on their own.
    pub fn from_tag(tag: Tag) -> Option<Self> {
        if tag.is_scalar() || tag == Tag::Variant {
            Some(Self(tag.as_char().to_string()))
        } else {
            None
        }
    }

    /// The signature `v`.
    pub fn variant() -> Self {
        Self("v".to_owned())
    }

    /// Builds `a<element>`.
    ///
    /// `element` may be a bare dictionary entry, giving `a{kv}`.
    ///
    /// # Errors
    /// Returns an error if `element` is not a single type or the result
    /// breaks a nesting or length limit.
    pub fn array_of(element: &Signature) -> Result<Self, SignatureError> {
        element.require_single()?;
        Grammar::CALLER.parse(&format!("a{element}"))
    }

    /// Builds `(<members>)`.
    ///
    /// # Errors
    /// Returns [`SignatureError::EmptyStruct`] for no members, or an error
    /// if a member is not a single type or a limit is exceeded.
    pub fn struct_of(members: &[Signature]) -> Result<Self, SignatureError> {
        let mut text = String::from("(");
        for member in members {
            member.require_single()?;
            text.push_str(&member.0);
        }
        text.push(')');
        Grammar::CALLER.parse(&text)
    }

    /// Builds the bare dictionary entry `{<key><value>}`.
    ///
    /// # Errors
    /// Returns [`SignatureError::InvalidDictKey`] if `key` is not a basic
    /// type, or an error if `value` is not a single type.
    pub fn dict_entry_of(
        key: &Signature,
        value: &Signature,
    ) -> Result<Self, SignatureError> {
        value.require_single()?;
        Grammar::STORED.parse(&format!("{{{key}{value}}}"))
    }

    /// Concatenates signatures into a compound one.
    ///
    /// # Errors
    /// Returns [`SignatureError::TooLong`] if the result is too long.
    pub fn concat<'a>(
        parts: impl IntoIterator<Item = &'a Signature>,
    ) -> Result<Self, SignatureError> {
        let text: String = parts.into_iter().map(|s| s.as_str()).collect();
        Grammar::STORED.parse(&text)
    }

    /// The signature text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for the empty signature.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Tag of the first element, `None` when empty.
    pub fn first_tag(&self) -> Option<Tag> {
        self.0.chars().next().and_then(Tag::from_char)
    }

    /// Returns `true` if this is exactly one complete type.
    pub fn is_single_element(&self) -> bool {
        !self.0.is_empty() && element_end(self.0.as_bytes(), 0) == self.0.len()
    }

    /// Splits this signature into its top-level elements.
    pub fn elements(&self) -> Vec<Signature> {
        split_validated(&self.0)
    }

    /// Number of top-level elements.
    pub fn element_count(&self) -> usize {
        let bytes = self.0.as_bytes();
        let mut pos = 0;
        let mut count = 0;
        while pos < bytes.len() {
            pos = element_end(bytes, pos);
            count += 1;
        }
        count
    }

    /// For a single array type `a<elem>`, the element signature.
    pub fn array_element(&self) -> Option<Signature> {
        if self.first_tag() == Some(Tag::Array) && self.is_single_element() {
            Some(Self(self.0[1..].to_owned()))
        } else {
            None
        }
    }

    /// For a single struct type, the member signatures in order.
    pub fn struct_members(&self) -> Option<Vec<Signature>> {
        if self.first_tag() == Some(Tag::Struct) && self.is_single_element() {
            Some(split_validated(&self.0[1..self.0.len() - 1]))
        } else {
            None
        }
    }

    /// For a bare dictionary entry `{kv}`, the key and value signatures.
    pub fn dict_entry_parts(&self) -> Option<(Signature, Signature)> {
        if self.first_tag() == Some(Tag::DictEntry) && self.is_single_element() {
            let inner = &self.0[1..self.0.len() - 1];
            Some((Self(inner[..1].to_owned()), Self(inner[1..].to_owned())))
        } else {
            None
        }
    }

    /// Returns `true` for `a{..}`, an array of dictionary entries.
    pub fn is_dictionary(&self) -> bool {
        self.0.starts_with("a{") && self.is_single_element()
    }

    fn require_single(&self) -> Result<(), SignatureError> {
        if self.is_single_element() {
            Ok(())
        } else {
            Err(SignatureError::NotSingleElement {
                signature: self.0.clone(),
                found: self.element_count(),
            })
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Signature {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Signature {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Signature {
    type Error = SignatureError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Grammar::STORED.split(&value)?;
        Ok(Self(value))
    }
}

impl TryFrom<&str> for Signature {
    type Error = SignatureError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Signature> for String {
    fn from(sig: Signature) -> Self {
        sig.0
    }
}

impl PartialEq<str> for Signature {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Signature {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =====================================================================
    // Tokenizer
    // =====================================================================

    #[test]
    fn test_split_scalars() {
        assert_eq!(split_top_level("issi").unwrap(), ["i", "s", "s", "i"]);
    }

    #[test]
    fn test_split_nested_containers() {
        let parts =
            split_top_level("aas(issi)a{is}(i)(i(suasi(issi)(a{sv})))").unwrap();
        assert_eq!(
            parts,
            ["aas", "(issi)", "a{is}", "(i)", "(i(suasi(issi)(a{sv})))"]
        );
    }

    #[test]
    fn test_split_empty_is_no_elements() {
        assert!(split_top_level("").unwrap().is_empty());
    }

    #[test]
    fn test_unterminated_struct_is_malformed() {
        assert_eq!(
            split_top_level("(ai(ss)"),
            Err(SignatureError::Unbalanced { open: '(', offset: 0 })
        );
    }

    #[test]
    fn test_unterminated_dict_is_malformed() {
        assert_eq!(
            split_top_level("a{si"),
            Err(SignatureError::Unbalanced { open: '{', offset: 1 })
        );
    }

    #[test]
    fn test_stray_close_is_malformed() {
        assert_eq!(
            split_top_level("i)"),
            Err(SignatureError::UnexpectedClose { close: ')', offset: 1 })
        );
    }

    #[test]
    fn test_array_without_element() {
        assert_eq!(
            split_top_level("ia"),
            Err(SignatureError::MissingElement { offset: 1 })
        );
    }

    #[test]
    fn test_empty_struct_rejected() {
        assert_eq!(
            split_top_level("()"),
            Err(SignatureError::EmptyStruct { offset: 0 })
        );
    }

    #[test]
    fn test_dict_entry_outside_array_rejected() {
        assert_eq!(
            split_top_level("{si}"),
            Err(SignatureError::DictEntryOutsideArray { offset: 0 })
        );
    }

    #[test]
    fn test_dict_key_must_be_basic() {
        assert_eq!(
            split_top_level("a{vi}"),
            Err(SignatureError::InvalidDictKey { key: 'v', offset: 2 })
        );
        assert_eq!(
            split_top_level("a{(i)i}"),
            Err(SignatureError::InvalidDictKey { key: '(', offset: 2 })
        );
    }

    #[test]
    fn test_dict_entry_arity() {
        assert!(matches!(
            split_top_level("a{s}"),
            Err(SignatureError::InvalidDictEntry { .. })
        ));
        assert!(matches!(
            split_top_level("a{sii}"),
            Err(SignatureError::InvalidDictEntry { .. })
        ));
    }

    #[test]
    fn test_unknown_tag() {
        assert_eq!(
            split_top_level("iz"),
            Err(SignatureError::UnknownTag { tag: 'z', offset: 1 })
        );
    }

    #[test]
    fn test_wildcard_needs_internal_grammar() {
        assert_eq!(
            split_top_level("a*"),
            Err(SignatureError::WildcardNotAllowed { offset: 1 })
        );
        assert_eq!(
            Grammar::CALLER.with_wildcard().split("a*i").unwrap(),
            ["a*", "i"]
        );
    }

    #[test]
    fn test_bare_dict_entry_grammar() {
        assert_eq!(Grammar::STORED.split("{sv}").unwrap(), ["{sv}"]);
    }

    #[test]
    fn test_length_limit() {
        let long = "i".repeat(MAX_SIGNATURE_LEN + 1);
        assert!(matches!(
            split_top_level(&long),
            Err(SignatureError::TooLong { .. })
        ));
        assert!(split_top_level(&"i".repeat(MAX_SIGNATURE_LEN)).is_ok());
    }

    #[test]
    fn test_array_depth_limit() {
        let ok = format!("{}i", "a".repeat(MAX_ARRAY_DEPTH));
        assert!(split_top_level(&ok).is_ok());
        let too_deep = format!("{}i", "a".repeat(MAX_ARRAY_DEPTH + 1));
        assert!(matches!(
            split_top_level(&too_deep),
            Err(SignatureError::TooDeep { container: "array", .. })
        ));
    }

    #[test]
    fn test_struct_depth_limit() {
        let deep = format!(
            "{}i{}",
            "(".repeat(MAX_STRUCT_DEPTH + 1),
            ")".repeat(MAX_STRUCT_DEPTH + 1)
        );
        assert!(matches!(
            split_top_level(&deep),
            Err(SignatureError::TooDeep { container: "struct", .. })
        ));
    }

    // =====================================================================
    // Signature accessors
    // =====================================================================

    #[test]
    fn test_elements_match_tokenizer() {
        let sig = Signature::parse("aas(issi)a{is}(i)").unwrap();
        let elements: Vec<String> =
            sig.elements().into_iter().map(String::from).collect();
        assert_eq!(elements, ["aas", "(issi)", "a{is}", "(i)"]);
        assert_eq!(sig.element_count(), 4);
        assert!(!sig.is_single_element());
    }

    #[test]
    fn test_array_element() {
        let sig = Signature::parse("aai").unwrap();
        assert_eq!(sig.array_element().unwrap(), "ai");
        assert!(Signature::parse("ai").unwrap().array_element().is_some());
        assert!(Signature::parse("aii").unwrap().array_element().is_none());
    }

    #[test]
    fn test_struct_members() {
        let sig = Signature::parse("(i(ss)a{sv})").unwrap();
        let members = sig.struct_members().unwrap();
        assert_eq!(members, ["i", "(ss)", "a{sv}"]);
    }

    #[test]
    fn test_dict_entry_parts() {
        let sig = Signature::parse("a{s(yus)}").unwrap();
        assert!(sig.is_dictionary());
        let entry = sig.array_element().unwrap();
        let (key, value) = entry.dict_entry_parts().unwrap();
        assert_eq!(key, "s");
        assert_eq!(value, "(yus)");
    }

    #[test]
    fn test_parse_single_rejects_compound() {
        assert!(Signature::parse_single("a{sv}").is_ok());
        assert_eq!(
            Signature::parse_single("is"),
            Err(SignatureError::NotSingleElement {
                signature: "is".into(),
                found: 2
            })
        );
        assert!(Signature::parse_single("").is_err());
    }

    // =====================================================================
    // Composition
    // =====================================================================

    #[test]
    fn test_compose_array_struct_dict() {
        let i = Signature::from_tag(Tag::Int32).unwrap();
        let s = Signature::from_tag(Tag::String).unwrap();

        assert_eq!(Signature::array_of(&i).unwrap(), "ai");
        assert_eq!(Signature::struct_of(&[i.clone(), s.clone()]).unwrap(), "(is)");

        let entry = Signature::dict_entry_of(&s, &Signature::variant()).unwrap();
        assert_eq!(entry, "{sv}");
        assert_eq!(Signature::array_of(&entry).unwrap(), "a{sv}");
    }

    #[test]
    fn test_compose_rejects_compound_element() {
        let compound = Signature::parse("ii").unwrap();
        assert!(Signature::array_of(&compound).is_err());
        assert!(Signature::struct_of(&[]).is_err());
    }

    #[test]
    fn test_dict_entry_of_rejects_container_key() {
        let key = Signature::parse("ai").unwrap();
        assert!(Signature::dict_entry_of(&key, &Signature::variant()).is_err());
    }

    #[test]
    fn test_from_tag_only_for_leaf_types() {
        assert_eq!(Signature::from_tag(Tag::Variant).unwrap(), "v");
        assert!(Signature::from_tag(Tag::Array).is_none());
        assert!(Signature::from_tag(Tag::Wildcard).is_none());
    }

    // =====================================================================
    // Serde
    // =====================================================================

    #[test]
    fn test_serializes_as_plain_string() {
        let sig = Signature::parse("a{sv}").unwrap();
        assert_eq!(serde_json::to_string(&sig).unwrap(), "\"a{sv}\"");
    }

    #[test]
    fn test_deserialize_validates() {
        let sig: Signature = serde_json::from_str("\"{sv}\"").unwrap();
        assert_eq!(sig, "{sv}");
        assert!(serde_json::from_str::<Signature>("\"(i\"").is_err());
    }
}
