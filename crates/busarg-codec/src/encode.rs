//! The encoder: native [`Value`]s in, [`Argument`] trees out.
//!
//! Dispatch is on the first character of an already-validated element
//! signature. Containers recurse with the slices of their own signature,
//! so nothing is re-tokenized more than once per level. Every call either
//! returns a complete argument or an error; nothing is half-built.

use busarg_signature::{split_top_level, Grammar, Signature, SignatureError, Tag};

use crate::argument::{is_valid_object_path, StructArg};
use crate::{Argument, CodecConfig, CodecError, Value};

/// Builds argument trees from native values.
///
/// Holds only its configuration; one encoder can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    config: CodecConfig,
}

impl Encoder {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encodes `value` as the single complete type `signature`.
    ///
    /// ```
    /// use busarg_codec::{Encoder, Value};
    ///
    /// let encoder = Encoder::default();
    /// let arg = encoder.encode("ai", &Value::seq([-8i32, -88, 888])).unwrap();
    /// assert_eq!(arg.signature(), "ai");
    /// assert!(encoder.encode("i", &Value::Bool(true)).is_err());
    /// ```
    ///
    /// # Errors
    /// - [`CodecError::Signature`] for a malformed signature, or one that is
    ///   not exactly one complete type.
    /// - [`CodecError::TypeMismatch`] when a native value has the wrong type.
    /// - [`CodecError::ShapeMismatch`] for wrong arity or mixed array items.
    /// - [`CodecError::InvalidObjectPath`], [`CodecError::DuplicateKey`] and
    ///   [`CodecError::TooDeep`] as configured.
    pub fn encode(&self, signature: &str, value: &Value) -> Result<Argument, CodecError> {
        let signature = Signature::parse_single(signature)?;
        self.encode_signature(&signature, value)
    }

    /// Like [`encode`](Self::encode), for an already-parsed signature.
    ///
    /// # Errors
    /// As for [`encode`](Self::encode).
    pub fn encode_signature(
        &self,
        signature: &Signature,
        value: &Value,
    ) -> Result<Argument, CodecError> {
        if !signature.is_single_element() {
            return Err(SignatureError::NotSingleElement {
                signature: signature.to_string(),
                found: signature.element_count(),
            }
            .into());
        }
        self.encode_checked(signature.as_str(), value)
    }

    /// Encodes one value per top-level element of a compound signature.
    ///
    /// `encode_all("(is)ai", ...)` takes two values. The result is either
    /// every argument or an error.
    ///
    /// # Errors
    /// [`CodecError::ShapeMismatch`] if the number of values differs from
    /// the number of elements, otherwise as for [`encode`](Self::encode).
    pub fn encode_all(
        &self,
        signature: &str,
        values: &[Value],
    ) -> Result<Vec<Argument>, CodecError> {
        let elements = split_top_level(signature)?;
        if elements.len() != values.len() {
            return Err(CodecError::ShapeMismatch(format!(
                "signature {signature:?} has {} elements, got {} values",
                elements.len(),
                values.len()
            )));
        }
        elements
            .iter()
            .zip(values)
            .map(|(element, value)| self.encode_checked(element, value))
            .collect()
    }

    /// Builds an array from pre-built arguments, taking the element type
    /// from the first one.
    ///
    /// # Errors
    /// [`CodecError::ShapeMismatch`] for no items or items of differing
    /// signatures; [`CodecError::TypeMismatch`] for a non-argument item.
    pub fn encode_inferred_array(&self, items: &[Value]) -> Result<Argument, CodecError> {
        let signature = Grammar::CALLER.with_wildcard().parse("a*")?;
        let arg = self.encode_array(signature.as_str(), "*", items)?;
        self.check_depth(arg)
    }

    fn encode_checked(&self, signature: &str, value: &Value) -> Result<Argument, CodecError> {
        let arg = self.encode_element(signature, value)?;
        self.check_depth(arg)
    }

    fn check_depth(&self, arg: Argument) -> Result<Argument, CodecError> {
        let depth = arg.depth();
        if depth > self.config.max_depth {
            return Err(CodecError::TooDeep {
                depth,
                max: self.config.max_depth,
            });
        }
        Ok(arg)
    }

    // -- Dispatch over validated element signatures --

    fn encode_element(&self, signature: &str, value: &Value) -> Result<Argument, CodecError> {
        let tag = signature
            .chars()
            .next()
            .and_then(Tag::from_char)
            .ok_or_else(|| CodecError::UnsupportedSignature(signature.to_owned()))?;

        match (tag, value) {
            (Tag::Variant, Value::Arg(Argument::Variant(inner))) => {
                Ok(Argument::Variant(inner.clone()))
            }
            (Tag::Variant, Value::Arg(arg)) => Ok(Argument::from_variant(arg.clone())),
            (Tag::Variant, other) => Err(CodecError::type_mismatch(tag, other)),
            (Tag::Wildcard, Value::Arg(arg)) => Ok(arg.clone()),
            (Tag::Wildcard, other) => Err(CodecError::type_mismatch(tag, other)),
            (_, Value::Arg(arg)) if arg.has_signature(signature) => Ok(arg.clone()),
            (_, Value::Arg(arg)) => Err(CodecError::TypeMismatch {
                expected: signature.to_owned(),
                found: format!("argument of signature {}", arg.signature()),
            }),
            (Tag::Array, Value::Seq(items)) => {
                self.encode_array(signature, &signature[1..], items)
            }
            (Tag::Array, Value::Map(pairs)) if signature.starts_with("a{") => {
                self.encode_dictionary(signature, pairs)
            }
            (Tag::Struct, Value::Seq(items)) => self.encode_struct(signature, items),
            (Tag::DictEntry, _) => Err(CodecError::UnsupportedSignature(format!(
                "{signature} is only valid as an array element"
            ))),
            (tag, value) if tag.is_scalar() => self.encode_scalar(tag, value),
            (_, value) => Err(CodecError::TypeMismatch {
                expected: signature.to_owned(),
                found: value.kind().to_owned(),
            }),
        }
    }

    fn encode_scalar(&self, tag: Tag, value: &Value) -> Result<Argument, CodecError> {
        let arg = Argument::from_scalar(tag, value)?;
        if let Argument::ObjectPath(path) = &arg {
            if self.config.validate_object_paths && !is_valid_object_path(path) {
                return Err(CodecError::InvalidObjectPath(path.clone()));
            }
        }
        Ok(arg)
    }

    fn encode_array(
        &self,
        signature: &str,
        element: &str,
        items: &[Value],
    ) -> Result<Argument, CodecError> {
        if element.starts_with('{') {
            // A dictionary given as a sequence is a caller error, not a
            // request for an array of entries.
            return Err(CodecError::TypeMismatch {
                expected: signature.to_owned(),
                found: Value::Seq(Vec::new()).kind().to_owned(),
            });
        }

        let built = items
            .iter()
            .map(|item| self.encode_element(element, item))
            .collect::<Result<Vec<_>, _>>()?;

        if element == "*" {
            return Argument::from_wildcard_array(built);
        }
        if element == "v" {
            check_uniform_variants(&built)?;
        }
        let element = Grammar::STORED.parse(element)?;
        Argument::from_array(element, built)
    }

    fn encode_dictionary(
        &self,
        signature: &str,
        pairs: &[(Value, Value)],
    ) -> Result<Argument, CodecError> {
        // `a{kv}`: the key is always one character.
        let entry = &signature[1..];
        let key_sig = &entry[1..2];
        let value_sig = &entry[2..entry.len() - 1];

        let mut keyed = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            let key = self.encode_element(key_sig, key)?;
            let value = self.encode_element(value_sig, value)?;
            let fingerprint = key.key_fingerprint();
            keyed.push((fingerprint, Argument::from_dict_entry(key, value)?));
        }
        let entries = self.config.duplicate_keys.apply(keyed)?;

        Argument::from_array(Grammar::STORED.parse(entry)?, entries)
    }

    fn encode_struct(&self, signature: &str, items: &[Value]) -> Result<Argument, CodecError> {
        let members = Grammar::CALLER
            .with_wildcard()
            .split(&signature[1..signature.len() - 1])?;
        if members.len() != items.len() {
            return Err(CodecError::ShapeMismatch(format!(
                "struct {signature} has {} members, got {} values",
                members.len(),
                items.len()
            )));
        }
        let built = members
            .iter()
            .zip(items)
            .map(|(member, item)| self.encode_element(member, item))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Argument::Struct(StructArg::new(built)?))
    }
}

/// The first variant's content fixes the type for the rest of an `av`.
fn check_uniform_variants(items: &[Argument]) -> Result<(), CodecError> {
    let mut inner = items.iter().map(|item| match item {
        Argument::Variant(inner) => inner.signature(),
        other => other.signature(),
    });
    let Some(first) = inner.next() else {
        return Ok(());
    };
    for (index, sig) in inner.enumerate() {
        if sig != first {
            return Err(CodecError::ShapeMismatch(format!(
                "variant item {} holds {sig}, expected {first}",
                index + 1
            )));
        }
    }
    Ok(())
}
