//! The decoder: [`Argument`] trees in, native [`Value`]s out.
//!
//! Decoding resolves through variants. When the requested type is not
//! `v`, every variant layer actually present is unwrapped before the tags
//! are compared, so `decode("i", v(v(42)))` yields `42` while
//! `decode("x", v(42))` is a [`CodecError::SignatureMismatch`]. Nothing is
//! ever converted between scalar types.

use busarg_signature::{split_top_level, Grammar, Signature, SignatureError, Tag};

use crate::{Argument, CodecConfig, CodecError, Value};

/// Reads native values out of argument trees.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: CodecConfig,
}

impl Decoder {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Decodes `arg` as the single complete type `signature`.
    ///
    /// Probe a variant by trying several signatures in turn:
    ///
    /// ```
    /// use busarg_codec::{Argument, Decoder, Value};
    ///
    /// let decoder = Decoder::default();
    /// let v = Argument::from_variant(Argument::Int32(420));
    /// assert!(decoder.decode("x", &v).unwrap_err().is_probe_failure());
    /// assert_eq!(decoder.decode("i", &v).unwrap(), Value::Int32(420));
    /// ```
    ///
    /// # Errors
    /// - [`CodecError::Signature`] for a malformed or compound signature.
    /// - [`CodecError::SignatureMismatch`] when the argument has another type.
    /// - [`CodecError::DuplicateKey`] for a dictionary with repeated keys
    ///   under [`DuplicateKeyPolicy::Reject`](crate::DuplicateKeyPolicy).
    pub fn decode(&self, signature: &str, arg: &Argument) -> Result<Value, CodecError> {
        let signature = Signature::parse_single(signature)?;
        self.decode_signature(&signature, arg)
    }

    /// Like [`decode`](Self::decode), for an already-parsed signature.
    ///
    /// # Errors
    /// As for [`decode`](Self::decode).
    pub fn decode_signature(
        &self,
        signature: &Signature,
        arg: &Argument,
    ) -> Result<Value, CodecError> {
        if !signature.is_single_element() {
            return Err(SignatureError::NotSingleElement {
                signature: signature.to_string(),
                found: signature.element_count(),
            }
            .into());
        }
        self.decode_logged(signature.as_str(), arg)
    }

    /// Decodes one argument per top-level element of a compound signature.
    ///
    /// # Errors
    /// [`CodecError::ShapeMismatch`] if the counts differ, otherwise as for
    /// [`decode`](Self::decode).
    pub fn decode_all(
        &self,
        signature: &str,
        args: &[Argument],
    ) -> Result<Vec<Value>, CodecError> {
        let elements = split_top_level(signature)?;
        if elements.len() != args.len() {
            return Err(CodecError::ShapeMismatch(format!(
                "signature {signature:?} has {} elements, got {} arguments",
                elements.len(),
                args.len()
            )));
        }
        elements
            .iter()
            .zip(args)
            .map(|(element, arg)| self.decode_logged(element, arg))
            .collect()
    }

    /// Finds the value stored under `key` in a dictionary argument.
    ///
    /// `entry_signature` is the dictionary's element type, e.g. `{sv}`. The
    /// value is decoded with the entry's value signature, so for `{sv}` the
    /// result is the variant's content as a [`Value::Arg`].
    ///
    /// # Errors
    /// - [`CodecError::NotADictionary`] if `dict` is not an array of entries.
    /// - [`CodecError::SignatureMismatch`] if its entries are not
    ///   `entry_signature`.
    /// - [`CodecError::ElementNotFound`] if no entry has the key.
    pub fn dict_lookup(
        &self,
        dict: &Argument,
        entry_signature: &str,
        key: &Value,
    ) -> Result<Value, CodecError> {
        let entry_sig = Grammar::STORED.parse(entry_signature)?;
        let Some((key_sig, value_sig)) = entry_sig.dict_entry_parts() else {
            return Err(CodecError::UnsupportedSignature(format!(
                "{entry_signature} is not a dictionary entry"
            )));
        };

        let Argument::Array(array) = unwrap_variants(dict) else {
            return Err(CodecError::NotADictionary(dict.signature().to_string()));
        };
        if !array.element_signature().as_str().starts_with('{') {
            return Err(CodecError::NotADictionary(array.signature().to_string()));
        }
        if *array.element_signature() != entry_sig {
            return Err(CodecError::SignatureMismatch {
                expected: entry_sig.to_string(),
                found: array.element_signature().to_string(),
            });
        }

        let key_tag = key_sig.first_tag().unwrap_or(Tag::String);
        let key = Argument::from_scalar(key_tag, key)?;
        let found = array.items().iter().rev().find_map(|item| match item {
            Argument::DictEntry(entry) if *entry.key() == key => Some(entry.value()),
            _ => None,
        });
        match found {
            Some(value) => self.decode_logged(value_sig.as_str(), value),
            None => Err(CodecError::ElementNotFound(key.key_fingerprint())),
        }
    }

    fn decode_logged(&self, signature: &str, arg: &Argument) -> Result<Value, CodecError> {
        let result = self.decode_element(signature, arg);
        if let Err(err) = &result {
            if err.is_probe_failure() {
                tracing::trace!(%signature, found = %arg.signature(), %err, "decode probe failed");
            }
        }
        result
    }

    // -- Dispatch over validated element signatures --

    fn decode_element(&self, signature: &str, arg: &Argument) -> Result<Value, CodecError> {
        let tag = signature
            .chars()
            .next()
            .and_then(Tag::from_char)
            .ok_or_else(|| CodecError::UnsupportedSignature(signature.to_owned()))?;

        match tag {
            Tag::Wildcard => return Ok(Value::Arg(arg.clone())),
            Tag::Variant => {
                return match arg {
                    Argument::Variant(inner) => Ok(Value::Arg(inner.as_ref().clone())),
                    other => Err(mismatch(signature, other)),
                };
            }
            _ => {}
        }

        let arg = unwrap_variants(arg);
        match (tag, arg) {
            (Tag::Array, Argument::Array(array)) => {
                let element = &signature[1..];
                if element.starts_with('{') {
                    return self.decode_dictionary(
                        signature,
                        array.element_signature(),
                        array.items(),
                        arg,
                    );
                }
                if element != "*" && *array.element_signature() != *element {
                    return Err(mismatch(signature, arg));
                }
                array
                    .items()
                    .iter()
                    .map(|item| self.decode_element(element, item))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Seq)
            }
            (Tag::Struct, Argument::Struct(st)) => {
                let members = Grammar::CALLER
                    .with_wildcard()
                    .split(&signature[1..signature.len() - 1])?;
                if members.len() != st.len() {
                    return Err(mismatch(signature, arg));
                }
                let positional = members
                    .iter()
                    .zip(st.members())
                    .all(|(member, item)| member.contains('*') || item.has_signature(member));
                if !positional {
                    return Err(mismatch(signature, arg));
                }
                members
                    .iter()
                    .zip(st.members())
                    .map(|(member, item)| self.decode_element(member, item))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Seq)
            }
            (tag, arg) if tag.is_scalar() && tag == arg.tag() => Ok(scalar_value(arg)),
            (_, arg) => Err(mismatch(signature, arg)),
        }
    }

    fn decode_dictionary(
        &self,
        signature: &str,
        element: &Signature,
        items: &[Argument],
        arg: &Argument,
    ) -> Result<Value, CodecError> {
        let entry = &signature[1..];
        if *element != *entry {
            return Err(mismatch(signature, arg));
        }
        let key_sig = &entry[1..2];
        let value_sig = &entry[2..entry.len() - 1];

        let mut keyed = Vec::with_capacity(items.len());
        for item in items {
            let Argument::DictEntry(pair) = item else {
                return Err(mismatch(entry, item));
            };
            let key = self.decode_element(key_sig, pair.key())?;
            let value = self.decode_element(value_sig, pair.value())?;
            keyed.push((pair.key().key_fingerprint(), (key, value)));
        }
        let pairs = self.config.duplicate_keys.apply(keyed)?;
        Ok(Value::Map(pairs))
    }
}

/// Strips every variant layer around `arg`.
fn unwrap_variants(mut arg: &Argument) -> &Argument {
    while let Argument::Variant(inner) = arg {
        arg = inner;
    }
    arg
}

fn mismatch(expected: &str, found: &Argument) -> CodecError {
    CodecError::SignatureMismatch {
        expected: expected.to_owned(),
        found: found.signature().to_string(),
    }
}

fn scalar_value(arg: &Argument) -> Value {
    match arg {
        Argument::Byte(v) => Value::Byte(*v),
        Argument::Bool(v) => Value::Bool(*v),
        Argument::Int16(v) => Value::Int16(*v),
        Argument::UInt16(v) => Value::UInt16(*v),
        Argument::Int32(v) => Value::Int32(*v),
        Argument::UInt32(v) => Value::UInt32(*v),
        Argument::Int64(v) => Value::Int64(*v),
        Argument::UInt64(v) => Value::UInt64(*v),
        Argument::Double(v) => Value::Double(*v),
        Argument::String(s) | Argument::ObjectPath(s) => Value::Str(s.clone()),
        Argument::Signature(sig) => Value::Str(sig.to_string()),
        other => Value::Arg(other.clone()),
    }
}
