//! [`ArgList`]: a fixed-length run of argument slots.
//!
//! This is the shape a method call's arguments take: a known number of
//! independent values, each set and read by index. The length is fixed at
//! creation. A slot holds either a complete [`Argument`] or nothing.

use busarg_signature::{split_top_level, Signature};

use crate::{Argument, CodecConfig, CodecError, Decoder, Encoder, Value};

/// A fixed-length sequence of independently settable arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgList {
    slots: Vec<Option<Argument>>,
    config: CodecConfig,
}

impl ArgList {
    /// Creates `len` empty slots with the default [`CodecConfig`].
    pub fn new(len: usize) -> Self {
        Self::with_config(len, CodecConfig::default())
    }

    /// Creates `len` empty slots encoded and decoded under `config`.
    pub fn with_config(len: usize, config: CodecConfig) -> Self {
        Self {
            slots: vec![None; len],
            config,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// The argument in slot `index`.
    ///
    /// # Errors
    /// [`CodecError::IndexOutOfRange`] or [`CodecError::EmptySlot`].
    pub fn slot(&self, index: usize) -> Result<&Argument, CodecError> {
        self.slots
            .get(index)
            .ok_or(CodecError::IndexOutOfRange {
                index,
                len: self.slots.len(),
            })?
            .as_ref()
            .ok_or(CodecError::EmptySlot(index))
    }

    /// Puts an already-built argument in slot `index`, returning what was
    /// there.
    ///
    /// # Errors
    /// [`CodecError::IndexOutOfRange`].
    pub fn replace(
        &mut self,
        index: usize,
        arg: Argument,
    ) -> Result<Option<Argument>, CodecError> {
        let slot = self.slot_mut(index)?;
        Ok(slot.replace(arg))
    }

    /// Empties slot `index`, returning what was there.
    ///
    /// # Errors
    /// [`CodecError::IndexOutOfRange`].
    pub fn clear(&mut self, index: usize) -> Result<Option<Argument>, CodecError> {
        let slot = self.slot_mut(index)?;
        Ok(slot.take())
    }

    /// Encodes `value` as `signature` into slot `index`.
    ///
    /// On failure the slot keeps its previous content.
    ///
    /// # Errors
    /// [`CodecError::IndexOutOfRange`] or any [`Encoder::encode`] error.
    pub fn set(
        &mut self,
        index: usize,
        signature: &str,
        value: &Value,
    ) -> Result<(), CodecError> {
        self.slot_mut(index)?;
        let arg = Encoder::new(self.config.clone()).encode(signature, value)?;
        self.replace(index, arg)?;
        Ok(())
    }

    /// Decodes slot `index` as `signature`.
    ///
    /// # Errors
    /// [`CodecError::IndexOutOfRange`], [`CodecError::EmptySlot`] or any
    /// [`Decoder::decode`] error.
    pub fn get(&self, index: usize, signature: &str) -> Result<Value, CodecError> {
        let arg = self.slot(index)?;
        Decoder::new(self.config.clone()).decode(signature, arg)
    }

    /// Encodes one value per top-level element of `signature` into
    /// consecutive slots starting at `offset`. Returns the number of slots
    /// written.
    ///
    /// ```
    /// use busarg_codec::{ArgList, Value};
    ///
    /// let mut args = ArgList::new(3);
    /// let written = args
    ///     .set_many(1, "sai", &["x".into(), Value::seq([1i32, 2])])
    ///     .unwrap();
    /// assert_eq!(written, 2);
    /// assert!(args.slot(0).is_err());
    /// ```
    ///
    /// Every value is encoded before any slot is written, so a failure
    /// leaves the list untouched.
    ///
    /// # Errors
    /// - [`CodecError::IndexOutOfRange`] if `offset` is past the end.
    /// - [`CodecError::Truncated`] if the signature needs more slots than
    ///   remain after `offset`.
    /// - Any [`Encoder::encode_all`] error.
    pub fn set_many(
        &mut self,
        offset: usize,
        signature: &str,
        values: &[Value],
    ) -> Result<usize, CodecError> {
        let needed = split_top_level(signature)?.len();
        self.check_range(offset, needed)?;

        let args = Encoder::new(self.config.clone()).encode_all(signature, values)?;
        let written = args.len();
        for (slot, arg) in self.slots[offset..].iter_mut().zip(args) {
            *slot = Some(arg);
        }
        tracing::debug!(offset, written, %signature, "set argument slots");
        Ok(written)
    }

    /// Decodes consecutive slots starting at `offset`, one per top-level
    /// element of `signature`.
    ///
    /// # Errors
    /// As for [`set_many`](Self::set_many), plus
    /// [`CodecError::EmptySlot`] and any [`Decoder::decode`] error.
    pub fn get_many(&self, offset: usize, signature: &str) -> Result<Vec<Value>, CodecError> {
        let elements = split_top_level(signature)?;
        self.check_range(offset, elements.len())?;

        let decoder = Decoder::new(self.config.clone());
        elements
            .iter()
            .enumerate()
            .map(|(i, element)| decoder.decode(element, self.slot(offset + i)?))
            .collect()
    }

    /// The signatures of every slot, concatenated in order.
    ///
    /// # Errors
    /// - [`CodecError::EmptySlot`] naming the first unset slot.
    /// - [`CodecError::Signature`] if the result exceeds the signature
    ///   length limit.
    pub fn signature(&self) -> Result<Signature, CodecError> {
        let sigs = self
            .slots
            .iter()
            .enumerate()
            .map(|(i, slot)| {
                slot.as_ref()
                    .map(Argument::signature)
                    .ok_or(CodecError::EmptySlot(i))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Signature::concat(&sigs)?)
    }

    /// Iterates the slots in order. `None` marks an empty slot.
    pub fn iter(&self) -> impl Iterator<Item = Option<&Argument>> {
        self.slots.iter().map(Option::as_ref)
    }

    /// Renders every set slot as XML, one after another.
    pub fn to_xml(&self, indent: usize) -> String {
        let mut out = String::new();
        for arg in self.iter().flatten() {
            if !out.is_empty() {
                out.push('\n');
            }
            arg.write_xml(&mut out, indent);
        }
        out
    }

    /// Takes the arguments out of the list.
    ///
    /// # Errors
    /// [`CodecError::EmptySlot`] naming the first unset slot.
    pub fn into_arguments(self) -> Result<Vec<Argument>, CodecError> {
        self.slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| slot.ok_or(CodecError::EmptySlot(i)))
            .collect()
    }

    fn slot_mut(&mut self, index: usize) -> Result<&mut Option<Argument>, CodecError> {
        let len = self.slots.len();
        self.slots
            .get_mut(index)
            .ok_or(CodecError::IndexOutOfRange { index, len })
    }

    fn check_range(&self, offset: usize, needed: usize) -> Result<(), CodecError> {
        let len = self.slots.len();
        if offset > len {
            return Err(CodecError::IndexOutOfRange { index: offset, len });
        }
        let available = len - offset;
        if needed > available {
            return Err(CodecError::Truncated { needed, available });
        }
        Ok(())
    }
}

impl From<Vec<Argument>> for ArgList {
    fn from(args: Vec<Argument>) -> Self {
        Self {
            slots: args.into_iter().map(Some).collect(),
            config: CodecConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_new_list_is_all_empty() {
        let args = ArgList::new(2);
        assert_eq!(args.len(), 2);
        assert!(matches!(args.slot(0), Err(CodecError::EmptySlot(0))));
        assert!(matches!(
            args.slot(2),
            Err(CodecError::IndexOutOfRange { index: 2, len: 2 })
        ));
    }

    #[test]
    fn test_set_and_get_by_index() {
        let mut args = ArgList::new(2);
        args.set(1, "s", &"hello".into()).unwrap();
        assert_eq!(args.get(1, "s").unwrap(), Value::from("hello"));
        assert!(args.get(0, "s").is_err());
    }

    #[test]
    fn test_failed_set_keeps_previous_value() {
        let mut args = ArgList::new(1);
        args.set(0, "i", &5i32.into()).unwrap();
        assert!(args.set(0, "i", &true.into()).is_err());
        assert_eq!(args.slot(0).unwrap(), &Argument::Int32(5));
    }

    #[test]
    fn test_set_many_truncated() {
        let mut args = ArgList::new(2);
        let err = args
            .set_many(1, "ii", &[1i32.into(), 2i32.into()])
            .unwrap_err();
        assert!(matches!(err, CodecError::Truncated { needed: 2, available: 1 }));
        assert_eq!(err.kind(), ErrorKind::Limit);
        assert!(args.iter().all(|slot| slot.is_none()));
    }

    #[test]
    fn test_set_many_is_all_or_nothing() {
        let mut args = ArgList::new(2);
        assert!(args.set_many(0, "is", &[1i32.into(), 2i32.into()]).is_err());
        assert!(args.iter().all(|slot| slot.is_none()));
    }

    #[test]
    fn test_clear_and_replace() {
        let mut args = ArgList::new(1);
        assert_eq!(args.replace(0, Argument::Bool(true)).unwrap(), None);
        assert_eq!(args.clear(0).unwrap(), Some(Argument::Bool(true)));
        assert!(args.slot(0).is_err());
        assert!(args.clear(3).is_err());
    }

    #[test]
    fn test_signature_concatenates_slots() {
        let mut args = ArgList::new(3);
        args.set_many(0, "sa{sv}", &["x".into(), Value::Map(vec![])])
            .unwrap();
        assert!(matches!(args.signature(), Err(CodecError::EmptySlot(2))));

        args.set(2, "u", &7u32.into()).unwrap();
        assert_eq!(args.signature().unwrap(), "sa{sv}u");
    }

    #[test]
    fn test_to_xml_renders_each_slot() {
        let args = ArgList::from(vec![Argument::Int32(1), Argument::Bool(false)]);
        assert_eq!(
            args.to_xml(0),
            "<int32>1</int32>\n<boolean>0</boolean>"
        );
    }

    #[test]
    fn test_into_arguments_requires_every_slot() {
        let mut args = ArgList::new(2);
        args.set(0, "y", &1u8.into()).unwrap();
        assert!(matches!(
            args.clone().into_arguments(),
            Err(CodecError::EmptySlot(1))
        ));
        args.set(1, "y", &2u8.into()).unwrap();
        assert_eq!(
            args.into_arguments().unwrap(),
            [Argument::Byte(1), Argument::Byte(2)]
        );
    }
}
