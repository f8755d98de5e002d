//! Native values: what callers hand to the encoder and get back from the
//! decoder.

use std::collections::{BTreeMap, HashMap};

use crate::Argument;

/// A native value, before encoding or after decoding.
///
/// Each scalar variant corresponds to exactly one signature tag, and the
/// encoder matches them strictly: a `Value::Byte` will not encode into an
/// `i` slot. `Float` exists only so callers can pass an `f32` for `d`; it
/// is widened to `f64` and always decodes as `Double`.
///
/// Containers are jagged: an `aai` value is a `Seq` of `Seq`s, each inner
/// sequence sized independently. Structs are also `Seq`s, one item per
/// member. Dictionaries are `Map`s, an ordered list of key/value pairs.
///
/// `Arg` carries an already-built [`Argument`]. It is the only thing a
/// `v` slot accepts, and the decoder returns one for `v`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Byte(u8),
    Bool(bool),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float(f32),
    Double(f64),
    Str(String),
    Seq(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Arg(Argument),
}

impl Value {
    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Byte(_) => "byte",
            Self::Bool(_) => "bool",
            Self::Int16(_) => "int16",
            Self::UInt16(_) => "uint16",
            Self::Int32(_) => "int32",
            Self::UInt32(_) => "uint32",
            Self::Int64(_) => "int64",
            Self::UInt64(_) => "uint64",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::Str(_) => "string",
            Self::Seq(_) => "sequence",
            Self::Map(_) => "map",
            Self::Arg(_) => "argument",
        }
    }

    /// Builds a `Seq` from anything convertible.
    pub fn seq<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Self::Seq(items.into_iter().map(Into::into).collect())
    }

    /// Builds a `Map` from key/value pairs, keeping their order.
    pub fn map<K: Into<Value>, V: Into<Value>>(
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        Self::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Self::Seq(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Self::Map(pairs) => Some(pairs),
            _ => None,
        }
    }

    pub fn as_arg(&self) -> Option<&Argument> {
        match self {
            Self::Arg(arg) => Some(arg),
            _ => None,
        }
    }

    /// Looks up a map value by key. Linear; maps are small.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.as_map()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

value_from! {
    u8 => Byte,
    bool => Bool,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
    f32 => Float,
    f64 => Double,
    String => Str,
    Argument => Arg,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::seq(items)
    }
}

impl<K: Into<Value>, V: Into<Value>> From<BTreeMap<K, V>> for Value {
    fn from(map: BTreeMap<K, V>) -> Self {
        Self::map(map)
    }
}

impl<K: Into<Value>, V: Into<Value>, S> From<HashMap<K, V, S>> for Value {
    fn from(map: HashMap<K, V, S>) -> Self {
        Self::map(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_scalars_picks_exact_variant() {
        assert_eq!(Value::from(7u8), Value::Byte(7));
        assert_eq!(Value::from(7i32), Value::Int32(7));
        assert_eq!(Value::from(1.5f32), Value::Float(1.5));
        assert_eq!(Value::from("hi"), Value::Str("hi".into()));
    }

    #[test]
    fn test_nested_vec_is_jagged_seq() {
        let v = Value::from(vec![vec![1i32, 2, 3], vec![4]]);
        let outer = v.as_seq().unwrap();
        assert_eq!(outer.len(), 2);
        assert_eq!(outer[1], Value::seq([4i32]));
    }

    #[test]
    fn test_map_get() {
        let v = Value::map([("apple", 2i32), ("pear", 1)]);
        assert_eq!(v.get(&"pear".into()), Some(&Value::Int32(1)));
        assert_eq!(v.get(&"kiwi".into()), None);
    }

    #[test]
    fn test_as_arg_only_for_prebuilt_arguments() {
        let v = Value::Arg(Argument::Int32(3));
        assert_eq!(v.as_arg(), Some(&Argument::Int32(3)));
        assert_eq!(Value::Int32(3).as_arg(), None);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Value::Seq(vec![]).kind(), "sequence");
        assert_eq!(Value::Map(vec![]).kind(), "map");
        assert_eq!(Value::Bool(true).kind(), "bool");
    }
}
