//! Statically typed conversions on top of the dynamic encoder and decoder.
//!
//! [`BusType`] ties a Rust type to the signature it travels as, so callers
//! can write `Argument::from_typed(&vec![1i32, 2])` instead of spelling the
//! signature and building a [`Value`] by hand.

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use busarg_signature::Signature;

use crate::{Argument, CodecError, Decoder, Encoder, Value};

/// A Rust type with a fixed argument signature.
///
/// | Rust type | signature |
/// |-----------|-----------|
/// | `u8`, `bool`, `i16`, `u16`, `i32`, `u32`, `i64`, `u64` | `y b n q i u x t` |
/// | `f64`, `f32` | `d` |
/// | `String` | `s` |
/// | `Vec<T>` | `a` + T |
/// | `BTreeMap<K, V>`, `HashMap<K, V>` | `a{` K V `}` |
/// | `(A,)` .. `(A, B, C, D)` | `(` A B .. `)` |
/// | [`Argument`] | `v` |
///
/// `f32` is carried as `d`; reading one back narrows the stored `f64`.
pub trait BusType: Sized {
    /// The signature text of this type.
    fn signature() -> String;

    /// Converts to the native value the encoder expects for
    /// [`signature`](Self::signature).
    fn to_value(&self) -> Value;

    /// Converts from the native value the decoder produces for
    /// [`signature`](Self::signature).
    ///
    /// # Errors
    /// [`CodecError::TypeMismatch`] or [`CodecError::ShapeMismatch`] if the
    /// value does not have this type's shape.
    fn from_value(value: Value) -> Result<Self, CodecError>;
}

impl Argument {
    /// Encodes a typed value under its [`BusType::signature`].
    ///
    /// ```
    /// use busarg_codec::Argument;
    ///
    /// let arg = Argument::from_typed(&(42i32, "Hello".to_owned())).unwrap();
    /// assert_eq!(arg.signature(), "(is)");
    /// let back: (i32, String) = arg.to_typed().unwrap();
    /// assert_eq!(back, (42, "Hello".to_owned()));
    /// ```
    ///
    /// # Errors
    /// [`CodecError::Signature`] if the type's signature breaks a nesting
    /// limit, otherwise as for [`Encoder::encode`].
    pub fn from_typed<T: BusType>(value: &T) -> Result<Self, CodecError> {
        let signature = Signature::parse_single(&T::signature())?;
        Encoder::default().encode_signature(&signature, &value.to_value())
    }

    /// Decodes this argument as `T`.
    ///
    /// # Errors
    /// As for [`Decoder::decode`], plus [`BusType::from_value`] errors.
    pub fn to_typed<T: BusType>(&self) -> Result<T, CodecError> {
        let signature = Signature::parse_single(&T::signature())?;
        T::from_value(Decoder::default().decode_signature(&signature, self)?)
    }
}

// ---------------------------------------------------------------------------
// Scalars
// ---------------------------------------------------------------------------

macro_rules! scalar_bus_type {
    ($($ty:ty => $sig:literal, $variant:ident);* $(;)?) => {
        $(
            impl BusType for $ty {
                fn signature() -> String {
                    $sig.to_owned()
                }

                fn to_value(&self) -> Value {
                    Value::$variant(self.clone())
                }

                fn from_value(value: Value) -> Result<Self, CodecError> {
                    match value {
                        Value::$variant(v) => Ok(v),
                        other => Err(CodecError::type_mismatch($sig, &other)),
                    }
                }
            }
        )*
    };
}

scalar_bus_type! {
    u8 => "y", Byte;
    bool => "b", Bool;
    i16 => "n", Int16;
    u16 => "q", UInt16;
    i32 => "i", Int32;
    u32 => "u", UInt32;
    i64 => "x", Int64;
    u64 => "t", UInt64;
    f64 => "d", Double;
    String => "s", Str;
}

impl BusType for f32 {
    fn signature() -> String {
        "d".to_owned()
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value {
            Value::Double(v) => Ok(v as f32),
            Value::Float(v) => Ok(v),
            other => Err(CodecError::type_mismatch("d", &other)),
        }
    }
}

impl BusType for Argument {
    fn signature() -> String {
        "v".to_owned()
    }

    fn to_value(&self) -> Value {
        Value::Arg(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value {
            Value::Arg(arg) => Ok(arg),
            other => Err(CodecError::type_mismatch("v", &other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Containers
// ---------------------------------------------------------------------------

impl<T: BusType> BusType for Vec<T> {
    fn signature() -> String {
        format!("a{}", T::signature())
    }

    fn to_value(&self) -> Value {
        Value::Seq(self.iter().map(BusType::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value {
            Value::Seq(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(CodecError::type_mismatch(Self::signature(), &other)),
        }
    }
}

fn map_pairs<K: BusType, V: BusType>(
    signature: String,
    value: Value,
) -> Result<Vec<(K, V)>, CodecError> {
    match value {
        Value::Map(pairs) => pairs
            .into_iter()
            .map(|(k, v)| -> Result<(K, V), CodecError> {
                Ok((K::from_value(k)?, V::from_value(v)?))
            })
            .collect(),
        other => Err(CodecError::type_mismatch(signature, &other)),
    }
}

impl<K: BusType + Ord, V: BusType> BusType for BTreeMap<K, V> {
    fn signature() -> String {
        format!("a{{{}{}}}", K::signature(), V::signature())
    }

    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.to_value(), v.to_value()))
                .collect(),
        )
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        Ok(map_pairs(Self::signature(), value)?.into_iter().collect())
    }
}

impl<K, V, S> BusType for HashMap<K, V, S>
where
    K: BusType + Eq + Hash,
    V: BusType,
    S: BuildHasher + Default,
{
    fn signature() -> String {
        format!("a{{{}{}}}", K::signature(), V::signature())
    }

    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.to_value(), v.to_value()))
                .collect(),
        )
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        Ok(map_pairs(Self::signature(), value)?.into_iter().collect())
    }
}

macro_rules! tuple_bus_type {
    ($($name:ident . $idx:tt),+) => {
        impl<$($name: BusType),+> BusType for ($($name,)+) {
            fn signature() -> String {
                let mut sig = String::from("(");
                $(sig.push_str(&$name::signature());)+
                sig.push(')');
                sig
            }

            fn to_value(&self) -> Value {
                Value::Seq(vec![$(self.$idx.to_value()),+])
            }

            fn from_value(value: Value) -> Result<Self, CodecError> {
                let items = match value {
                    Value::Seq(items) => items,
                    other => return Err(CodecError::type_mismatch(Self::signature(), &other)),
                };
                let arity = [$(stringify!($name)),+].len();
                if items.len() != arity {
                    return Err(CodecError::ShapeMismatch(format!(
                        "{} has {arity} members, got {} values",
                        Self::signature(),
                        items.len()
                    )));
                }
                let mut items = items.into_iter();
                Ok(($(
                    $name::from_value(items.next().ok_or_else(|| {
                        CodecError::ShapeMismatch(format!("missing member {}", $idx))
                    })?)?,
                )+))
            }
        }
    };
}

tuple_bus_type!(A.0);
tuple_bus_type!(A.0, B.1);
tuple_bus_type!(A.0, B.1, C.2);
tuple_bus_type!(A.0, B.1, C.2, D.3);
