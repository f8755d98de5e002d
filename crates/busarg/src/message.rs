//! The message envelope that carries arguments across a transport.

use busarg_codec::{Argument, Decoder, Encoder, Signature, Value};
use serde::{Deserialize, Serialize};

use crate::BusargError;

/// One call or reply: a member name and its argument list.
///
/// ```text
/// ┌──────────────────────────────┐
/// │ seq: 7                       │  ← pairs replies with calls
/// │ member: "SetState"           │  ← method or signal name
/// │ args: [s, a{sv}]             │  ← self-describing arguments
/// └──────────────────────────────┘
/// ```
///
/// The argument signature is not stored; every [`Argument`] carries its
/// own, and [`signature`](Self::signature) concatenates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Sequence number chosen by the sender.
    pub seq: u64,

    /// Name of the method or signal.
    pub member: String,

    /// The arguments, in order.
    #[serde(default)]
    pub args: Vec<Argument>,
}

impl Envelope {
    pub fn new(seq: u64, member: impl Into<String>, args: Vec<Argument>) -> Self {
        Self {
            seq,
            member: member.into(),
            args,
        }
    }

    /// Encodes `values` against the compound `signature` and wraps them.
    ///
    /// ```
    /// use busarg::{Envelope, Value};
    ///
    /// let env = Envelope::from_values(1, "Add", "ii", &[2i32.into(), 3i32.into()]).unwrap();
    /// assert_eq!(env.signature().unwrap(), "ii");
    /// ```
    ///
    /// # Errors
    /// Any error from [`Encoder::encode_all`].
    pub fn from_values(
        seq: u64,
        member: impl Into<String>,
        signature: &str,
        values: &[Value],
    ) -> Result<Self, BusargError> {
        let args = Encoder::default().encode_all(signature, values)?;
        Ok(Self::new(seq, member, args))
    }

    /// The concatenated signature of the arguments.
    ///
    /// # Errors
    /// A signature error if the concatenation is over the length limit.
    pub fn signature(&self) -> Result<Signature, BusargError> {
        let sigs: Vec<Signature> = self.args.iter().map(Argument::signature).collect();
        Ok(Signature::concat(&sigs)?)
    }

    /// Decodes the arguments against the compound `signature`.
    ///
    /// # Errors
    /// Any error from [`Decoder::decode_all`].
    pub fn values(&self, signature: &str) -> Result<Vec<Value>, BusargError> {
        Ok(Decoder::default().decode_all(signature, &self.args)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_values_round_trip() {
        let env = Envelope::from_values(
            3,
            "Greet",
            "(is)",
            &[Value::Seq(vec![1i32.into(), "hi".into()])],
        )
        .unwrap();
        assert_eq!(env.member, "Greet");
        assert_eq!(
            env.values("(is)").unwrap(),
            [Value::Seq(vec![1i32.into(), "hi".into()])]
        );
    }

    #[test]
    fn test_envelope_wrong_signature() {
        let env = Envelope::new(1, "Ping", vec![Argument::Int32(1)]);
        assert!(env.values("u").is_err());
        assert!(env.values("ii").is_err());
    }

    #[test]
    fn test_envelope_json_defaults_missing_args() {
        let env: Envelope = serde_json::from_str(r#"{"seq": 1, "member": "Ping"}"#).unwrap();
        assert!(env.args.is_empty());
        assert_eq!(env.signature().unwrap(), "");
    }
}
