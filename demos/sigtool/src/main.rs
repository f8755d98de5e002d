//! sigtool: poke at busarg signatures and arguments from the shell.
//!
//! ```text
//! sigtool split 'aas(issi)a{is}'
//! sigtool encode '(issi)' '[42, "Hello", "World", 88]'
//! sigtool encode 'a{sv}' '{"on": {"signature": "b", "value": true}}' --json
//! sigtool decode 'ai' '{"type":"Array","value":{"element":"i","items":[]}}'
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use busarg::{
    split_top_level, Argument, Codec, CodecConfig, Decoder, Encoder, JsonCodec, Signature,
    Tag, Value,
};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

/// Split, encode and decode busarg signatures.
#[derive(Parser, Debug)]
#[command(name = "sigtool")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Codec configuration file (JSON). Missing fields take defaults.
    #[arg(short = 'c', long, env = "SIGTOOL_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "SIGTOOL_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the top-level elements of a signature, one per line.
    Split { signature: String },

    /// Encode a JSON value as a single complete type and print the tree.
    Encode {
        signature: String,
        value: String,
        /// Print the argument as JSON instead of XML.
        #[arg(long)]
        json: bool,
    },

    /// Decode an argument (JSON form, as printed by `encode --json`).
    Decode { signature: String, argument: String },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let config = load_config(args.config.as_ref())?;
    debug!(?config, "codec config");

    match args.command {
        Command::Split { signature } => {
            let elements = split_top_level(&signature)
                .with_context(|| format!("malformed signature {signature:?}"))?;
            for element in elements {
                println!("{element}");
            }
        }
        Command::Encode {
            signature,
            value,
            json,
        } => {
            let input: serde_json::Value =
                serde_json::from_str(&value).context("value is not valid JSON")?;
            let signature = Signature::parse_single(&signature)?;
            let encoder = Encoder::new(config);
            let native = json_to_value(&encoder, signature.as_str(), &input)?;
            let arg = encoder.encode_signature(&signature, &native)?;
            info!(signature = %arg.signature(), depth = arg.depth(), "encoded");
            if json {
                println!("{}", String::from_utf8(JsonCodec.encode(&arg)?)?);
            } else {
                println!("{}", arg.to_xml(0));
            }
        }
        Command::Decode {
            signature,
            argument,
        } => {
            let arg: Argument = JsonCodec
                .decode(argument.as_bytes())
                .context("argument is not a valid argument tree")?;
            let value = Decoder::new(config).decode(&signature, &arg)?;
            println!("{value:#?}");
        }
    }
    Ok(())
}

fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "sigtool={level},busarg={level},busarg_codec={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<CodecConfig> {
    let Some(path) = path else {
        return Ok(CodecConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

// ---------------------------------------------------------------------------
// JSON → Value, guided by the signature
// ---------------------------------------------------------------------------

/// Converts JSON input into the native value `signature` expects.
///
/// `signature` must be one complete, already-validated type. A `v` slot
/// takes `{"signature": "...", "value": ...}`, and its content is built
/// with `encoder` so the configured checks apply inside variants too.
fn json_to_value(encoder: &Encoder, signature: &str, json: &serde_json::Value) -> Result<Value> {
    let Some(tag) = signature.chars().next().and_then(Tag::from_char) else {
        bail!("empty signature");
    };

    let value = match tag {
        Tag::Byte => Value::Byte(u8::try_from(as_u64(json)?)?),
        Tag::UInt16 => Value::UInt16(u16::try_from(as_u64(json)?)?),
        Tag::UInt32 => Value::UInt32(u32::try_from(as_u64(json)?)?),
        Tag::UInt64 => Value::UInt64(as_u64(json)?),
        Tag::Int16 => Value::Int16(i16::try_from(as_i64(json)?)?),
        Tag::Int32 => Value::Int32(i32::try_from(as_i64(json)?)?),
        Tag::Int64 => Value::Int64(as_i64(json)?),
        Tag::Bool => Value::Bool(
            json.as_bool()
                .with_context(|| format!("expected a boolean, got {json}"))?,
        ),
        Tag::Double => Value::Double(
            json.as_f64()
                .with_context(|| format!("expected a number, got {json}"))?,
        ),
        Tag::String | Tag::ObjectPath | Tag::Signature => Value::Str(
            json.as_str()
                .with_context(|| format!("expected a string, got {json}"))?
                .to_owned(),
        ),
        Tag::Variant => {
            let inner_sig = json
                .get("signature")
                .and_then(serde_json::Value::as_str)
                .context("a variant needs {\"signature\": ..., \"value\": ...}")?;
            let inner_sig = Signature::parse_single(inner_sig)?;
            let inner = json_to_value(encoder, inner_sig.as_str(), &json["value"])?;
            Value::Arg(encoder.encode_signature(&inner_sig, &inner)?)
        }
        Tag::Array if signature.starts_with("a{") => {
            let object = json
                .as_object()
                .with_context(|| format!("{signature} needs a JSON object"))?;
            let key_sig = &signature[2..3];
            let value_sig = &signature[3..signature.len() - 1];
            let mut pairs = Vec::with_capacity(object.len());
            for (key, value) in object {
                let key = if key_sig == "s" || key_sig == "o" || key_sig == "g" {
                    Value::Str(key.clone())
                } else {
                    let parsed: serde_json::Value = serde_json::from_str(key)
                        .with_context(|| format!("dictionary key {key:?} is not a {key_sig}"))?;
                    json_to_value(encoder, key_sig, &parsed)?
                };
                pairs.push((key, json_to_value(encoder, value_sig, value)?));
            }
            Value::Map(pairs)
        }
        Tag::Array => {
            let items = json
                .as_array()
                .with_context(|| format!("{signature} needs a JSON array"))?;
            items
                .iter()
                .map(|item| json_to_value(encoder, &signature[1..], item))
                .collect::<Result<Vec<_>>>()
                .map(Value::Seq)?
        }
        Tag::Struct => {
            let items = json
                .as_array()
                .with_context(|| format!("{signature} needs a JSON array"))?;
            let members = split_top_level(&signature[1..signature.len() - 1])?;
            if members.len() != items.len() {
                bail!(
                    "{signature} has {} members, got {} values",
                    members.len(),
                    items.len()
                );
            }
            members
                .iter()
                .zip(items)
                .map(|(member, item)| json_to_value(encoder, member, item))
                .collect::<Result<Vec<_>>>()
                .map(Value::Seq)?
        }
        Tag::DictEntry | Tag::Wildcard => bail!("{signature} cannot be given on its own"),
    };
    Ok(value)
}

fn as_u64(json: &serde_json::Value) -> Result<u64> {
    json.as_u64()
        .with_context(|| format!("expected an unsigned integer, got {json}"))
}

fn as_i64(json: &serde_json::Value) -> Result<i64> {
    json.as_i64()
        .with_context(|| format!("expected an integer, got {json}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> serde_json::Value {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn test_json_struct_to_value() {
        let encoder = Encoder::default();
        let json = parse(r#"[42, "Hello", "World", 88]"#);
        let value = json_to_value(&encoder, "(issi)", &json).unwrap();
        let arg = encoder.encode("(issi)", &value).unwrap();
        assert_eq!(arg.signature(), "(issi)");
    }

    #[test]
    fn test_json_dictionary_with_numeric_keys() {
        let json = parse(r#"{"7": {"signature": "s", "value": "x"}}"#);
        let value = json_to_value(&Encoder::default(), "a{iv}", &json).unwrap();
        let arg = Encoder::default().encode("a{iv}", &value).unwrap();
        assert_eq!(
            arg.dict_lookup("{iv}", &7i32.into()).unwrap(),
            Value::Arg(Argument::String("x".into()))
        );
    }

    #[test]
    fn test_json_out_of_range() {
        let encoder = Encoder::default();
        assert!(json_to_value(&encoder, "y", &parse("300")).is_err());
        assert!(json_to_value(&encoder, "u", &parse("-1")).is_err());
    }

    #[test]
    fn test_variant_content_uses_configured_encoder() {
        let json = parse(r#"{"signature": "o", "value": "not/a/path"}"#);
        assert!(json_to_value(&Encoder::default(), "v", &json).is_err());

        let lax = Encoder::new(CodecConfig {
            validate_object_paths: false,
            ..CodecConfig::default()
        });
        let value = json_to_value(&lax, "v", &json).unwrap();
        assert_eq!(value, Value::Arg(Argument::ObjectPath("not/a/path".into())));
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let args = Args::try_parse_from(["sigtool", "encode", "ai", "[1,2]", "--json"]).unwrap();
        assert!(matches!(args.command, Command::Encode { json: true, .. }));
    }
}
