//! Property list codec bridging XML plist text and JSON-like trees.
//!
//! Decoding and encoding are delegated to the `plist` crate. Only the XML
//! dialect is accepted; binary property lists are recognized by their
//! `bplist` signature and rejected before any parsing takes place.
//!
//! Conversion in both directions refuses trees nested deeper than
//! [`MAX_DEPTH`] containers.

use plist::{Dictionary, Integer, Value as PlistValue};
use serde_json::{Map, Number, Value};
use std::io::Cursor;

/// Leading bytes of a binary property list.
pub const BINARY_SIGNATURE: &str = "bplist";

/// Deepest container nesting accepted, same as serde_json's recursion limit.
pub const MAX_DEPTH: usize = 128;

/// Opening tag of an XML property list root.
const MARKUP_ROOT: &str = "<plist";

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("binary property lists are not supported")]
    BinaryUnsupported,
    #[error("failed to decode property list: {0}")]
    Decode(#[source] plist::Error),
    #[error("failed to encode property list: {0}")]
    Encode(#[source] plist::Error),
    #[error("encoded property list is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("property list nests deeper than {limit} levels")]
    TooDeep { limit: usize },
}

/// Returns `true` when the payload carries the binary plist signature.
///
/// The signature counts at the start of the payload, or anywhere in a payload
/// without an XML `<plist` root.
pub fn is_binary(text: &str) -> bool {
    let trimmed = text.trim_start_matches('\u{feff}').trim_start();
    trimmed.starts_with(BINARY_SIGNATURE)
        || (trimmed.contains(BINARY_SIGNATURE) && !trimmed.contains(MARKUP_ROOT))
}

/// Decode XML property list text into a JSON-like tree.
pub fn decode(text: &str) -> Result<Value, CodecError> {
    if is_binary(text) {
        return Err(CodecError::BinaryUnsupported);
    }
    let value =
        PlistValue::from_reader_xml(Cursor::new(text.as_bytes())).map_err(CodecError::Decode)?;
    plist_to_json(value, 0)
}

/// Encode a JSON-like tree as XML property list text.
///
/// `null` has no plist counterpart; null dictionary entries and array elements are omitted.
pub fn encode(tree: &Value) -> Result<String, CodecError> {
    let value =
        json_to_plist(tree, 0)?.unwrap_or_else(|| PlistValue::Dictionary(Dictionary::new()));
    let mut buffer = Vec::new();
    value
        .to_writer_xml(&mut buffer)
        .map_err(CodecError::Encode)?;
    Ok(String::from_utf8(buffer)?)
}

fn enter(depth: usize) -> Result<usize, CodecError> {
    if depth >= MAX_DEPTH {
        return Err(CodecError::TooDeep { limit: MAX_DEPTH });
    }
    Ok(depth + 1)
}

fn plist_to_json(value: PlistValue, depth: usize) -> Result<Value, CodecError> {
    let converted = match value {
        PlistValue::Dictionary(dict) => {
            let depth = enter(depth)?;
            let mut map = Map::with_capacity(dict.len());
            for (key, entry) in dict {
                map.insert(key, plist_to_json(entry, depth)?);
            }
            Value::Object(map)
        }
        PlistValue::Array(items) => {
            let depth = enter(depth)?;
            Value::Array(
                items
                    .into_iter()
                    .map(|item| plist_to_json(item, depth))
                    .collect::<Result<_, _>>()?,
            )
        }
        PlistValue::Boolean(flag) => Value::Bool(flag),
        PlistValue::Integer(integer) => integer_to_json(integer),
        // nan and inf have no JSON number; keep their plist spelling so encode restores them
        PlistValue::Real(real) => Number::from_f64(real)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(real.to_string())),
        PlistValue::String(text) => Value::String(text),
        PlistValue::Data(bytes) => Value::String(hex::encode(bytes)),
        PlistValue::Date(date) => Value::String(date.to_xml_format()),
        PlistValue::Uid(uid) => Value::Number(Number::from(uid.get())),
        _ => Value::Null,
    };
    Ok(converted)
}

fn integer_to_json(integer: Integer) -> Value {
    if let Some(signed) = integer.as_signed() {
        Value::Number(Number::from(signed))
    } else if let Some(unsigned) = integer.as_unsigned() {
        Value::Number(Number::from(unsigned))
    } else {
        Value::Null
    }
}

fn json_to_plist(value: &Value, depth: usize) -> Result<Option<PlistValue>, CodecError> {
    let converted = match value {
        Value::Null => None,
        Value::Bool(flag) => Some(PlistValue::Boolean(*flag)),
        Value::Number(number) => {
            if let Some(signed) = number.as_i64() {
                Some(PlistValue::Integer(Integer::from(signed)))
            } else if let Some(unsigned) = number.as_u64() {
                Some(PlistValue::Integer(Integer::from(unsigned)))
            } else {
                number.as_f64().map(PlistValue::Real)
            }
        }
        Value::String(text) => Some(PlistValue::String(text.clone())),
        Value::Array(items) => {
            let depth = enter(depth)?;
            let mut array = Vec::with_capacity(items.len());
            for item in items {
                if let Some(converted) = json_to_plist(item, depth)? {
                    array.push(converted);
                }
            }
            Some(PlistValue::Array(array))
        }
        Value::Object(map) => {
            let depth = enter(depth)?;
            let mut dict = Dictionary::new();
            for (key, entry) in map {
                if let Some(converted) = json_to_plist(entry, depth)? {
                    dict.insert(key.clone(), converted);
                }
            }
            Some(PlistValue::Dictionary(dict))
        }
    };
    Ok(converted)
}
