//! JSON bridge: serde glue between JSON text and the value model.
//!
//! Type mapping, JSON → Value:
//!   object  → Map     (key order kept; a repeated key keeps its first
//!                      position and takes the last value)
//!   array   → Array
//!   string  → Str     (including the binary field; the encoder converts it)
//!   boolean → Bool
//!   null    → Null
//!   number  → UInt | Int | Float64, via `classify_number`
//!
//! JSON has a single numeric type.  Every number token is parsed as an f64
//! and then classified, so integers above 2^53 that f64 cannot hold exactly
//! come out rounded (9007199254740993 reads as 9007199254740992).  That is
//! how the JSON side behaves, not a codec defect, and it is left as is.
//!
//! With serde_json's `arbitrary_precision` feature, numbers arrive through
//! the deserializer as a one-entry map keyed "$serde_json::private::Number"
//! holding the raw token.
//!
//! Value → JSON: `Bin` becomes a standard base64 string, which is what makes
//! the binary field round-trip.  `Float32` is written with f32 formatting so
//! 1.1f32 prints as 1.1.  Non-finite floats print as `null`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::collections::HashMap;
use std::fmt;

use crate::encode::classify_number;
use crate::errors::*;
use crate::value::Value;

const SERDE_JSON_NUMBER_KEY: &str = "$serde_json::private::Number";

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("any JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Value, E> {
        Ok(Value::Bool(v))
    }

    // Without arbitrary_precision these are the number paths.  Funnel them
    // through f64 all the same.
    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Value, E> {
        Ok(classify_number(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Value, E> {
        Ok(classify_number(v as f64))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Value, E> {
        Ok(classify_number(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Value, E> {
        Ok(Value::Str(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Value, E> {
        Ok(Value::Str(v))
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element::<Value>()? {
            items.push(item);
        }
        Ok(Value::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Value, A::Error> {
        let first_key: Option<String> = map.next_key()?;

        match first_key {
            Some(ref key) if key == SERDE_JSON_NUMBER_KEY => {
                let raw: String = map.next_value()?;
                let x: f64 = raw.parse().map_err(|_| {
                    <A::Error as de::Error>::custom(format!("invalid number: {}", raw))
                })?;
                Ok(classify_number(x))
            }
            Some(first_key) => {
                let mut entries: Vec<(String, Value)> = Vec::new();
                let mut slots: HashMap<String, usize> = HashMap::new();
                let first_value: Value = map.next_value()?;
                slots.insert(first_key.clone(), 0);
                entries.push((first_key, first_value));

                while let Some(key) = map.next_key::<String>()? {
                    let value: Value = map.next_value()?;
                    match slots.get(&key) {
                        Some(&slot) => entries[slot].1 = value,
                        None => {
                            slots.insert(key.clone(), entries.len());
                            entries.push((key, value));
                        }
                    }
                }
                Ok(Value::Map(entries))
            }
            None => Ok(Value::Map(Vec::new())),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::UInt(u) => serializer.serialize_u64(*u),
            Value::Float32(x) => serializer.serialize_f32(*x),
            Value::Float64(x) => serializer.serialize_f64(*x),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Bin(b) => serializer.serialize_str(&STANDARD.encode(b)),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, val) in entries {
                    map.serialize_entry(key, val)?;
                }
                map.end()
            }
        }
    }
}

// ── Public API ───────────────────────────────────────────────

/// Parse JSON text into a value tree.
pub fn parse_json(raw: &[u8]) -> Result<Value> {
    Ok(serde_json::from_slice(raw)?)
}

/// Serialize a value tree as compact JSON.
pub fn to_json(value: &Value) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

pub fn to_json_string(value: &Value) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}
