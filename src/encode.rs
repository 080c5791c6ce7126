//! Canonical MessagePack encoder.
//!
//! Lowers a `Value` tree into the narrowest wire form for every node:
//!   uint    : fixint 0x00–0x7f | uint8 0xcc | uint16 0xcd | uint32 0xce | uint64 0xcf
//!   int     : (>= 0 takes the uint path) negative fixint 0xe0–0xff | int8 0xd0 ... int64 0xd3
//!   float   : float32 0xca when f64 → f32 → f64 is exact, else float64 0xcb
//!   str     : fixstr 0xa0–0xbf | str8 0xd9 | str16 0xda | str32 0xdb
//!   bin     : bin8 0xc4 | bin16 0xc5 | bin32 0xc6
//!   array   : fixarray 0x90–0x9f | array16 0xdc | array32 0xdd
//!   map     : fixmap 0x80–0x8f | map16 0xde | map32 0xdf
//!
//! Inside any map, the entry whose key equals the configured binary field
//! key carries a base64 string; it is decoded and written as bin.  A map
//! holding the same key twice is rejected before its header is written.

use std::collections::HashSet;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, trace};

use crate::config::CodecConfig;
use crate::constants::*;
use crate::errors::*;
use crate::value::Value;

const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;
const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;

/// Map a source number (JSON has only f64) onto the value model.
///
/// Order matters and is fixed: exact unsigned integer first, then exact
/// signed integer, then float.  `-0.0` is integral and non-negative, so it
/// becomes `UInt(0)`.
pub fn classify_number(x: f64) -> Value {
    if x.is_finite() && x.fract() == 0.0 {
        if (0.0..TWO_POW_64).contains(&x) {
            return Value::UInt(x as u64);
        }
        if (-TWO_POW_63..0.0).contains(&x) {
            return Value::Int(x as i64);
        }
    }
    Value::Float64(x)
}

/// MessagePack encoder bound to one binary field key.
///
/// Immutable after construction; share it freely across threads.
#[derive(Debug, Clone)]
pub struct Encoder {
    binary_key: String,
    max_depth: usize,
}

impl Encoder {
    /// Build an encoder.  An empty key is a configuration error, not a
    /// per-value one.
    pub fn new(binary_key: impl Into<String>) -> Result<Self> {
        let binary_key = binary_key.into();
        if binary_key.is_empty() {
            return Err(CodecError::ConfigMissing("binary field key is not set"));
        }
        debug!(binary_key = %binary_key, "msgpack encoder configured");
        Ok(Self {
            binary_key,
            max_depth: DEFAULT_MAX_DEPTH,
        })
    }

    pub fn from_config(config: &CodecConfig) -> Result<Self> {
        Ok(Self::new(config.binary_keyword.clone())?.with_max_depth(config.max_depth))
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn binary_key(&self) -> &str {
        &self.binary_key
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Encode one value into a fresh buffer.
    pub fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_value(&mut buf, value, 0)?;
        Ok(buf)
    }

    /// Append the encoding of `value` to `buf`.  On failure `buf` is cut
    /// back to its original length.
    pub fn encode_into(&self, value: &Value, buf: &mut Vec<u8>) -> Result<()> {
        let start = buf.len();
        if let Err(err) = self.write_value(buf, value, 0) {
            buf.truncate(start);
            return Err(err);
        }
        Ok(())
    }

    /// `depth` counts enclosing containers: the root is 0 and entering an
    /// array or map checks depth + 1 against `max_depth`.
    fn write_value(&self, buf: &mut Vec<u8>, value: &Value, depth: usize) -> Result<()> {
        match value {
            Value::Null => buf.push(TAG_NIL),
            Value::Bool(b) => buf.push(if *b { TAG_TRUE } else { TAG_FALSE }),
            Value::UInt(u) => write_uint(buf, *u),
            Value::Int(i) => write_int(buf, *i),
            Value::Float32(x) => write_f32(buf, *x),
            Value::Float64(x) => write_float(buf, *x),
            Value::Str(s) => write_str(buf, s)?,
            Value::Bin(b) => write_bin(buf, b)?,

            Value::Array(items) => {
                if depth + 1 > self.max_depth {
                    return Err(CodecError::DepthLimit(self.max_depth));
                }
                write_array_header(buf, items.len())?;
                for item in items {
                    self.write_value(buf, item, depth + 1)?;
                }
            }

            Value::Map(entries) => {
                if depth + 1 > self.max_depth {
                    return Err(CodecError::DepthLimit(self.max_depth));
                }
                let mut seen = HashSet::with_capacity(entries.len());
                for (key, _) in entries {
                    if !seen.insert(key.as_str()) {
                        debug!(key = %key, "duplicate map key");
                        return Err(CodecError::UnsupportedType(Unsupported::DuplicateKey(
                            key.clone(),
                        )));
                    }
                }
                write_map_header(buf, entries.len())?;
                for (key, val) in entries {
                    write_str(buf, key)?;
                    if *key == self.binary_key {
                        self.write_binary_field(buf, val)?;
                    } else {
                        self.write_value(buf, val, depth + 1)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// The configured field must hold base64 text.  A value that is already
    /// raw bytes is written as-is.
    fn write_binary_field(&self, buf: &mut Vec<u8>, value: &Value) -> Result<()> {
        match value {
            Value::Str(text) => {
                let raw = STANDARD.decode(text).map_err(|err| {
                    debug!(field = %self.binary_key, %err, "binary field is not base64");
                    CodecError::BinaryDataInvalid(format!(
                        "field `{}`: {}",
                        self.binary_key, err
                    ))
                })?;
                trace!(field = %self.binary_key, len = raw.len(), "writing binary field");
                write_bin(buf, &raw)
            }
            Value::Bin(raw) => write_bin(buf, raw),
            other => Err(CodecError::BinaryDataInvalid(format!(
                "field `{}` holds {}, expected a base64 string",
                self.binary_key,
                other.kind()
            ))),
        }
    }
}

// ── Scalars ──────────────────────────────────────────────────

pub fn write_uint(buf: &mut Vec<u8>, value: u64) {
    if value <= POSITIVE_FIXINT_MAX as u64 {
        buf.push(value as u8);
    } else if value <= u8::MAX as u64 {
        buf.push(TAG_UINT8);
        buf.push(value as u8);
    } else if value <= u16::MAX as u64 {
        buf.push(TAG_UINT16);
        buf.extend_from_slice(&(value as u16).to_be_bytes());
    } else if value <= u32::MAX as u64 {
        buf.push(TAG_UINT32);
        buf.extend_from_slice(&(value as u32).to_be_bytes());
    } else {
        buf.push(TAG_UINT64);
        buf.extend_from_slice(&value.to_be_bytes());
    }
}

pub fn write_int(buf: &mut Vec<u8>, value: i64) {
    if value >= 0 {
        write_uint(buf, value as u64);
    } else if value >= -32 {
        buf.push(NEGATIVE_FIXINT_PREFIX | (value + 32) as u8);
    } else if value >= i8::MIN as i64 {
        buf.push(TAG_INT8);
        buf.push(value as i8 as u8);
    } else if value >= i16::MIN as i64 {
        buf.push(TAG_INT16);
        buf.extend_from_slice(&(value as i16).to_be_bytes());
    } else if value >= i32::MIN as i64 {
        buf.push(TAG_INT32);
        buf.extend_from_slice(&(value as i32).to_be_bytes());
    } else {
        buf.push(TAG_INT64);
        buf.extend_from_slice(&value.to_be_bytes());
    }
}

pub fn write_f32(buf: &mut Vec<u8>, value: f32) {
    buf.push(TAG_FLOAT32);
    buf.extend_from_slice(&value.to_be_bytes());
}

/// float32 when narrowing is lossless, float64 otherwise.  NaN never
/// compares equal to itself and always takes the float64 path.
pub fn write_float(buf: &mut Vec<u8>, value: f64) {
    let narrowed = value as f32;
    if narrowed as f64 == value {
        write_f32(buf, narrowed);
    } else {
        buf.push(TAG_FLOAT64);
        buf.extend_from_slice(&value.to_be_bytes());
    }
}

pub fn write_str(buf: &mut Vec<u8>, value: &str) -> Result<()> {
    write_str_header(buf, value.len())?;
    buf.extend_from_slice(value.as_bytes());
    Ok(())
}

pub fn write_bin(buf: &mut Vec<u8>, value: &[u8]) -> Result<()> {
    write_bin_header(buf, value.len())?;
    buf.extend_from_slice(value);
    Ok(())
}

// ── Headers ──────────────────────────────────────────────────

fn push_len16(buf: &mut Vec<u8>, tag: u8, len: usize) {
    buf.push(tag);
    buf.extend_from_slice(&(len as u16).to_be_bytes());
}

fn push_len32(buf: &mut Vec<u8>, tag: u8, len: usize) {
    buf.push(tag);
    buf.extend_from_slice(&(len as u32).to_be_bytes());
}

pub(crate) fn write_str_header(buf: &mut Vec<u8>, len: usize) -> Result<()> {
    if len <= FIXSTR_MAX_LEN {
        buf.push(FIXSTR_PREFIX | len as u8);
    } else if len <= u8::MAX as usize {
        buf.push(TAG_STR8);
        buf.push(len as u8);
    } else if len <= u16::MAX as usize {
        push_len16(buf, TAG_STR16, len);
    } else if len <= MAX_LENGTH {
        push_len32(buf, TAG_STR32, len);
    } else {
        return Err(CodecError::StringTooLong(len));
    }
    Ok(())
}

pub(crate) fn write_bin_header(buf: &mut Vec<u8>, len: usize) -> Result<()> {
    if len <= u8::MAX as usize {
        buf.push(TAG_BIN8);
        buf.push(len as u8);
    } else if len <= u16::MAX as usize {
        push_len16(buf, TAG_BIN16, len);
    } else if len <= MAX_LENGTH {
        push_len32(buf, TAG_BIN32, len);
    } else {
        return Err(CodecError::BinaryTooLong(len));
    }
    Ok(())
}

pub(crate) fn write_array_header(buf: &mut Vec<u8>, len: usize) -> Result<()> {
    if len <= FIXCONTAINER_MAX_LEN {
        buf.push(FIXARRAY_PREFIX | len as u8);
    } else if len <= u16::MAX as usize {
        push_len16(buf, TAG_ARRAY16, len);
    } else if len <= MAX_LENGTH {
        push_len32(buf, TAG_ARRAY32, len);
    } else {
        return Err(CodecError::ArrayTooLong(len));
    }
    Ok(())
}

pub(crate) fn write_map_header(buf: &mut Vec<u8>, len: usize) -> Result<()> {
    if len <= FIXCONTAINER_MAX_LEN {
        buf.push(FIXMAP_PREFIX | len as u8);
    } else if len <= u16::MAX as usize {
        push_len16(buf, TAG_MAP16, len);
    } else if len <= MAX_LENGTH {
        push_len32(buf, TAG_MAP32, len);
    } else {
        return Err(CodecError::ValueOutOfRange(format!(
            "map with {} entries is too large",
            len
        )));
    }
    Ok(())
}
