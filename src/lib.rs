//! # msgpack-json
//!
//! Canonical MessagePack codec for JSON value trees.
//!
//! ```no_run
//! use msgpack_json::{decode, Encoder, Value};
//!
//! let encoder = Encoder::new("binary_data").unwrap();
//! let doc = Value::Map(vec![
//!     ("name".into(), Value::from("sensor-7")),
//!     ("binary_data".into(), Value::from("AQID")),
//! ]);
//! let bytes = encoder.encode(&doc).unwrap();
//! let (back, used) = decode(&bytes).unwrap();
//! assert_eq!(used, bytes.len());
//! assert_eq!(back.get("binary_data"), Some(&Value::Bin(vec![1, 2, 3])));
//! ```
//!
//! The encoder always picks the narrowest tag that holds a value exactly.
//! One map key, fixed when the encoder is built, marks a base64 string that
//! is written as MessagePack bin instead of str.

pub mod config;
pub mod constants;
pub mod decode;
pub mod encode;
pub mod errors;
pub mod json_adapter;
pub mod value;

pub use config::CodecConfig;
pub use decode::{decode, decode_all, Decoder};
pub use encode::{classify_number, Encoder};
pub use errors::{CodecError, Result, Unsupported};
pub use json_adapter::{parse_json, to_json, to_json_string};
pub use value::Value;

use tracing::trace;

// ── JSON ⇄ MessagePack ───────────────────────────────────────

/// Convert JSON text into MessagePack bytes.
pub fn json_to_msgpack(encoder: &Encoder, json: &[u8]) -> Result<Vec<u8>> {
    let value = parse_json(json)?;
    let bytes = encoder.encode(&value)?;
    trace!(bytecode = %format_bytecode(&bytes), "json → msgpack");
    Ok(bytes)
}

/// Convert one MessagePack document into JSON text.  The whole buffer must
/// be a single value.
pub fn msgpack_to_json(bytes: &[u8]) -> Result<Vec<u8>> {
    let value = decode_all(bytes)?;
    to_json(&value)
}

// ── Helpers ──────────────────────────────────────────────────

/// Space-separated lowercase hex, e.g. `0x81 0xa3 0x6b`.
pub fn format_bytecode(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("0x{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
