//! Codec error taxonomy shared by the encoder, decoder, config loader, and
//! JSON adapter.
//!
//! Every variant carries a stable [`CodecError::code`] string.  The names
//! are the ones callers match on; the messages are human-readable context.

use std::fmt;

use thiserror::Error;

/// Why a value or tag was rejected as `UnsupportedType`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unsupported {
    /// `0xc1`, which the format never assigns.
    ReservedTag,
    /// An extension tag (`0xc7–0xc9`, `0xd4–0xd8`).  Payloads are not
    /// interpreted.
    Extension(u8),
    /// A map key that decoded to something other than a string.
    NonStringKey(&'static str),
    /// A map value handed to the encoder with the same key twice.
    DuplicateKey(String),
}

impl fmt::Display for Unsupported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unsupported::ReservedTag => write!(f, "reserved tag 0xc1"),
            Unsupported::Extension(tag) => write!(f, "extension tag 0x{:02x}", tag),
            Unsupported::NonStringKey(kind) => write!(f, "map key of type {}", kind),
            Unsupported::DuplicateKey(key) => write!(f, "duplicate map key {:?}", key),
        }
    }
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("UnsupportedType: {0}")]
    UnsupportedType(Unsupported),

    #[error("StringTooLong: {0} bytes")]
    StringTooLong(usize),

    #[error("BinaryTooLong: {0} bytes")]
    BinaryTooLong(usize),

    #[error("ArrayTooLong: {0} elements")]
    ArrayTooLong(usize),

    /// Magnitude or size outside what the format can carry.  Oversized maps
    /// land here.
    #[error("ValueOutOfRange: {0}")]
    ValueOutOfRange(String),

    #[error("BinaryDataInvalid: {0}")]
    BinaryDataInvalid(String),

    /// Input ran out while reading a tag byte or a payload.
    #[error("UnexpectedEnd: needed {needed} byte(s) at offset {offset}")]
    UnexpectedEnd { offset: usize, needed: usize },

    /// Input ran out inside a length field.
    #[error("ReadByte: length field truncated at offset {0}")]
    ReadByte(usize),

    #[error("ConfigMissing: {0}")]
    ConfigMissing(&'static str),

    #[error("ConfigInvalid: {0}")]
    ConfigInvalid(String),

    #[error("InvalidUtf8: string payload at offset {0}")]
    InvalidUtf8(usize),

    #[error("DepthLimit: nesting exceeds {0}")]
    DepthLimit(usize),

    #[error("TrailingBytes: {0} byte(s) after root value")]
    TrailingBytes(usize),

    #[error("Json: {0}")]
    Json(#[from] serde_json::Error),
}

impl CodecError {
    /// Stable name of the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            CodecError::UnsupportedType(_) => "UnsupportedType",
            CodecError::StringTooLong(_) => "StringTooLong",
            CodecError::BinaryTooLong(_) => "BinaryTooLong",
            CodecError::ArrayTooLong(_) => "ArrayTooLong",
            CodecError::ValueOutOfRange(_) => "ValueOutOfRange",
            CodecError::BinaryDataInvalid(_) => "BinaryDataInvalid",
            CodecError::UnexpectedEnd { .. } => "UnexpectedEnd",
            CodecError::ReadByte(_) => "ReadByte",
            CodecError::ConfigMissing(_) => "ConfigMissing",
            CodecError::ConfigInvalid(_) => "ConfigInvalid",
            CodecError::InvalidUtf8(_) => "InvalidUtf8",
            CodecError::DepthLimit(_) => "DepthLimit",
            CodecError::TrailingBytes(_) => "TrailingBytes",
            CodecError::Json(_) => "Json",
        }
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;
