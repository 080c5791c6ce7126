//! MessagePack tag bytes, length ceilings, and codec limits.
//!
//! Tags are grouped by family.  Fix-families pack a small value or length
//! into the tag byte itself; the `*_MASK` constants extract it.

// ── Nil / bool ───────────────────────────────────────────────

pub const TAG_NIL: u8 = 0xc0;
pub const TAG_FALSE: u8 = 0xc2;
pub const TAG_TRUE: u8 = 0xc3;

// ── Fix families ─────────────────────────────────────────────

pub const POSITIVE_FIXINT_MAX: u8 = 0x7f;
pub const FIXMAP_PREFIX: u8 = 0x80;
pub const FIXARRAY_PREFIX: u8 = 0x90;
pub const FIXSTR_PREFIX: u8 = 0xa0;
pub const NEGATIVE_FIXINT_PREFIX: u8 = 0xe0;

/// Low nibble of fixmap / fixarray.
pub const FIXCONTAINER_MASK: u8 = 0x0f;
/// Low five bits of fixstr.
pub const FIXSTR_MASK: u8 = 0x1f;

pub const FIXCONTAINER_MAX_LEN: usize = 0x0f;
pub const FIXSTR_MAX_LEN: usize = 0x1f;

// ── Binary ───────────────────────────────────────────────────

pub const TAG_BIN8: u8 = 0xc4;
pub const TAG_BIN16: u8 = 0xc5;
pub const TAG_BIN32: u8 = 0xc6;

// ── Numbers ──────────────────────────────────────────────────

pub const TAG_FLOAT32: u8 = 0xca;
pub const TAG_FLOAT64: u8 = 0xcb;
pub const TAG_UINT8: u8 = 0xcc;
pub const TAG_UINT16: u8 = 0xcd;
pub const TAG_UINT32: u8 = 0xce;
pub const TAG_UINT64: u8 = 0xcf;
pub const TAG_INT8: u8 = 0xd0;
pub const TAG_INT16: u8 = 0xd1;
pub const TAG_INT32: u8 = 0xd2;
pub const TAG_INT64: u8 = 0xd3;

// ── Strings and containers ───────────────────────────────────

pub const TAG_STR8: u8 = 0xd9;
pub const TAG_STR16: u8 = 0xda;
pub const TAG_STR32: u8 = 0xdb;
pub const TAG_ARRAY16: u8 = 0xdc;
pub const TAG_ARRAY32: u8 = 0xdd;
pub const TAG_MAP16: u8 = 0xde;
pub const TAG_MAP32: u8 = 0xdf;

// ── Length-field widths, in bits ─────────────────────────────

pub const LEN8: u32 = 8;
pub const LEN16: u32 = 16;
pub const LEN32: u32 = 32;

/// Largest length any str/bin/array/map header can carry (2^32 − 1).
pub const MAX_LENGTH: usize = u32::MAX as usize;

/// Default nesting bound for both directions.  Deeper input fails with
/// `DepthLimit` instead of exhausting the call stack.
pub const DEFAULT_MAX_DEPTH: usize = 512;
