//! MessagePack decoder.
//!
//! One forward cursor is shared by the whole recursive descent, so nested
//! reads consume from the same position and siblings are never re-read.
//! Dispatch on the leading byte is an exhaustive match over all 256 values:
//! anything the codec does not support (0xc1, extension tags) is an
//! explicit `UnsupportedType`, never an empty result.
//!
//! Numbers come back in the family the wire used: uint tags and positive
//! fixint give `UInt`, int tags and negative fixint give `Int`, float32 and
//! float64 give `Float32` and `Float64`.  Nothing is normalized.

use std::collections::HashMap;

use tracing::debug;

use crate::constants::*;
use crate::errors::*;
use crate::value::Value;

/// Decode the first value in `buf`.  Returns the value and the number of
/// bytes it occupied; trailing bytes are left alone.
pub fn decode(buf: &[u8]) -> Result<(Value, usize)> {
    let mut decoder = Decoder::new(buf);
    let value = decoder.decode_value()?;
    Ok((value, decoder.position()))
}

/// Decode exactly one value spanning all of `buf`.
pub fn decode_all(buf: &[u8]) -> Result<Value> {
    let (value, used) = decode(buf)?;
    if used != buf.len() {
        return Err(CodecError::TrailingBytes(buf.len() - used));
    }
    Ok(value)
}

pub struct Decoder<'a> {
    buf: &'a [u8],
    off: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            off: 0,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.off
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.off
    }

    // ── Cursor primitives ────────────────────────────────────

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(CodecError::UnexpectedEnd {
                offset: self.off,
                needed: n,
            });
        }
        let buf = self.buf;
        let slice = &buf[self.off..self.off + n];
        self.off += n;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// Read a big-endian length field of `bits` width (8, 16 or 32).
    ///
    /// Bytes are accumulated most significant first, a full byte at a
    /// time: `length = length * 256 + byte`.
    fn read_length(&mut self, bits: u32) -> Result<usize> {
        let mut length: u64 = 0;
        for _ in 0..bits / 8 {
            let byte = match self.buf.get(self.off) {
                Some(b) => *b,
                None => {
                    debug!(offset = self.off, bits, "length field truncated");
                    return Err(CodecError::ReadByte(self.off));
                }
            };
            self.off += 1;
            length = (length << 8) | u64::from(byte);
        }
        usize::try_from(length).map_err(|_| {
            CodecError::ValueOutOfRange(format!("length {} does not fit in memory", length))
        })
    }

    // ── Dispatch ─────────────────────────────────────────────

    pub fn decode_value(&mut self) -> Result<Value> {
        let tag = self.read_u8()?;
        match tag {
            0x00..=0x7f => Ok(Value::UInt(tag as u64)),
            0x80..=0x8f => self.read_map((tag & FIXCONTAINER_MASK) as usize),
            0x90..=0x9f => self.read_array((tag & FIXCONTAINER_MASK) as usize),
            0xa0..=0xbf => self.read_str((tag & FIXSTR_MASK) as usize),
            0xc0 => Ok(Value::Null),
            0xc1 => {
                debug!(offset = self.off - 1, "reserved tag 0xc1");
                Err(CodecError::UnsupportedType(Unsupported::ReservedTag))
            }
            0xc2 => Ok(Value::Bool(false)),
            0xc3 => Ok(Value::Bool(true)),
            0xc4 => self.read_bin_with_length(LEN8),
            0xc5 => self.read_bin_with_length(LEN16),
            0xc6 => self.read_bin_with_length(LEN32),
            0xc7..=0xc9 | 0xd4..=0xd8 => {
                debug!(offset = self.off - 1, tag, "extension types are not supported");
                Err(CodecError::UnsupportedType(Unsupported::Extension(tag)))
            }
            0xca => Ok(Value::Float32(f32::from_be_bytes(self.take_array()?))),
            0xcb => Ok(Value::Float64(f64::from_be_bytes(self.take_array()?))),
            0xcc => Ok(Value::UInt(self.read_u8()? as u64)),
            0xcd => Ok(Value::UInt(u16::from_be_bytes(self.take_array()?) as u64)),
            0xce => Ok(Value::UInt(u32::from_be_bytes(self.take_array()?) as u64)),
            0xcf => Ok(Value::UInt(u64::from_be_bytes(self.take_array()?))),
            0xd0 => Ok(Value::Int(i8::from_be_bytes(self.take_array()?) as i64)),
            0xd1 => Ok(Value::Int(i16::from_be_bytes(self.take_array()?) as i64)),
            0xd2 => Ok(Value::Int(i32::from_be_bytes(self.take_array()?) as i64)),
            0xd3 => Ok(Value::Int(i64::from_be_bytes(self.take_array()?))),
            0xd9 => self.read_str_with_length(LEN8),
            0xda => self.read_str_with_length(LEN16),
            0xdb => self.read_str_with_length(LEN32),
            0xdc => self.read_array_with_length(LEN16),
            0xdd => self.read_array_with_length(LEN32),
            0xde => self.read_map_with_length(LEN16),
            0xdf => self.read_map_with_length(LEN32),
            0xe0..=0xff => Ok(Value::Int(tag as i8 as i64)),
        }
    }

    // ── Payload readers ──────────────────────────────────────

    fn read_bin_with_length(&mut self, bits: u32) -> Result<Value> {
        let len = self.read_length(bits)?;
        Ok(Value::Bin(self.take(len)?.to_vec()))
    }

    fn read_str_with_length(&mut self, bits: u32) -> Result<Value> {
        let len = self.read_length(bits)?;
        self.read_str(len)
    }

    fn read_str(&mut self, len: usize) -> Result<Value> {
        let start = self.off;
        let raw = self.take(len)?;
        let text = std::str::from_utf8(raw).map_err(|_| CodecError::InvalidUtf8(start))?;
        Ok(Value::Str(text.to_string()))
    }

    fn read_array_with_length(&mut self, bits: u32) -> Result<Value> {
        let len = self.read_length(bits)?;
        self.read_array(len)
    }

    fn read_map_with_length(&mut self, bits: u32) -> Result<Value> {
        let len = self.read_length(bits)?;
        self.read_map(len)
    }

    fn enter(&mut self) -> Result<()> {
        if self.depth + 1 > self.max_depth {
            debug!(offset = self.off, max_depth = self.max_depth, "nesting too deep");
            return Err(CodecError::DepthLimit(self.max_depth));
        }
        self.depth += 1;
        Ok(())
    }

    fn read_array(&mut self, len: usize) -> Result<Value> {
        self.enter()?;
        // Every element takes at least one byte, so the remaining input
        // bounds how much a declared length can make us reserve.
        let mut items = Vec::with_capacity(len.min(self.remaining()));
        for _ in 0..len {
            items.push(self.decode_value()?);
        }
        self.depth -= 1;
        Ok(Value::Array(items))
    }

    /// Keys must decode to strings.  A repeated key keeps its first
    /// position and takes the later value.
    fn read_map(&mut self, len: usize) -> Result<Value> {
        self.enter()?;
        let cap = len.min(self.remaining() / 2);
        let mut entries: Vec<(String, Value)> = Vec::with_capacity(cap);
        let mut slots: HashMap<String, usize> = HashMap::with_capacity(cap);
        for _ in 0..len {
            let key_offset = self.off;
            let key = match self.decode_value()? {
                Value::Str(s) => s,
                other => {
                    debug!(offset = key_offset, kind = other.kind(), "map key is not a string");
                    return Err(CodecError::UnsupportedType(Unsupported::NonStringKey(
                        other.kind(),
                    )));
                }
            };
            let value = self.decode_value()?;
            match slots.get(&key) {
                Some(&slot) => entries[slot].1 = value,
                None => {
                    slots.insert(key.clone(), entries.len());
                    entries.push((key, value));
                }
            }
        }
        self.depth -= 1;
        Ok(Value::Map(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_field_accumulates_whole_bytes() {
        let mut d = Decoder::new(&[0x01, 0x00]);
        assert_eq!(d.read_length(LEN16).unwrap(), 256);

        let mut d = Decoder::new(&[0x04, 0x3f, 0x35, 0x59]);
        assert_eq!(d.read_length(LEN32).unwrap(), 71_251_289);
        assert_eq!(d.position(), 4);
    }

    #[test]
    fn truncated_length_field_is_read_byte() {
        let mut d = Decoder::new(&[0x01]);
        assert!(matches!(d.read_length(LEN32), Err(CodecError::ReadByte(1))));
    }
}
