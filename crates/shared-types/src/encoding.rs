//! # Deterministic Byte Encoding
//!
//! `bytes()` of every value, item and fact is built with `ByteWriter`.
//! Variable-length fields are length-prefixed (u32 big-endian) so that two
//! different field sequences never produce the same bytes.

use primitive_types::U256;

/// Append-only writer for deterministic encodings.
#[derive(Debug, Default, Clone)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Length-prefixed byte string.
    pub fn put_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Length-prefixed UTF-8 string.
    pub fn put_str(&mut self, s: &str) -> &mut Self {
        self.put_bytes(s.as_bytes())
    }

    pub fn put_u8(&mut self, v: u8) -> &mut Self {
        self.buf.push(v);
        self
    }

    pub fn put_u32(&mut self, v: u32) -> &mut Self {
        self.buf.extend_from_slice(&v.to_be_bytes());
        self
    }

    pub fn put_u64(&mut self, v: u64) -> &mut Self {
        self.buf.extend_from_slice(&v.to_be_bytes());
        self
    }

    pub fn put_bool(&mut self, v: bool) -> &mut Self {
        self.put_u8(u8::from(v))
    }

    /// Fixed 32-byte big-endian.
    pub fn put_u256(&mut self, v: &U256) -> &mut Self {
        let mut raw = [0u8; 32];
        v.to_big_endian(&mut raw);
        self.buf.extend_from_slice(&raw);
        self
    }

    /// Count prefix followed by each element's already-encoded bytes.
    pub fn put_list<T>(&mut self, items: &[T], encode: impl Fn(&T) -> Vec<u8>) -> &mut Self {
        self.put_u32(items.len() as u32);
        for item in items {
            self.put_bytes(&encode(item));
        }
        self
    }

    /// Absent marker (0) or present marker (1) followed by the bytes.
    pub fn put_option(&mut self, value: Option<&[u8]>) -> &mut Self {
        match value {
            Some(bytes) => self.put_u8(1).put_bytes(bytes),
            None => self.put_u8(0),
        }
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}
