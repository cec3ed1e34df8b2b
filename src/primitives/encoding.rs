//! Fixed-width big-endian encoding.
//!
//! Group elements are encoded in `ceil(bits(p) / 8)` bytes and scalars in
//! `ceil(bits(q) / 8)` bytes, left-padded with zeros, so every message has a
//! length known from the parameters alone.

use num_bigint::BigUint;

use crate::{Error, Result};

/// Number of bytes needed to hold `bits` bits.
pub fn byte_len(bits: u64) -> usize {
    bits.div_ceil(8) as usize
}

/// Encodes `value` big-endian, left-padded to exactly `len` bytes.
///
/// # Errors
///
/// Returns [`Error::InvalidEncoding`] if the value does not fit in `len` bytes.
pub fn to_fixed_be(value: &BigUint, len: usize) -> Result<Vec<u8>> {
    let needed = byte_len(value.bits());
    if needed > len {
        return Err(Error::InvalidEncoding(format!(
            "value needs {needed} bytes but the field holds {len}"
        )));
    }

    let mut out = vec![0u8; len - needed];
    if needed > 0 {
        out.extend_from_slice(&value.to_bytes_be());
    }

    Ok(out)
}

/// Decodes a big-endian field of exactly `len` bytes.
///
/// # Errors
///
/// Returns [`Error::InvalidEncoding`] naming `field` if the length differs.
pub fn from_fixed_be(bytes: &[u8], len: usize, field: &str) -> Result<BigUint> {
    if bytes.len() != len {
        return Err(Error::InvalidEncoding(format!(
            "{field}: expected {len} bytes, got {}",
            bytes.len()
        )));
    }

    Ok(BigUint::from_bytes_be(bytes))
}

/// Cursor over a byte slice used when decoding composite messages.
pub(crate) struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub(crate) fn take(&mut self, len: usize, field: &str) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| Error::InvalidEncoding(format!("truncated input: missing {field}")))?;

        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub(crate) fn take_u8(&mut self, field: &str) -> Result<u8> {
        Ok(self.take(1, field)?[0])
    }

    pub(crate) fn take_u32(&mut self, field: &str) -> Result<u32> {
        let raw = self.take(4, field)?;
        let mut buf = [0u8; 4];
        buf.copy_from_slice(raw);
        Ok(u32::from_be_bytes(buf))
    }

    pub(crate) fn finish(self) -> Result<()> {
        let trailing = self.bytes.len() - self.pos;
        if trailing != 0 {
            return Err(Error::InvalidEncoding(format!(
                "input has {trailing} trailing bytes"
            )));
        }
        Ok(())
    }
}
