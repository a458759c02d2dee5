use bitvec::prelude::*;

use crate::io::error::{Result, format_error};

/// Presence bits in traversal order, packed most-significant-bit first
pub type PresenceBits = BitVec<u8, Msb0>;

/// Sequential reader over presence bits
///
/// Tracks how many bits were consumed so the decoder can reject both
/// under-reads and leftover bits.
#[derive(Debug)]
pub struct PresenceReader<'a> {
    bits: &'a BitSlice<u8, Msb0>,
    position: usize,
}

impl<'a> PresenceReader<'a> {
    /// Start reading at the first bit
    pub fn new(bits: &'a BitSlice<u8, Msb0>) -> Self {
        Self { bits, position: 0 }
    }

    /// Read the next bit
    ///
    /// # Errors
    ///
    /// Returns a format error if every bit has been consumed
    pub fn next_bit(&mut self) -> Result<bool> {
        let bit = self.bits.get(self.position).as_deref().copied().ok_or_else(|| {
            format_error(
                "presence stream",
                &format!("exhausted after {} bits", self.position),
            )
        })?;
        self.position += 1;
        Ok(bit)
    }

    /// Bits not read yet
    pub fn remaining(&self) -> usize {
        self.bits.len().saturating_sub(self.position)
    }

    /// Check that every bit was consumed
    ///
    /// # Errors
    ///
    /// Returns a format error if bits remain
    pub fn finish(&self) -> Result<()> {
        match self.remaining() {
            0 => Ok(()),
            left => Err(format_error(
                "presence stream",
                &format!("{left} trailing bits after traversal"),
            )),
        }
    }
}

/// Sequential reader over payload tokens
#[derive(Debug)]
pub struct PayloadReader<'a, T> {
    tokens: &'a [T],
    position: usize,
}

impl<'a, T: Copy> PayloadReader<'a, T> {
    /// Start reading at the first token
    pub const fn new(tokens: &'a [T]) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// Read the next token
    ///
    /// # Errors
    ///
    /// Returns a format error if every token has been consumed
    pub fn next_token(&mut self) -> Result<T> {
        let token = self.tokens.get(self.position).copied().ok_or_else(|| {
            format_error(
                "payload stream",
                &format!("exhausted after {} tokens", self.position),
            )
        })?;
        self.position += 1;
        Ok(token)
    }

    /// Check that every token was consumed
    ///
    /// # Errors
    ///
    /// Returns a format error if tokens remain
    pub fn finish(&self) -> Result<()> {
        match self.tokens.len().saturating_sub(self.position) {
            0 => Ok(()),
            left => Err(format_error(
                "payload stream",
                &format!("{left} trailing tokens after traversal"),
            )),
        }
    }
}

/// Pack presence bits into bytes with zeroed padding
pub fn pack_presence(bits: &PresenceBits) -> Vec<u8> {
    let mut packed = bits.clone();
    packed.set_uninitialized(false);
    packed.into_vec()
}

/// Unpack `bit_count` presence bits from bytes
///
/// # Errors
///
/// Returns a format error if the byte count does not match `bit_count` or
/// the padding bits of the last byte are not zero
pub fn unpack_presence(bytes: &[u8], bit_count: usize) -> Result<PresenceBits> {
    if bytes.len() != bit_count.div_ceil(8) {
        return Err(format_error(
            "presence stream",
            &format!("{} bytes cannot hold exactly {bit_count} bits", bytes.len()),
        ));
    }
    let mut bits = PresenceBits::from_slice(bytes);
    if bits.get(bit_count..).is_some_and(|padding| padding.any()) {
        return Err(format_error("presence stream", &"non-zero padding bits"));
    }
    bits.truncate(bit_count);
    Ok(bits)
}
