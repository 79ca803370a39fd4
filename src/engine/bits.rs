use crate::error::{CodecError, Result};

/// Packed payload plus the number of meaningful bits in its last byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedBits {
    pub bytes: Vec<u8>,
    /// 1..=8; 8 for a full last byte and for an empty payload.
    pub valid_bits_last_byte: u8,
}

impl PackedBits {
    pub fn bit_len(&self) -> u64 {
        match self.bytes.len() {
            0 => 0,
            n => (n as u64 - 1) * 8 + self.valid_bits_last_byte as u64,
        }
    }
}

/// Packs bits MSB-first, zero-padding the final byte on the right.
#[derive(Debug, Default)]
pub struct BitPacker {
    bytes: Vec<u8>,
    current: u8,
    filled: u8,
}

impl BitPacker {
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bytes),
            current: 0,
            filled: 0,
        }
    }

    pub fn push_bit(&mut self, bit: bool) {
        if bit {
            self.current |= 1 << (7 - self.filled);
        }
        self.filled += 1;

        if self.filled == 8 {
            self.bytes.push(self.current);
            self.current = 0;
            self.filled = 0;
        }
    }

    pub fn push_code(&mut self, code: &[bool]) {
        for &bit in code {
            self.push_bit(bit);
        }
    }

    pub fn finish(mut self) -> PackedBits {
        let valid_bits_last_byte = if self.filled > 0 {
            self.bytes.push(self.current);
            self.filled
        } else {
            8
        };
        PackedBits {
            bytes: self.bytes,
            valid_bits_last_byte,
        }
    }
}

/// Yields the bits of a packed payload, dropping the padding of the last byte.
#[derive(Debug, Clone)]
pub struct BitUnpacker<'a> {
    bytes: &'a [u8],
    total_bits: u64,
    position: u64,
}

impl<'a> BitUnpacker<'a> {
    pub fn new(bytes: &'a [u8], valid_bits_last_byte: u8) -> Result<Self> {
        if !(1..=8).contains(&valid_bits_last_byte) {
            return Err(CodecError::InvalidFormat(format!(
                "valid bit count {} is outside 1..=8",
                valid_bits_last_byte
            )));
        }
        let total_bits = match bytes.len() {
            0 => 0,
            n => (n as u64 - 1) * 8 + valid_bits_last_byte as u64,
        };
        Ok(Self {
            bytes,
            total_bits,
            position: 0,
        })
    }

    pub fn total_bits(&self) -> u64 {
        self.total_bits
    }

    pub fn remaining(&self) -> u64 {
        self.total_bits - self.position
    }
}

impl Iterator for BitUnpacker<'_> {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        if self.position >= self.total_bits {
            return None;
        }
        let byte = self.bytes[(self.position / 8) as usize];
        let bit = (byte >> (7 - (self.position % 8))) & 1 == 1;
        self.position += 1;
        Some(bit)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining() as usize;
        (remaining, Some(remaining))
    }
}
