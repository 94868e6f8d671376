//! MSB-first bit I/O over byte buffers.

use crate::error::{IndexError, Result};

/// Packs values bit-contiguously, most significant bit first.
pub struct BitWriter<'a> {
    output: &'a mut Vec<u8>,
    buffer: u64,
    bits_in_buffer: u8,
}

impl<'a> BitWriter<'a> {
    pub fn new(output: &'a mut Vec<u8>) -> Self {
        Self { output, buffer: 0, bits_in_buffer: 0 }
    }

    /// Append the low `num_bits` bits of `value`.
    pub fn write_bits(&mut self, value: u64, num_bits: u8) {
        debug_assert!(num_bits <= 56);
        if num_bits == 0 {
            return;
        }
        let mask = (1u64 << num_bits) - 1;
        self.buffer = (self.buffer << num_bits) | (value & mask);
        self.bits_in_buffer += num_bits;

        while self.bits_in_buffer >= 8 {
            self.bits_in_buffer -= 8;
            self.output.push((self.buffer >> self.bits_in_buffer) as u8);
        }
        self.buffer &= (1u64 << self.bits_in_buffer) - 1;
    }

    pub fn write_bit(&mut self, bit: bool) {
        self.write_bits(bit as u64, 1);
    }

    /// Zero-pad the pending bits up to the next byte boundary.
    pub fn align_to_byte(&mut self) {
        if self.bits_in_buffer > 0 {
            let pad = 8 - self.bits_in_buffer;
            self.output.push((self.buffer << pad) as u8);
            self.buffer = 0;
            self.bits_in_buffer = 0;
        }
    }

    pub fn finish(mut self) {
        self.align_to_byte();
    }
}

/// Reads bits most significant first; `pos` is a bit offset into `data`.
pub struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn read_bit(&mut self) -> Result<bool> {
        let byte = self
            .data
            .get(self.pos / 8)
            .ok_or_else(|| IndexError::corrupt_index("bitstream ended early"))?;
        let bit = (byte >> (7 - self.pos % 8)) & 1;
        self.pos += 1;
        Ok(bit == 1)
    }

    pub fn read_bits(&mut self, num_bits: u8) -> Result<u64> {
        debug_assert!(num_bits <= 64);
        let mut value = 0u64;
        for _ in 0..num_bits {
            value = (value << 1) | self.read_bit()? as u64;
        }
        Ok(value)
    }

    pub fn align_to_byte(&mut self) {
        self.pos = self.pos.div_ceil(8) * 8;
    }

    /// Bytes touched so far, counting a partially read byte as consumed.
    pub fn byte_position(&self) -> usize {
        self.pos.div_ceil(8)
    }
}
