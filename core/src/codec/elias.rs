use super::bits::{BitReader, BitWriter};
use super::{accumulate, gaps, read_count, write_count};
use crate::error::{IndexError, Result};
use crate::index::DocId;

pub(super) fn encode(postings: &[DocId], out: &mut Vec<u8>) -> Result<()> {
    write_count(postings.len() as u64, out);
    let mut writer = BitWriter::new(out);
    for gap in gaps(postings) {
        encode_gap(gap, &mut writer);
    }
    writer.finish();
    Ok(())
}

pub(super) fn decode(input: &[u8], pos: &mut usize) -> Result<Vec<DocId>> {
    let count = read_count(input, pos)?;
    let mut reader = BitReader::new(&input[*pos..]);
    let mut gap_values = Vec::with_capacity((count as usize).min(input.len() * 8));
    for _ in 0..count {
        gap_values.push(decode_gap(&mut reader)?);
    }
    reader.align_to_byte();
    *pos += reader.byte_position();
    let len = gap_values.len();
    accumulate(gap_values, len)
}

fn bit_len(value: u32) -> u8 {
    (32 - value.leading_zeros()) as u8
}

/// Elias-delta: `n - 1` one bits and a zero, where `n` is the bit length of
/// `L = bit_len(value)`; then `L` without its leading 1; then `value` without
/// its leading 1.
fn encode_gap(value: u32, writer: &mut BitWriter<'_>) {
    debug_assert!(value > 0);
    let len = bit_len(value);
    let len_len = bit_len(len as u32);
    for _ in 1..len_len {
        writer.write_bit(true);
    }
    writer.write_bit(false);
    writer.write_bits(len as u64, len_len - 1);
    writer.write_bits(value as u64, len - 1);
}

fn decode_gap(reader: &mut BitReader<'_>) -> Result<u64> {
    let mut len_len = 1u8;
    while reader.read_bit()? {
        len_len += 1;
        if len_len > 6 {
            return Err(IndexError::corrupt_index("elias-delta length prefix too long"));
        }
    }
    let len = (1u64 << (len_len - 1)) | reader.read_bits(len_len - 1)?;
    if len > 32 {
        return Err(IndexError::corrupt_index(format!("elias-delta gap of {len} bits")));
    }
    let len = len as u8;
    Ok((1u64 << (len - 1)) | reader.read_bits(len - 1)?)
}
