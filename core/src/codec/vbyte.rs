use super::{accumulate, gaps, read_count, take, write_count};
use crate::error::{IndexError, Result};
use crate::index::DocId;

const CONTINUE: u8 = 0x80;
const PAYLOAD: u8 = 0x7F;

pub(super) fn encode(postings: &[DocId], out: &mut Vec<u8>) -> Result<()> {
    write_count(postings.len() as u64, out);
    for gap in gaps(postings) {
        encode_gap(gap, out);
    }
    Ok(())
}

pub(super) fn decode(input: &[u8], pos: &mut usize) -> Result<Vec<DocId>> {
    let count = read_count(input, pos)?;
    let remaining = input.len().saturating_sub(*pos);
    let mut gap_values = Vec::with_capacity((count as usize).min(remaining));
    for _ in 0..count {
        gap_values.push(decode_gap(input, pos)? as u64);
    }
    accumulate(gap_values, count as usize)
}

/// Most significant group first; every byte but the last carries the flag.
fn encode_gap(mut value: u32, out: &mut Vec<u8>) {
    let mut groups = [0u8; 5];
    let mut n = 0;
    loop {
        groups[n] = (value & PAYLOAD as u32) as u8;
        n += 1;
        value >>= 7;
        if value == 0 {
            break;
        }
    }
    for i in (1..n).rev() {
        out.push(groups[i] | CONTINUE);
    }
    out.push(groups[0]);
}

fn decode_gap(input: &[u8], pos: &mut usize) -> Result<u32> {
    let mut value = 0u64;
    loop {
        let byte = take(input, pos, 1)
            .map_err(|_| IndexError::corrupt_index("vbyte continuation chain has no terminal byte"))?[0];
        value = (value << 7) | (byte & PAYLOAD) as u64;
        if value > u32::MAX as u64 {
            return Err(IndexError::corrupt_index("vbyte gap overflows u32"));
        }
        if byte & CONTINUE == 0 {
            return Ok(value as u32);
        }
    }
}
