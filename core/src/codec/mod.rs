//! Postings list codecs.
//!
//! Every codec writes one self-framed record per postings list so records can
//! be concatenated in a single file and read back sequentially:
//!
//! - `Raw`: 4-byte big-endian payload length, then 4-byte big-endian doc ids
//! - `VByte`: count header, then gaps as 7-bit groups (most significant first)
//! - `EliasDelta`: count header, then Elias-delta gaps packed bit-contiguously
//! - `Block`: count header holding the blob length, then snappy-compressed
//!   64-bit little-endian gaps
//!
//! The count header is one byte `w` followed by a `w`-byte big-endian integer.

pub mod bits;
mod block;
mod elias;
mod raw;
mod vbyte;

use crate::error::{IndexError, Result};
use crate::index::DocId;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Codec {
    #[default]
    Raw = 0,
    VByte = 1,
    EliasDelta = 2,
    Block = 3,
}

impl Codec {
    pub const ALL: [Codec; 4] = [Codec::Raw, Codec::VByte, Codec::EliasDelta, Codec::Block];

    pub fn id(self) -> u8 { self as u8 }

    pub fn name(self) -> &'static str {
        match self {
            Codec::Raw => "raw",
            Codec::VByte => "vbyte",
            Codec::EliasDelta => "elias-delta",
            Codec::Block => "block",
        }
    }

    /// Append one framed record for `postings` to `out`.
    pub fn encode(self, postings: &[DocId], out: &mut Vec<u8>) -> Result<()> {
        check_postings(postings)?;
        match self {
            Codec::Raw => raw::encode(postings, out),
            Codec::VByte => vbyte::encode(postings, out),
            Codec::EliasDelta => elias::encode(postings, out),
            Codec::Block => block::encode(postings, out),
        }
    }

    /// Decode the record starting at `*pos` and advance `*pos` past it.
    pub fn decode(self, input: &[u8], pos: &mut usize) -> Result<Vec<DocId>> {
        match self {
            Codec::Raw => raw::decode(input, pos),
            Codec::VByte => vbyte::decode(input, pos),
            Codec::EliasDelta => elias::decode(input, pos),
            Codec::Block => block::decode(input, pos),
        }
    }

    /// Decode every record in `input` until it is exhausted.
    pub fn decode_all(self, input: &[u8]) -> Result<Vec<Vec<DocId>>> {
        let mut pos = 0;
        let mut records = Vec::new();
        while pos < input.len() {
            records.push(self.decode(input, &mut pos)?);
        }
        Ok(records)
    }
}

impl TryFrom<u8> for Codec {
    type Error = IndexError;

    fn try_from(value: u8) -> Result<Self> {
        Codec::ALL
            .into_iter()
            .find(|c| c.id() == value)
            .ok_or_else(|| IndexError::Config(format!("unsupported codec selector {value} (expected 0-3)")))
    }
}

impl FromStr for Codec {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(id) = s.parse::<u8>() {
            return Codec::try_from(id);
        }
        Codec::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| IndexError::Config(format!("unknown codec {s:?}")))
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id(), self.name())
    }
}

fn check_postings(postings: &[DocId]) -> Result<()> {
    if postings.first() == Some(&0) {
        return Err(IndexError::InvalidPostings("document ids start at 1".into()));
    }
    if let Some(w) = postings.windows(2).find(|w| w[0] >= w[1]) {
        return Err(IndexError::InvalidPostings(format!("not strictly increasing: {} then {}", w[0], w[1])));
    }
    Ok(())
}

/// Gap sequence of a validated postings list: `d[0] = p[0]`, `d[i] = p[i] - p[i-1]`.
fn gaps(postings: &[DocId]) -> impl Iterator<Item = u32> + '_ {
    let mut prev = 0;
    postings.iter().map(move |&d| {
        let gap = d - prev;
        prev = d;
        gap
    })
}

/// Running sum of gaps back into absolute ids. Zero gaps and ids beyond `u32`
/// mean the record is damaged.
fn accumulate<I: IntoIterator<Item = u64>>(gaps: I, capacity: usize) -> Result<Vec<DocId>> {
    let mut out = Vec::with_capacity(capacity);
    let mut acc = 0u64;
    for gap in gaps {
        if gap == 0 {
            return Err(IndexError::corrupt_index("zero gap in postings"));
        }
        acc = acc
            .checked_add(gap)
            .filter(|&v| v <= DocId::MAX as u64)
            .ok_or_else(|| IndexError::corrupt_index("document id overflows u32"))?;
        out.push(acc as DocId);
    }
    Ok(out)
}

fn take<'a>(input: &'a [u8], pos: &mut usize, len: usize) -> Result<&'a [u8]> {
    let end = pos
        .checked_add(len)
        .filter(|&end| end <= input.len())
        .ok_or_else(|| {
            IndexError::corrupt_index(format!(
                "record at byte {} needs {len} bytes, {} available",
                *pos,
                input.len().saturating_sub(*pos)
            ))
        })?;
    let slice = &input[*pos..end];
    *pos = end;
    Ok(slice)
}

fn write_count(value: u64, out: &mut Vec<u8>) {
    let bytes = value.to_be_bytes();
    let skip = ((value.leading_zeros() / 8) as usize).min(7);
    out.push((8 - skip) as u8);
    out.extend_from_slice(&bytes[skip..]);
}

fn read_count(input: &[u8], pos: &mut usize) -> Result<u64> {
    let width = take(input, pos, 1)?[0] as usize;
    if width == 0 || width > 8 {
        return Err(IndexError::corrupt_index(format!("invalid count header width {width}")));
    }
    let bytes = take(input, pos, width)?;
    Ok(bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64))
}
