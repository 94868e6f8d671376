use super::take;
use crate::error::{IndexError, Result};
use crate::index::DocId;

pub(super) fn encode(postings: &[DocId], out: &mut Vec<u8>) -> Result<()> {
    let len = u32::try_from(postings.len() * 4)
        .map_err(|_| IndexError::InvalidPostings(format!("{} postings exceed raw record size", postings.len())))?;
    out.reserve(4 + postings.len() * 4);
    out.extend_from_slice(&len.to_be_bytes());
    for &doc_id in postings {
        out.extend_from_slice(&doc_id.to_be_bytes());
    }
    Ok(())
}

pub(super) fn decode(input: &[u8], pos: &mut usize) -> Result<Vec<DocId>> {
    let header = take(input, pos, 4)?;
    let len = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize;
    if len % 4 != 0 {
        return Err(IndexError::corrupt_index(format!("raw payload length {len} is not a multiple of 4")));
    }
    let payload = take(input, pos, len)?;
    let postings: Vec<DocId> = payload
        .chunks_exact(4)
        .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    if postings.first() == Some(&0) || postings.windows(2).any(|w| w[0] >= w[1]) {
        return Err(IndexError::corrupt_index("raw postings are not strictly increasing"));
    }
    Ok(postings)
}
