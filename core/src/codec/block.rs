use super::{accumulate, gaps, read_count, take, write_count};
use crate::error::{IndexError, Result};
use crate::index::DocId;
use snap::raw::{Decoder, Encoder};

const WIDTH: usize = 8;

pub(super) fn encode(postings: &[DocId], out: &mut Vec<u8>) -> Result<()> {
    let mut packed = Vec::with_capacity(postings.len() * WIDTH);
    for gap in gaps(postings) {
        packed.extend_from_slice(&(gap as u64).to_le_bytes());
    }
    let blob = Encoder::new()
        .compress_vec(&packed)
        .map_err(|e| IndexError::InvalidPostings(format!("block compression failed: {e}")))?;
    write_count(blob.len() as u64, out);
    out.extend_from_slice(&blob);
    Ok(())
}

pub(super) fn decode(input: &[u8], pos: &mut usize) -> Result<Vec<DocId>> {
    let len = read_count(input, pos)?;
    let len = usize::try_from(len).map_err(|_| IndexError::corrupt_index("block length exceeds address space"))?;
    let blob = take(input, pos, len)?;
    let packed = Decoder::new()
        .decompress_vec(blob)
        .map_err(|e| IndexError::corrupt_index(format!("block decompression failed: {e}")))?;
    if packed.len() % WIDTH != 0 {
        return Err(IndexError::corrupt_index(format!(
            "decompressed block of {} bytes is not a whole number of gaps",
            packed.len()
        )));
    }
    let gap_values = packed.chunks_exact(WIDTH).map(|c| {
        let mut word = [0u8; WIDTH];
        word.copy_from_slice(c);
        u64::from_le_bytes(word)
    });
    accumulate(gap_values, packed.len() / WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_holds_blob_length() {
        let mut out = Vec::new();
        encode(&[1, 2, 3, 4, 5, 6, 7, 8], &mut out).unwrap();
        assert_eq!(out[0], 1);
        assert_eq!(out[1] as usize, out.len() - 2);
    }

    #[test]
    fn garbage_blob_is_corrupt() {
        let data = [1, 3, 0xFF, 0xFF, 0xFF];
        let mut pos = 0;
        assert!(matches!(decode(&data, &mut pos), Err(IndexError::CorruptIndex(_))));
    }

    #[test]
    fn partial_gap_is_corrupt() {
        let blob = Encoder::new().compress_vec(&[1, 0, 0, 0, 0]).unwrap();
        let mut data = Vec::new();
        write_count(blob.len() as u64, &mut data);
        data.extend_from_slice(&blob);
        let mut pos = 0;
        assert!(decode(&data, &mut pos).is_err());
    }
}
