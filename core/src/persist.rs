use crate::codec::Codec;
use crate::error::{IndexError, Result};
use crate::index::{DocId, InvertedIndex};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const POSTINGS_EXT: &str = "idx";
pub const METADATA_EXT: &str = "dict";

/// Locations of the two persisted artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexPaths {
    pub postings: PathBuf,
    pub metadata: PathBuf,
}

impl IndexPaths {
    /// `postings` and `metadata` get `.idx` / `.dict` appended unless they already carry them.
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(postings: P, metadata: Q) -> Self {
        Self {
            postings: with_ext(postings.as_ref(), POSTINGS_EXT),
            metadata: with_ext(metadata.as_ref(), METADATA_EXT),
        }
    }

    /// `<prefix>.idx` and `<prefix>.dict`.
    pub fn from_prefix<P: AsRef<Path>>(prefix: P) -> Self {
        Self::new(prefix.as_ref(), prefix.as_ref())
    }
}

fn with_ext(path: &Path, ext: &str) -> PathBuf {
    if path.extension().and_then(|e| e.to_str()) == Some(ext) {
        return path.to_path_buf();
    }
    let mut os = path.as_os_str().to_owned();
    os.push(".");
    os.push(ext);
    PathBuf::from(os)
}

/// Contents of the metadata file, one JSON value per line:
/// vocabulary, key → document id map, codec digit, stopwords.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaFile {
    pub vocabulary: Vec<String>,
    pub doc_id_map: BTreeMap<String, DocId>,
    pub codec: Codec,
    pub stopwords: Vec<String>,
}

impl MetaFile {
    fn render(index: &InvertedIndex) -> Result<String> {
        let json = |r: serde_json::Result<String>| r.map_err(|e| IndexError::Io(io::Error::other(e)));
        Ok(format!(
            "{}\n{}\n{}\n{}\n",
            json(serde_json::to_string(&index.vocabulary))?,
            json(serde_json::to_string(&index.doc_id_map))?,
            index.codec.id(),
            json(serde_json::to_string(&index.stopwords))?,
        ))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text.lines();
        let mut next = |what: &str| {
            lines
                .next()
                .map(str::trim)
                .ok_or_else(|| IndexError::corrupt_metadata(format!("missing {what} line")))
        };

        let vocab_line = next("vocabulary")?;
        let map_line = next("document map")?;
        let codec_line = next("codec")?;
        let stop_line = next("stopwords")?;

        let vocabulary: Vec<String> = serde_json::from_str(vocab_line)
            .map_err(|e| IndexError::corrupt_metadata(format!("vocabulary: {e}")))?;
        let doc_id_map: BTreeMap<String, DocId> = serde_json::from_str(map_line)
            .map_err(|e| IndexError::corrupt_metadata(format!("document map: {e}")))?;
        let codec = codec_line
            .parse::<u8>()
            .ok()
            .and_then(|id| Codec::try_from(id).ok())
            .ok_or_else(|| IndexError::corrupt_metadata(format!("invalid codec selector {codec_line:?}")))?;
        let stopwords: Vec<String> = serde_json::from_str(stop_line)
            .map_err(|e| IndexError::corrupt_metadata(format!("stopwords: {e}")))?;

        let mut terms = HashSet::with_capacity(vocabulary.len());
        if let Some(dup) = vocabulary.iter().find(|t| !terms.insert(t.as_str())) {
            return Err(IndexError::corrupt_metadata(format!("duplicate vocabulary term {dup:?}")));
        }
        let mut ids = HashSet::with_capacity(doc_id_map.len());
        if let Some((key, id)) = doc_id_map.iter().find(|(_, &id)| id == 0 || !ids.insert(id)) {
            return Err(IndexError::corrupt_metadata(format!("document {key:?} has invalid or repeated id {id}")));
        }

        Ok(Self { vocabulary, doc_id_map, codec, stopwords })
    }
}

/// Persist `index` under its own codec. Both files are encoded in memory and
/// staged as `.tmp` siblings; nothing under the final names changes until both
/// are staged. Staged files are removed if anything fails.
pub fn write_index(paths: &IndexPaths, index: &InvertedIndex) -> Result<()> {
    let mut postings = Vec::new();
    for list in &index.postings {
        index.codec.encode(list, &mut postings)?;
    }
    let metadata = MetaFile::render(index)?;

    let files = [(paths.postings.as_path(), postings.as_slice()), (paths.metadata.as_path(), metadata.as_bytes())];
    let mut staged = Vec::with_capacity(files.len());
    if let Err(err) = stage_and_rename(&files, &mut staged) {
        for tmp in &staged {
            let _ = fs::remove_file(tmp);
        }
        return Err(err);
    }
    tracing::info!(
        postings = %paths.postings.display(),
        bytes = postings.len(),
        num_terms = index.num_terms(),
        codec = %index.codec,
        "index written"
    );
    Ok(())
}

fn stage_and_rename(files: &[(&Path, &[u8])], staged: &mut Vec<PathBuf>) -> Result<()> {
    for (path, bytes) in files {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let tmp = tmp_path(path);
        staged.push(tmp.clone());
        fs::write(&tmp, bytes)?;
    }
    for ((path, _), tmp) in files.iter().zip(staged.iter()) {
        fs::rename(tmp, path)?;
    }
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let text = fs::read_to_string(&paths.metadata)?;
    MetaFile::parse(&text)
}

/// Load both files. Either the complete index comes back or an error does.
pub fn load_index(paths: &IndexPaths) -> Result<InvertedIndex> {
    let meta = load_meta(paths)?;
    let bytes = fs::read(&paths.postings)?;
    let records = meta.codec.decode_all(&bytes)?;
    if records.len() != meta.vocabulary.len() {
        return Err(IndexError::corrupt_index(format!(
            "{} postings records for {} vocabulary terms",
            records.len(),
            meta.vocabulary.len()
        )));
    }
    let known: HashSet<DocId> = meta.doc_id_map.values().copied().collect();
    for (term, list) in meta.vocabulary.iter().zip(&records) {
        if let Some(id) = list.iter().find(|&&id| !known.contains(&id)) {
            return Err(IndexError::corrupt_index(format!("postings for {term:?} name unmapped document id {id}")));
        }
    }
    tracing::info!(
        num_terms = meta.vocabulary.len(),
        num_docs = meta.doc_id_map.len(),
        codec = %meta.codec,
        "index loaded"
    );
    Ok(InvertedIndex::from_parts(meta.vocabulary, records, meta.doc_id_map, meta.codec, meta.stopwords))
}
