use crate::codec::Codec;
use crate::error::{IndexError, Result};
use crate::index::{DocId, InvertedIndex, TermId};
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildStats {
    pub accepted: usize,
    pub skipped_empty: usize,
    pub failed: usize,
}

/// Single-pass index construction.
///
/// Document ids are handed out in acceptance order starting at 1, so every
/// postings list is built strictly increasing without sorting.
#[derive(Debug)]
pub struct IndexBuilder {
    next_doc_id: DocId,
    vocabulary: Vec<String>,
    dictionary: HashMap<String, TermId>,
    postings: Vec<Vec<DocId>>,
    doc_id_map: BTreeMap<String, DocId>,
    stats: BuildStats,
}

impl Default for IndexBuilder {
    fn default() -> Self { Self::new() }
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self {
            next_doc_id: 1,
            vocabulary: Vec::new(),
            dictionary: HashMap::new(),
            postings: Vec::new(),
            doc_id_map: BTreeMap::new(),
            stats: BuildStats::default(),
        }
    }

    /// Add one normalized document. Returns `Ok(None)` without consuming an id
    /// when `terms` is empty.
    pub fn accept<S: AsRef<str>>(&mut self, external_id: &str, terms: &[S]) -> Result<Option<DocId>> {
        if terms.is_empty() {
            self.stats.skipped_empty += 1;
            return Ok(None);
        }
        if self.doc_id_map.contains_key(external_id) {
            return Err(IndexError::DuplicateDocument(external_id.to_string()));
        }
        let doc_id = self.next_doc_id;
        self.next_doc_id = doc_id
            .checked_add(1)
            .ok_or_else(|| IndexError::Config("document id space exhausted".into()))?;
        self.doc_id_map.insert(external_id.to_string(), doc_id);

        let mut seen: HashSet<&str> = HashSet::with_capacity(terms.len());
        for term in terms.iter().map(AsRef::as_ref) {
            if !seen.insert(term) {
                continue;
            }
            let tid = match self.dictionary.get(term) {
                Some(&tid) => tid,
                None => {
                    let tid = self.vocabulary.len() as TermId;
                    self.vocabulary.push(term.to_string());
                    self.dictionary.insert(term.to_string(), tid);
                    self.postings.push(Vec::new());
                    tid
                }
            };
            self.postings[tid as usize].push(doc_id);
        }
        self.stats.accepted += 1;
        Ok(Some(doc_id))
    }

    /// Like [`accept`](Self::accept), but per-document failures (normalization,
    /// duplicate keys) are logged and counted instead of returned. Anything
    /// else aborts the build.
    pub fn ingest(&mut self, external_id: &str, normalized: Result<Vec<String>>) -> Result<Option<DocId>> {
        match normalized.and_then(|terms| self.accept(external_id, &terms)) {
            Ok(doc_id) => Ok(doc_id),
            Err(err) if err.is_per_document() => {
                tracing::warn!(external_id, error = %err, "skipping document");
                self.stats.failed += 1;
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    pub fn stats(&self) -> BuildStats { self.stats }

    pub fn num_docs(&self) -> usize { self.doc_id_map.len() }

    pub fn finalize(self, codec: Codec, stopwords: Vec<String>) -> InvertedIndex {
        tracing::debug!(
            num_docs = self.doc_id_map.len(),
            num_terms = self.vocabulary.len(),
            %codec,
            "finalizing index"
        );
        InvertedIndex {
            vocabulary: self.vocabulary,
            dictionary: self.dictionary,
            postings: self.postings,
            docs: self.doc_id_map.iter().map(|(k, &id)| (id, k.clone())).collect(),
            doc_id_map: self.doc_id_map,
            codec,
            stopwords,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_documents_consume_no_id() {
        let mut b = IndexBuilder::new();
        assert_eq!(b.accept("D1", &["x"]).unwrap(), Some(1));
        assert_eq!(b.accept::<&str>("D2", &[]).unwrap(), None);
        assert_eq!(b.accept("D3", &["y"]).unwrap(), Some(2));
        let index = b.finalize(Codec::Raw, vec![]);
        assert_eq!(index.doc_id("D1"), Some(1));
        assert_eq!(index.doc_id("D2"), None);
        assert_eq!(index.doc_id("D3"), Some(2));
    }

    #[test]
    fn repeated_terms_post_once() {
        let mut b = IndexBuilder::new();
        b.accept("a", &["dog", "dog", "cat", "dog"]).unwrap();
        b.accept("b", &["cat", "cat"]).unwrap();
        let index = b.finalize(Codec::Raw, vec![]);
        assert_eq!(index.postings("dog"), Some(&[1][..]));
        assert_eq!(index.postings("cat"), Some(&[1, 2][..]));
        assert_eq!(index.vocabulary(), &["dog".to_string(), "cat".to_string()]);
    }

    #[test]
    fn postings_strictly_increase_when_documents_share_terms() {
        let mut b = IndexBuilder::new();
        for i in 0..50 {
            b.accept(&format!("doc{i}"), &["shared", "common", "shared"]).unwrap();
        }
        let index = b.finalize(Codec::VByte, vec![]);
        for term in index.vocabulary() {
            let p = index.postings(term).unwrap();
            assert_eq!(p.len(), 50);
            assert!(p.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn duplicate_keys_are_rejected_without_side_effects() {
        let mut b = IndexBuilder::new();
        b.accept("same", &["a"]).unwrap();
        let err = b.accept("same", &["b"]).unwrap_err();
        assert!(matches!(err, IndexError::DuplicateDocument(_)));
        assert_eq!(b.accept("next", &["c"]).unwrap(), Some(2));
        let index = b.finalize(Codec::Raw, vec![]);
        assert_eq!(index.postings("b"), None);
    }

    #[test]
    fn ingest_recovers_from_failures() {
        let mut b = IndexBuilder::new();
        let bad = Err(IndexError::Normalization { key: "bad".into(), reason: "unreadable".into() });
        assert_eq!(b.ingest("bad", bad).unwrap(), None);
        assert_eq!(b.ingest("good", Ok(vec!["t".into()])).unwrap(), Some(1));
        assert_eq!(b.ingest("good", Ok(vec!["u".into()])).unwrap(), None);
        assert_eq!(b.ingest("empty", Ok(vec![])).unwrap(), None);
        assert_eq!(b.stats(), BuildStats { accepted: 1, skipped_empty: 1, failed: 2 });
    }

    #[test]
    fn ingest_propagates_fatal_errors() {
        let mut b = IndexBuilder::new();
        let err = b.ingest("doc", Err(IndexError::Config("bad codec".into()))).unwrap_err();
        assert!(matches!(err, IndexError::Config(_)));

        b.next_doc_id = DocId::MAX;
        let err = b.ingest("last", Ok(vec!["t".into()])).unwrap_err();
        assert!(matches!(err, IndexError::Config(_)));
        assert_eq!(b.stats().failed, 0);
    }
}
