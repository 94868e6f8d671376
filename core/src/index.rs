use crate::codec::Codec;
use std::collections::{BTreeMap, HashMap};

pub type TermId = u32;
pub type DocId = u32;

/// Read-only Boolean index: vocabulary, postings and the document key mapping.
///
/// `vocabulary[t]` and `postings[t]` describe the same term; the postings file
/// stores records in this order.
#[derive(Debug, Clone, PartialEq)]
pub struct InvertedIndex {
    pub(crate) vocabulary: Vec<String>,
    pub(crate) dictionary: HashMap<String, TermId>,
    pub(crate) postings: Vec<Vec<DocId>>, // strictly increasing per term
    pub(crate) doc_id_map: BTreeMap<String, DocId>,
    pub(crate) docs: HashMap<DocId, String>,
    pub(crate) codec: Codec,
    pub(crate) stopwords: Vec<String>,
}

impl InvertedIndex {
    pub(crate) fn from_parts(
        vocabulary: Vec<String>,
        postings: Vec<Vec<DocId>>,
        doc_id_map: BTreeMap<String, DocId>,
        codec: Codec,
        stopwords: Vec<String>,
    ) -> Self {
        let dictionary = vocabulary
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i as TermId))
            .collect();
        let docs = doc_id_map.iter().map(|(k, &id)| (id, k.clone())).collect();
        Self { vocabulary, dictionary, postings, doc_id_map, docs, codec, stopwords }
    }

    pub fn vocabulary(&self) -> &[String] { &self.vocabulary }

    pub fn term_id(&self, term: &str) -> Option<TermId> { self.dictionary.get(term).copied() }

    /// Postings for `term`, or `None` when the term was never indexed.
    pub fn postings(&self, term: &str) -> Option<&[DocId]> {
        self.term_id(term).map(|tid| self.postings[tid as usize].as_slice())
    }

    pub fn doc_id(&self, external_id: &str) -> Option<DocId> { self.doc_id_map.get(external_id).copied() }

    pub fn external_id(&self, doc_id: DocId) -> Option<&str> { self.docs.get(&doc_id).map(String::as_str) }

    pub fn doc_id_map(&self) -> &BTreeMap<String, DocId> { &self.doc_id_map }

    pub fn codec(&self) -> Codec { self.codec }

    pub fn stopwords(&self) -> &[String] { &self.stopwords }

    pub fn num_docs(&self) -> usize { self.doc_id_map.len() }

    pub fn num_terms(&self) -> usize { self.vocabulary.len() }

    /// Same index, persisted under a different codec.
    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }
}
