use crate::error::Result;
use crate::index::{DocId, InvertedIndex};
use crate::tokenizer::Normalizer;
use serde::Serialize;
use std::collections::HashSet;
use std::io::Write;

/// Boolean matches carry a constant score.
pub const MATCH_SCORE: f32 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hit {
    pub doc_id: DocId,
    pub external_id: String,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// 1-based position of the query in its batch.
    pub query: usize,
    pub hits: Vec<Hit>,
}

/// Conjunctive (AND) evaluation over a loaded index.
pub struct QueryEngine<'a, N: Normalizer + ?Sized> {
    index: &'a InvertedIndex,
    normalizer: &'a N,
}

impl<'a, N: Normalizer + ?Sized> QueryEngine<'a, N> {
    pub fn new(index: &'a InvertedIndex, normalizer: &'a N) -> Self {
        Self { index, normalizer }
    }

    /// Distinct normalized terms of `text`, in first-occurrence order.
    pub fn terms(&self, text: &str) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        Ok(self
            .normalizer
            .normalize(text)?
            .into_iter()
            .filter(|t| seen.insert(t.clone()))
            .collect())
    }

    /// Documents containing every term of `text`, ascending by document id.
    /// A query with no terms, or with any term outside the vocabulary, matches nothing.
    pub fn matching_ids(&self, text: &str) -> Result<Vec<DocId>> {
        let terms = self.terms(text)?;
        let mut lists = Vec::with_capacity(terms.len());
        for term in &terms {
            match self.index.postings(term) {
                Some(list) => lists.push(list),
                None => {
                    tracing::debug!(term = %term, "term not in vocabulary");
                    return Ok(Vec::new());
                }
            }
        }
        Ok(intersect(&mut lists))
    }

    pub fn evaluate(&self, text: &str) -> Result<Vec<Hit>> {
        let ids = self.matching_ids(text)?;
        Ok(ids
            .into_iter()
            .filter_map(|doc_id| {
                self.index.external_id(doc_id).map(|key| Hit {
                    doc_id,
                    external_id: key.to_string(),
                    score: MATCH_SCORE,
                })
            })
            .collect())
    }

    pub fn evaluate_batch<I, S>(&self, queries: I) -> Result<Vec<QueryResult>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        queries
            .into_iter()
            .enumerate()
            .map(|(i, q)| Ok(QueryResult { query: i + 1, hits: self.evaluate(q.as_ref())? }))
            .collect()
    }
}

/// Intersection of sorted postings lists, shortest list first.
pub fn intersect(lists: &mut [&[DocId]]) -> Vec<DocId> {
    if lists.is_empty() {
        return Vec::new();
    }
    lists.sort_by_key(|l| l.len());
    let mut acc = lists[0].to_vec();
    for list in &lists[1..] {
        if acc.is_empty() {
            break;
        }
        acc = intersect_pair(&acc, list);
    }
    acc
}

fn intersect_pair(a: &[DocId], b: &[DocId]) -> Vec<DocId> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}

/// One `Q<n> <key> <score>` line per hit, grouped by query in batch order.
pub fn write_results<W: Write>(results: &[QueryResult], mut out: W) -> std::io::Result<()> {
    for result in results {
        for hit in &result.hits {
            writeln!(out, "Q{} {} {:.1}", result.query, hit.external_id, hit.score)?;
        }
    }
    out.flush()
}
