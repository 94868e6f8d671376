use crate::error::{IndexError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref DELIMITERS: Regex = Regex::new(r#"[\s;,'"`:.(){}\[\]]+"#).expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: Vec<&'static str> = vec![
        "a","about","above","after","again","against","all","am","an","and","any","are","as","at",
        "be","because","been","before","being","below","between","both","but","by",
        "can","cannot","could",
        "did","do","does","doing","down","during",
        "each","few","for","from","further",
        "had","has","have","having","he","her","here","hers","herself","him","himself","his","how",
        "i","if","in","into","is","it","its","itself",
        "me","more","most","my","myself",
        "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
        "same","she","should","so","some","such",
        "than","that","the","their","theirs","them","themselves","then","there","these","they","this","those","through","to","too",
        "under","until","up","very",
        "was","we","were","what","when","where","which","while","who","whom","why","with","would",
        "you","your","yours","yourself","yourselves"
    ];
}

/// Turns raw text into the ordered sequence of index terms.
pub trait Normalizer: Send + Sync {
    fn normalize(&self, text: &str) -> Result<Vec<String>>;
}

/// NFKC + lowercase, split on whitespace and punctuation, drop stopwords, stem.
#[derive(Debug, Clone)]
pub struct Analyzer {
    stopwords: HashSet<String>,
    stem: bool,
}

impl Analyzer {
    pub fn new<I, S>(stopwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { stopwords: stopwords.into_iter().map(Into::into).collect(), stem: true }
    }

    /// No stopwords, no stemming: tokens come out as split and lowercased.
    pub fn plain() -> Self {
        Self { stopwords: HashSet::new(), stem: false }
    }

    pub fn is_stopword(&self, token: &str) -> bool { self.stopwords.contains(token) }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let normalized = text.nfkc().collect::<String>().to_lowercase();
        DELIMITERS
            .split(&normalized)
            .filter(|t| !t.is_empty() && !self.is_stopword(t))
            .map(|t| if self.stem { STEMMER.stem(t).into_owned() } else { t.to_string() })
            .collect()
    }
}

impl Default for Analyzer {
    fn default() -> Self { Self::new(default_stopwords()) }
}

impl Normalizer for Analyzer {
    fn normalize(&self, text: &str) -> Result<Vec<String>> { Ok(self.tokenize(text)) }
}

pub fn default_stopwords() -> Vec<String> {
    STOPWORDS.iter().map(|s| s.to_string()).collect()
}

/// One stopword per line; surrounding whitespace and blank lines are ignored.
pub fn load_stopwords<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let text = fs::read_to_string(path.as_ref()).map_err(|e| {
        IndexError::Config(format!("cannot read stopword file {}: {e}", path.as_ref().display()))
    })?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| l.to_lowercase())
        .collect())
}
