//! Document sources: TREC-style tagged collections and JSON/JSONL files.

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::bytes::Regex as BytesRegex;
use regex::Regex;
use serde::Deserialize;
use sieve_core::IndexError;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

lazy_static! {
    static ref DOC_END: BytesRegex = BytesRegex::new(r"</DOC>").expect("valid regex");
    static ref DOCNO: BytesRegex = BytesRegex::new(r"(?s-u)<DOCNO>(.*?)</DOCNO>").expect("valid regex");
    static ref MARKUP: Regex = Regex::new(r"<[^>]*>").expect("valid regex");
}

/// One document as handed to the normalizer. `text` is an error when the
/// document could not be extracted; the builder skips it.
#[derive(Debug)]
pub struct SourceDoc {
    pub key: String,
    pub text: Result<String, IndexError>,
}

#[derive(Debug, Deserialize)]
struct InputDoc {
    id: String,
    #[serde(default)]
    title: Option<String>,
    body: String,
}

/// Tag names whose contents are indexed. The first line of the file is a header.
pub fn load_tags(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading tag file {}", path.display()))?;
    Ok(text
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_uppercase)
        .collect())
}

/// Input files in a stable order so document ids are reproducible.
pub fn collect_files(input: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = if input.is_dir() {
        WalkDir::new(input)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .collect()
    } else if input.is_file() {
        vec![input.to_path_buf()]
    } else {
        Vec::new()
    };
    files.sort();
    files
}

/// Collection files are read as bytes; text that is not valid UTF-8 only fails
/// the document (or JSONL line) containing it.
pub fn read_documents(file: &Path, tags: &[String]) -> Result<Vec<SourceDoc>> {
    let content = fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let label = file.display().to_string();
    let docs = match file.extension().and_then(|s| s.to_str()) {
        Some("jsonl") => parse_jsonl(&content, &label),
        Some("json") => {
            let text = std::str::from_utf8(&content).with_context(|| format!("decoding {label}"))?;
            parse_json(text, &label)?
        }
        _ => parse_trec(&content, tags, &label),
    };
    tracing::debug!(file = %label, docs = docs.len(), "read collection file");
    Ok(docs)
}

pub fn parse_trec(content: &[u8], tags: &[String], label: &str) -> Vec<SourceDoc> {
    let tag_patterns: Vec<Regex> = tags
        .iter()
        .filter_map(|t| Regex::new(&format!(r"(?s)<{0}(?:\s[^>]*)?>(.*?)</{0}>", regex::escape(t))).ok())
        .collect();
    let mut chunks: Vec<&[u8]> = DOC_END.split(content).collect();
    chunks.pop(); // whatever follows the last </DOC>

    chunks
        .into_iter()
        .enumerate()
        .map(|(n, chunk)| {
            let Some(caps) = DOCNO.captures(chunk) else {
                return failed(format!("{label}#{}", n + 1), "missing <DOCNO>".into());
            };
            let key = String::from_utf8_lossy(&caps[1]).trim().to_string();
            let Ok(chunk) = std::str::from_utf8(chunk) else {
                return failed(key, "document text is not valid UTF-8".into());
            };
            let mut text = String::new();
            for pattern in &tag_patterns {
                if let Some(m) = pattern.captures(chunk) {
                    text.push_str(&MARKUP.replace_all(&m[1], " "));
                    text.push(' ');
                }
            }
            SourceDoc { key, text: Ok(text) }
        })
        .collect()
}

fn failed(key: String, reason: String) -> SourceDoc {
    let text = Err(IndexError::Normalization { key: key.clone(), reason });
    SourceDoc { key, text }
}

fn from_input(doc: InputDoc) -> SourceDoc {
    let text = match doc.title {
        Some(title) => format!("{title} {}", doc.body),
        None => doc.body,
    };
    SourceDoc { key: doc.id, text: Ok(text) }
}

fn parse_jsonl(content: &[u8], label: &str) -> Vec<SourceDoc> {
    content
        .split(|&b| b == b'\n')
        .enumerate()
        .filter(|(_, line)| !line.iter().all(u8::is_ascii_whitespace))
        .map(|(n, line)| match serde_json::from_slice::<InputDoc>(line) {
            Ok(doc) => from_input(doc),
            Err(e) => failed(format!("{label}:{}", n + 1), e.to_string()),
        })
        .collect()
}

fn parse_json(content: &str, label: &str) -> Result<Vec<SourceDoc>> {
    let json: serde_json::Value = serde_json::from_str(content).with_context(|| format!("parsing {label}"))?;
    let values = match json {
        serde_json::Value::Array(arr) => arr,
        obj @ serde_json::Value::Object(_) => vec![obj],
        _ => Vec::new(),
    };
    Ok(values
        .into_iter()
        .enumerate()
        .map(|(n, v)| match serde_json::from_value::<InputDoc>(v) {
            Ok(doc) => from_input(doc),
            Err(e) => failed(format!("{label}[{n}]"), e.to_string()),
        })
        .collect())
}
