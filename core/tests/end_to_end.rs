use sieve_core::persist::{load_index, write_index, IndexPaths};
use sieve_core::{Analyzer, Codec, IndexBuilder, IndexError, InvertedIndex, Normalizer, QueryEngine};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn build(docs: &[(&str, &str)], codec: Codec) -> InvertedIndex {
    let analyzer = Analyzer::plain();
    let mut builder = IndexBuilder::new();
    for (key, text) in docs {
        builder.ingest(key, analyzer.normalize(text)).unwrap();
    }
    builder.finalize(codec, vec![])
}

fn keys(index: &InvertedIndex, query: &str) -> Vec<String> {
    let analyzer = Analyzer::plain();
    QueryEngine::new(index, &analyzer)
        .evaluate(query)
        .unwrap()
        .into_iter()
        .map(|h| h.external_id)
        .collect()
}

fn persist_and_reload(index: &InvertedIndex, dir: &Path, name: &str) -> InvertedIndex {
    let paths = IndexPaths::from_prefix(dir.join(name));
    write_index(&paths, index).unwrap();
    load_index(&paths).unwrap()
}

const TOY: [(&str, &str); 3] = [("doc1", "a b"), ("doc2", "b c"), ("doc3", "a c")];

#[test]
fn toy_collection_survives_vbyte_persistence() {
    let dir = tempdir().unwrap();
    let index = build(&TOY, Codec::VByte);
    let loaded = persist_and_reload(&index, dir.path(), "toy");

    assert_eq!(loaded.codec(), Codec::VByte);
    assert_eq!(keys(&loaded, "a"), vec!["doc1", "doc3"]);
    assert!(keys(&loaded, "a b c").is_empty());
    assert_eq!(keys(&loaded, "b"), vec!["doc1", "doc2"]);
}

#[test]
fn empty_documents_do_not_consume_ids() {
    let index = build(&[("D1", "x y"), ("D2", "  ;; "), ("D3", "y z")], Codec::Raw);
    assert_eq!(index.doc_id("D1"), Some(1));
    assert_eq!(index.doc_id("D2"), None);
    assert_eq!(index.doc_id("D3"), Some(2));
    assert_eq!(index.external_id(2), Some("D3"));
}

#[test]
fn every_codec_answers_queries_identically() {
    let docs: Vec<(String, String)> = (1..=300)
        .map(|i| {
            let mut text = format!("all n{}", i % 7);
            if i % 2 == 0 {
                text.push_str(" even");
            }
            if i % 3 == 0 {
                text.push_str(" three");
            }
            if i == 1 || i == 300 {
                text.push_str(" edges");
            }
            (format!("DOC-{i:04}"), text)
        })
        .collect();
    let borrowed: Vec<(&str, &str)> = docs.iter().map(|(k, t)| (k.as_str(), t.as_str())).collect();
    let queries = ["all", "even three", "n3 even", "edges", "edges three", "n5 n6", "missing", "three all three"];

    let dir = tempdir().unwrap();
    let baseline = build(&borrowed, Codec::Raw);
    let expected: Vec<Vec<String>> = queries.iter().map(|q| keys(&baseline, q)).collect();
    assert_eq!(expected[0].len(), 300);
    assert_eq!(expected[1].len(), 50);
    assert_eq!(expected[3], vec!["DOC-0001", "DOC-0300"]);

    for codec in Codec::ALL {
        let loaded = persist_and_reload(&baseline.clone().with_codec(codec), dir.path(), codec.name());
        assert_eq!(loaded.codec(), codec);
        let got: Vec<Vec<String>> = queries.iter().map(|q| keys(&loaded, q)).collect();
        assert_eq!(got, expected, "codec {codec}");
    }
}

#[test]
fn truncated_postings_file_is_corrupt() {
    let dir = tempdir().unwrap();
    let index = build(&TOY, Codec::Raw);
    for codec in Codec::ALL {
        let paths = IndexPaths::from_prefix(dir.path().join(format!("trunc-{}", codec.id())));
        write_index(&paths, &index.clone().with_codec(codec)).unwrap();
        let bytes = fs::read(&paths.postings).unwrap();
        fs::write(&paths.postings, &bytes[..bytes.len() - 1]).unwrap();
        let err = load_index(&paths).unwrap_err();
        assert!(matches!(err, IndexError::CorruptIndex(_)), "codec {codec}: {err}");
    }
}

#[test]
fn large_gaps_roundtrip_through_files() {
    let dir = tempdir().unwrap();
    let mut builder = IndexBuilder::new();
    for i in 1..=1_000u32 {
        let terms: Vec<String> = if i == 1 || i == 1_000 { vec!["rare".into()] } else { vec!["filler".into()] };
        builder.accept(&format!("k{i}"), &terms).unwrap();
    }
    let index = builder.finalize(Codec::Raw, vec![]);
    for codec in Codec::ALL {
        let loaded = persist_and_reload(&index.clone().with_codec(codec), dir.path(), "gaps");
        assert_eq!(loaded.postings("rare"), Some(&[1, 1_000][..]));
        assert_eq!(loaded.postings("filler").map(<[u32]>::len), Some(998));
    }
}
