pub mod builder;
pub mod codec;
pub mod error;
pub mod index;
pub mod persist;
pub mod query;
pub mod tokenizer;

pub use builder::{BuildStats, IndexBuilder};
pub use codec::Codec;
pub use error::{IndexError, Result};
pub use index::{DocId, InvertedIndex, TermId};
pub use query::{Hit, QueryEngine, QueryResult};
pub use tokenizer::{Analyzer, Normalizer};
