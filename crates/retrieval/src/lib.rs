//! Lexical retrieval over the gala guest list.
//!
//! Guests are fetched once from a [`GuestSource`], serialized into fixed
//! four-line documents, and indexed with BM25. The index is immutable after
//! [`RetrievalIndex::build`] and safe to share across concurrent queries.

pub mod guest;
pub mod index;
pub mod source;
pub mod tokenize;

pub use guest::GuestRecord;
pub use index::{Bm25Params, DEFAULT_LIMIT, NO_MATCH, RetrievalIndex, ScoredDocument};
pub use source::{GuestSource, HubDatasetSource, JsonFileSource, StaticSource};
pub use tokenize::tokenize;
