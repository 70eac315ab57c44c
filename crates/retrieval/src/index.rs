//! BM25 inverted index over serialized guest records.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::guest::GuestRecord;
use crate::tokenize::tokenize;

/// Returned in place of an empty result list so the model always gets text back.
pub const NO_MATCH: &str = "No matching guest information found.";

/// Number of documents a query returns when the caller doesn't say.
pub const DEFAULT_LIMIT: usize = 3;

/// BM25 tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    /// Term-frequency saturation.
    pub k1: f64,
    /// Document-length normalization, 0.0 (none) to 1.0 (full).
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75 }
    }
}

/// A ranked hit from [`RetrievalIndex::search`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument<'a> {
    /// Position of the record in the corpus the index was built from
    pub index: usize,
    pub score: f64,
    pub text: &'a str,
}

/// Term postings: (document index, term frequency), in ascending document order.
type Postings = Vec<(usize, u32)>;

/// An immutable BM25 index. Owns its serialized documents.
#[derive(Debug, Clone)]
pub struct RetrievalIndex {
    params: Bm25Params,
    documents: Vec<String>,
    doc_lengths: Vec<usize>,
    avg_doc_len: f64,
    postings: HashMap<String, Postings>,
}

impl RetrievalIndex {
    /// Build an index with the default BM25 parameters.
    pub fn build(records: &[GuestRecord]) -> Self {
        Self::build_with(records, Bm25Params::default())
    }

    /// Build an index over `records`, preserving their order.
    ///
    /// An empty corpus is valid; every query against it returns [`NO_MATCH`].
    pub fn build_with(records: &[GuestRecord], params: Bm25Params) -> Self {
        let documents: Vec<String> = records.iter().map(GuestRecord::to_document).collect();
        Self::from_documents(documents, params)
    }

    /// Build an index over already-serialized documents.
    pub fn from_documents(documents: Vec<String>, params: Bm25Params) -> Self {
        let mut postings: HashMap<String, Postings> = HashMap::new();
        let mut doc_lengths = Vec::with_capacity(documents.len());

        for (doc_idx, doc) in documents.iter().enumerate() {
            let tokens = tokenize(doc);
            doc_lengths.push(tokens.len());

            let mut frequencies: HashMap<String, u32> = HashMap::new();
            for token in tokens {
                *frequencies.entry(token).or_default() += 1;
            }
            for (term, tf) in frequencies {
                postings.entry(term).or_default().push((doc_idx, tf));
            }
        }

        let total_len: usize = doc_lengths.iter().sum();
        let avg_doc_len = if documents.is_empty() {
            0.0
        } else {
            total_len as f64 / documents.len() as f64
        };

        info!(
            documents = documents.len(),
            terms = postings.len(),
            avg_doc_len,
            "Built guest retrieval index"
        );

        Self {
            params,
            documents,
            doc_lengths,
            avg_doc_len,
            postings,
        }
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// The serialized documents, in corpus order.
    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    pub fn params(&self) -> Bm25Params {
        self.params
    }

    /// Inverse document frequency; never negative, so any matching term adds to a score.
    fn idf(&self, doc_freq: usize) -> f64 {
        let n = self.documents.len() as f64;
        let df = doc_freq as f64;
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }

    /// Rank documents against `text` and return at most `limit` hits with a positive score.
    ///
    /// Hits are in non-increasing score order; equal scores keep corpus order.
    /// A `limit` of 0 is treated as 1.
    pub fn search(&self, text: &str, limit: usize) -> Vec<ScoredDocument<'_>> {
        let limit = limit.max(1);
        let terms = tokenize(text);
        if terms.is_empty() || self.documents.is_empty() {
            return Vec::new();
        }

        let Bm25Params { k1, b } = self.params;
        let mut scores = vec![0.0_f64; self.documents.len()];

        for term in &terms {
            let Some(postings) = self.postings.get(term) else {
                continue;
            };
            let idf = self.idf(postings.len());
            for &(doc_idx, tf) in postings {
                let tf = f64::from(tf);
                let len_ratio = if self.avg_doc_len > 0.0 {
                    self.doc_lengths[doc_idx] as f64 / self.avg_doc_len
                } else {
                    0.0
                };
                let norm = k1 * (1.0 - b + b * len_ratio);
                scores[doc_idx] += idf * (tf * (k1 + 1.0)) / (tf + norm);
            }
        }

        let mut ranked: Vec<(usize, f64)> = scores
            .into_iter()
            .enumerate()
            .filter(|(_, score)| *score > 0.0)
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(limit);

        debug!(query = %text, hits = ranked.len(), "Guest index searched");

        ranked
            .into_iter()
            .map(|(index, score)| ScoredDocument {
                index,
                score,
                text: &self.documents[index],
            })
            .collect()
    }

    /// Return the text of the top `limit` documents, or `[NO_MATCH]` when nothing scores.
    pub fn query(&self, text: &str, limit: usize) -> Vec<String> {
        let hits = self.search(text, limit);
        if hits.is_empty() {
            return vec![NO_MATCH.to_string()];
        }
        hits.into_iter().map(|hit| hit.text.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gala_guests() -> Vec<GuestRecord> {
        vec![
            GuestRecord::new(
                "Ada Lovelace",
                "best friend",
                "Lady Ada Lovelace is my best friend. She is an esteemed mathematician and friend. She is renowned for her pioneering work in mathematics and computing.",
                "ada.lovelace@example.com",
            ),
            GuestRecord::new(
                "Dr. Nikola Tesla",
                "old friend from university days",
                "Dr. Nikola Tesla is an old friend from your university days. He's recently patented a new wireless energy transmission system.",
                "nikola.tesla@gmail.com",
            ),
            GuestRecord::new(
                "Marie Curie",
                "no relation",
                "Marie Curie was a groundbreaking physicist and chemist, famous for her research on radioactivity.",
                "marie.curie@example.com",
            ),
            GuestRecord::new(
                "Charles Babbage",
                "colleague",
                "Designer of the analytical engine and a frequent correspondent of Ada.",
                "charles.babbage@example.com",
            ),
        ]
    }

    #[test]
    fn exact_name_lookup_scenario() {
        let index = RetrievalIndex::build(&[
            GuestRecord::new("Ada Lovelace", "guest", "mathematician", "a@x"),
            GuestRecord::new("Bob", "guest", "engineer", "b@x"),
        ]);
        assert_eq!(
            index.query("Ada Lovelace", 1),
            vec!["Name: Ada Lovelace\nRelation: guest\nDescription: mathematician\nEmail: a@x"]
        );
    }

    #[test]
    fn unmatched_query_returns_sentinel() {
        let index = RetrievalIndex::build(&gala_guests());
        assert_eq!(index.query("zeppelin", 3), vec![NO_MATCH.to_string()]);
        assert!(index.search("zeppelin", 3).is_empty());
    }

    #[test]
    fn empty_query_returns_sentinel() {
        let index = RetrievalIndex::build(&gala_guests());
        assert_eq!(index.query("  ?? ", 3), vec![NO_MATCH.to_string()]);
    }

    #[test]
    fn empty_corpus_always_returns_sentinel() {
        let index = RetrievalIndex::build(&[]);
        assert!(index.is_empty());
        assert_eq!(index.query("Ada", 3), vec![NO_MATCH.to_string()]);
    }

    #[test]
    fn scores_are_non_increasing() {
        let index = RetrievalIndex::build(&gala_guests());
        let hits = index.search("friend mathematician Ada", 4);
        assert!(hits.len() >= 2);
        for pair in hits.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert_eq!(hits[0].index, 0);
    }

    #[test]
    fn every_name_is_found_within_limit() {
        let guests = gala_guests();
        let index = RetrievalIndex::build(&guests);
        for guest in &guests {
            let results = index.query(&guest.name, DEFAULT_LIMIT);
            assert!(
                results.contains(&guest.to_document()),
                "{} not in top {DEFAULT_LIMIT}",
                guest.name
            );
        }
    }

    #[test]
    fn query_is_case_insensitive() {
        let index = RetrievalIndex::build(&gala_guests());
        assert_eq!(index.query("NIKOLA tesla", 1), index.query("nikola Tesla", 1));
        assert!(index.query("NIKOLA tesla", 1)[0].starts_with("Name: Dr. Nikola Tesla"));
    }

    #[test]
    fn limit_caps_results_and_zero_means_one() {
        let index = RetrievalIndex::build(&gala_guests());
        assert_eq!(index.query("friend", 1).len(), 1);
        assert_eq!(index.query("friend", 0).len(), 1);
        assert!(index.query("example com", 10).len() <= index.len());
    }

    #[test]
    fn equal_scores_keep_corpus_order() {
        let guests = vec![
            GuestRecord::new("Alpha", "guest", "pianist", "a@x"),
            GuestRecord::new("Beta", "guest", "pianist", "b@x"),
        ];
        let index = RetrievalIndex::build(&guests);
        let hits = index.search("pianist", 2);
        assert_eq!(hits[0].score, hits[1].score);
        assert_eq!((hits[0].index, hits[1].index), (0, 1));

        let reversed: Vec<_> = guests.into_iter().rev().collect();
        let reversed_index = RetrievalIndex::build(&reversed);
        let hits = reversed_index.search("pianist", 2);
        assert!(hits[0].text.starts_with("Name: Beta"));
    }

    #[test]
    fn repeated_terms_rank_higher() {
        let index = RetrievalIndex::build(&[
            GuestRecord::new("Carol", "guest", "violin", "c@x"),
            GuestRecord::new("Dave", "guest", "violin violin violin", "d@x"),
        ]);
        let hits = index.search("violin", 2);
        assert_eq!(hits[0].index, 1);
        assert!(hits[0].score > hits[1].score);
    }

    #[test]
    fn build_is_deterministic() {
        let a = RetrievalIndex::build(&gala_guests());
        let b = RetrievalIndex::build(&gala_guests());
        assert_eq!(a.search("friend engine", 4), b.search("friend engine", 4));
        assert_eq!(a.documents(), b.documents());
    }

    #[test]
    fn custom_params_are_kept() {
        let params = Bm25Params { k1: 1.2, b: 0.0 };
        let index = RetrievalIndex::build_with(&gala_guests(), params);
        assert_eq!(index.params(), params);
        assert!(!index.search("Curie", 1).is_empty());
    }
}
