//! Keyword harvesting and embedding-based matching.
//!
//! Template text tends to survive OCR with small mangling ("성 명" for
//! "성명", stray punctuation, synonym-level drift). Instead of exact string
//! comparison, template phrases are split into keyword segments, embedded
//! once, and extracted lines are normalized segment-by-segment against that
//! index before the reconstruction engine takes over.

use embedding_provider::{cosine_similarity, Embedder, EmbedderError};
use regex::Regex;
use thiserror::Error;

mod normalize;

pub use normalize::{LineNormalizer, NormalizedLine};

/// Similarity gate below which a segment keeps its extracted spelling.
pub const DEFAULT_THRESHOLD: f32 = 0.70;

/// Errors produced while building or querying the keyword index.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MatchError {
    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbedderError),
}

/// Split a template phrase into keyword segments on `:` or `：`,
/// swallowing whitespace around the separator. Empty segments are dropped,
/// so "성명 : " yields just `["성명"]`.
pub fn split_keywords(text: &str) -> Vec<String> {
    let splitter = separator_splitter();
    splitter
        .split(text)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn separator_splitter() -> Regex {
    Regex::new(r"\s*[:：]\s*").unwrap()
}

/// A keyword segment harvested from the template, with its embedding.
#[derive(Debug, Clone)]
pub struct Keyword {
    pub raw: String,
    pub vector: Vec<f32>,
}

/// Embedded template keywords, queried by exhaustive cosine argmax.
///
/// The segment count for a form template is small (tens, not thousands),
/// so a linear scan beats maintaining an approximate index.
#[derive(Debug, Clone, Default)]
pub struct KeywordIndex {
    keywords: Vec<Keyword>,
}

impl KeywordIndex {
    /// Build the index from template text inventory entries. Each entry is
    /// split with [`split_keywords`] and every segment is embedded in one
    /// batch. Order is preserved so earlier template text wins ties.
    pub fn build(texts: &[String], embedder: &dyn Embedder) -> Result<Self, MatchError> {
        let raws: Vec<String> = texts.iter().flat_map(|text| split_keywords(text)).collect();

        let refs: Vec<&str> = raws.iter().map(String::as_str).collect();
        let vectors = embedder.embed_batch(&refs)?;

        let keywords = raws
            .into_iter()
            .zip(vectors)
            .map(|(raw, vector)| Keyword { raw, vector })
            .collect::<Vec<_>>();

        log::debug!("keyword index built with {} segments", keywords.len());

        Ok(Self { keywords })
    }

    /// Index and score of the closest keyword, or `None` for an empty index.
    /// Ties resolve to the lowest index, which is the earliest template text.
    pub fn best_match(&self, vector: &[f32]) -> Option<(usize, f32)> {
        let mut best: Option<(usize, f32)> = None;
        for (idx, keyword) in self.keywords.iter().enumerate() {
            let score = cosine_similarity(vector, &keyword.vector);
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((idx, score)),
            }
        }
        best
    }

    pub fn get(&self, index: usize) -> Option<&Keyword> {
        self.keywords.get(index)
    }

    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}
