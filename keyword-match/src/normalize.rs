use embedding_provider::Embedder;
use regex::Regex;

use crate::{KeywordIndex, MatchError, DEFAULT_THRESHOLD};

/// Result of normalizing one extracted line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedLine {
    pub text: String,
    /// How many segments were replaced by template keywords.
    pub replacements: usize,
}

/// Segment-level normalizer for extracted text lines.
///
/// A line like "성 명: 홍길동" is split on label separators, each
/// non-separator segment is embedded and compared against the keyword
/// index, and segments scoring at or above the threshold are replaced by
/// the template's own spelling. Separators survive unchanged and the
/// segments are rejoined with single spaces, so the output reads
/// "성명 : 홍길동" regardless of the extracted spacing.
#[derive(Debug, Clone)]
pub struct LineNormalizer {
    index: KeywordIndex,
    threshold: f32,
    splitter: Regex,
}

enum Segment {
    Text(String),
    Separator(String),
}

impl LineNormalizer {
    pub fn new(index: KeywordIndex, threshold: f32) -> Self {
        Self {
            index,
            threshold,
            splitter: Regex::new(r"\s*([:：])\s*").unwrap(),
        }
    }

    pub fn with_default_threshold(index: KeywordIndex) -> Self {
        Self::new(index, DEFAULT_THRESHOLD)
    }

    pub fn index(&self) -> &KeywordIndex {
        &self.index
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Normalize a single line against the keyword index.
    pub fn normalize(
        &self,
        line: &str,
        embedder: &dyn Embedder,
    ) -> Result<NormalizedLine, MatchError> {
        let segments = self.split_retaining_separators(line);
        let mut parts = Vec::with_capacity(segments.len());
        let mut replacements = 0usize;

        for segment in segments {
            match segment {
                Segment::Separator(sep) => parts.push(sep),
                Segment::Text(text) => {
                    if text.trim().is_empty() || self.index.is_empty() {
                        parts.push(text);
                        continue;
                    }

                    let vector = embedder.embed(&text)?;
                    match self.index.best_match(&vector) {
                        Some((idx, score)) if score >= self.threshold => {
                            let keyword = &self.index.keywords()[idx];
                            if keyword.raw != text {
                                log::debug!(
                                    "normalized segment `{text}` -> `{}` (score {score:.3})",
                                    keyword.raw
                                );
                            }
                            parts.push(keyword.raw.clone());
                            replacements += 1;
                        }
                        _ => parts.push(text),
                    }
                }
            }
        }

        Ok(NormalizedLine {
            text: parts.join(" "),
            replacements,
        })
    }

    /// Normalize every line, keeping order. Used on each extracted page
    /// before reconstruction.
    pub fn normalize_all(
        &self,
        lines: &[String],
        embedder: &dyn Embedder,
    ) -> Result<Vec<String>, MatchError> {
        lines
            .iter()
            .map(|line| self.normalize(line, embedder).map(|n| n.text))
            .collect()
    }

    // Plain `Regex::split` drops captured separators, so the retained-split
    // walks match boundaries by hand.
    fn split_retaining_separators(&self, line: &str) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut last = 0usize;

        for caps in self.splitter.captures_iter(line) {
            let whole = caps.get(0).unwrap();
            let sep = caps.get(1).unwrap();
            segments.push(Segment::Text(line[last..whole.start()].to_string()));
            segments.push(Segment::Separator(sep.as_str().to_string()));
            last = whole.end();
        }

        segments.push(Segment::Text(line[last..].to_string()));
        segments
    }
}
