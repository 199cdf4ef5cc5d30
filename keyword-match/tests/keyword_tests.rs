use std::collections::HashMap;

use embedding_provider::{Embedder, EmbedderError, EmbedderInfo, ProviderKind};
use keyword_match::{
    split_keywords, KeywordIndex, LineNormalizer, DEFAULT_THRESHOLD,
};

/// Test embedder with hand-picked vectors so cosine scores are exact.
/// Unknown texts map to a reserved axis orthogonal to every mapped vector.
struct FixedEmbedder {
    info: EmbedderInfo,
    vectors: HashMap<String, Vec<f32>>,
    fallback: Vec<f32>,
}

impl FixedEmbedder {
    fn new(entries: &[(&str, Vec<f32>)]) -> Self {
        let dimension = entries.first().map(|(_, v)| v.len()).unwrap_or(4);
        let mut fallback = vec![0.0; dimension];
        fallback[dimension - 1] = 1.0;

        Self {
            info: EmbedderInfo {
                provider: ProviderKind::Hashed,
                model_id: "fixed-test".into(),
                dimension,
            },
            vectors: entries
                .iter()
                .map(|(text, vector)| (text.to_string(), vector.clone()))
                .collect(),
            fallback,
        }
    }
}

impl Embedder for FixedEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError> {
        Ok(self
            .vectors
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone()))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedderError> {
        texts.iter().map(|text| self.embed(text)).collect()
    }

    fn info(&self) -> &EmbedderInfo {
        &self.info
    }
}

#[test]
fn split_keywords_handles_both_separator_forms() {
    assert_eq!(split_keywords("성명 : 홍길동"), vec!["성명", "홍길동"]);
    assert_eq!(split_keywords("주소：서울"), vec!["주소", "서울"]);
}

#[test]
fn split_keywords_drops_empty_segments() {
    assert_eq!(split_keywords("성명 :"), vec!["성명"]);
    assert_eq!(split_keywords(": 값"), vec!["값"]);
    assert!(split_keywords("").is_empty());
    assert!(split_keywords(" : ").is_empty());
}

#[test]
fn split_keywords_without_separator_returns_whole_text() {
    assert_eq!(split_keywords("연락처"), vec!["연락처"]);
}

#[test]
fn index_splits_template_texts_into_segments() {
    let embedder = FixedEmbedder::new(&[
        ("성명", vec![1.0, 0.0, 0.0, 0.0]),
        ("주소", vec![0.0, 1.0, 0.0, 0.0]),
    ]);
    let texts = vec!["성명 :".to_string(), "주소：서울".to_string()];

    let index = KeywordIndex::build(&texts, &embedder).expect("index builds");

    let raws: Vec<&str> = index.keywords().iter().map(|k| k.raw.as_str()).collect();
    assert_eq!(raws, vec!["성명", "주소", "서울"]);
}

#[test]
fn best_match_on_empty_index_is_none() {
    let embedder = FixedEmbedder::new(&[]);
    let index = KeywordIndex::build(&[], &embedder).expect("empty index builds");

    assert!(index.is_empty());
    assert_eq!(index.best_match(&[1.0, 0.0, 0.0, 0.0]), None);
}

#[test]
fn best_match_prefers_first_index_on_ties() {
    let shared = vec![1.0, 0.0, 0.0, 0.0];
    let embedder = FixedEmbedder::new(&[("성명", shared.clone()), ("이름", shared.clone())]);
    let texts = vec!["성명".to_string(), "이름".to_string()];

    let index = KeywordIndex::build(&texts, &embedder).expect("index builds");
    let (idx, score) = index.best_match(&shared).expect("non-empty index");

    assert_eq!(idx, 0);
    assert!((score - 1.0).abs() < 1e-6);
}

#[test]
fn normalizer_replaces_segment_scoring_exactly_at_threshold() {
    // cos([3,4,0,0], [1,0,0,0]) = 3/5 = 0.6 with no rounding slack
    let embedder = FixedEmbedder::new(&[
        ("성명", vec![1.0, 0.0, 0.0, 0.0]),
        ("성 명", vec![3.0, 4.0, 0.0, 0.0]),
    ]);
    let index =
        KeywordIndex::build(&["성명 :".to_string()], &embedder).expect("index builds");

    let at_threshold = LineNormalizer::new(index.clone(), 0.6);
    let normalized = at_threshold
        .normalize("성 명 : 홍길동", &embedder)
        .expect("normalization succeeds");
    assert_eq!(normalized.text, "성명 : 홍길동");
    assert_eq!(normalized.replacements, 1);

    let above_threshold = LineNormalizer::new(index, 0.61);
    let kept = above_threshold
        .normalize("성 명 : 홍길동", &embedder)
        .expect("normalization succeeds");
    assert_eq!(kept.text, "성 명 : 홍길동");
    assert_eq!(kept.replacements, 0);
}

#[test]
fn normalizer_keeps_unmatched_segments_verbatim() {
    let embedder = FixedEmbedder::new(&[("성명", vec![1.0, 0.0, 0.0, 0.0])]);
    let index =
        KeywordIndex::build(&["성명".to_string()], &embedder).expect("index builds");
    let normalizer = LineNormalizer::with_default_threshold(index);

    let normalized = normalizer
        .normalize("전혀 다른 내용", &embedder)
        .expect("normalization succeeds");

    assert_eq!(normalized.text, "전혀 다른 내용");
    assert_eq!(normalized.replacements, 0);
}

#[test]
fn normalizer_standardizes_separator_spacing() {
    let embedder = FixedEmbedder::new(&[("성명", vec![1.0, 0.0, 0.0, 0.0])]);
    let index =
        KeywordIndex::build(&["성명 :".to_string()], &embedder).expect("index builds");
    let normalizer = LineNormalizer::with_default_threshold(index);

    let normalized = normalizer
        .normalize("성명:홍길동", &embedder)
        .expect("normalization succeeds");

    assert_eq!(normalized.text, "성명 : 홍길동");
}

#[test]
fn normalizer_passes_lines_through_when_index_is_empty() {
    let embedder = FixedEmbedder::new(&[]);
    let index = KeywordIndex::build(&[], &embedder).expect("empty index builds");
    let normalizer = LineNormalizer::with_default_threshold(index);

    let normalized = normalizer
        .normalize("성명 : 홍길동", &embedder)
        .expect("normalization succeeds");

    assert_eq!(normalized.text, "성명 : 홍길동");
    assert_eq!(normalized.replacements, 0);
}

#[test]
fn normalize_all_preserves_line_order() {
    let embedder = FixedEmbedder::new(&[("성명", vec![1.0, 0.0, 0.0, 0.0])]);
    let index =
        KeywordIndex::build(&["성명".to_string()], &embedder).expect("index builds");
    let normalizer = LineNormalizer::with_default_threshold(index);

    let lines = vec![
        "제목".to_string(),
        "성명:홍길동".to_string(),
        "비고".to_string(),
    ];
    let normalized = normalizer
        .normalize_all(&lines, &embedder)
        .expect("normalization succeeds");

    assert_eq!(normalized, vec!["제목", "성명 : 홍길동", "비고"]);
}

#[test]
fn default_threshold_is_seventy_percent() {
    assert!((DEFAULT_THRESHOLD - 0.70).abs() < f32::EPSILON);

    let embedder = FixedEmbedder::new(&[]);
    let index = KeywordIndex::build(&[], &embedder).expect("empty index builds");
    let normalizer = LineNormalizer::with_default_threshold(index);
    assert!((normalizer.threshold() - 0.70).abs() < f32::EPSILON);
}
