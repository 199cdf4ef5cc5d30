//! Sentence-embedding collaborator for template keyword matching.
//!
//! The matcher only needs `embed(text) -> Vec<f32>` plus cosine similarity;
//! everything else here exists to run a local sentence-transformer model
//! through ONNX Runtime, and to provide a deterministic stand-in for tests
//! and model-less runs.

pub mod config;
pub mod embedder;
pub mod similarity;

pub use embedder::{
    Embedder, EmbedderError, EmbedderInfo, HashedConfig, HashedEmbedder, OnnxConfig, OnnxEmbedder,
    ProviderKind,
};
pub use similarity::cosine_similarity;
