use std::path::PathBuf;

use crate::embedder::OnnxConfig;

/// Default settings for the local ONNX embedder.
#[derive(Debug, Clone, Copy)]
pub struct OnnxDefaults {
    pub model_path: &'static str,
    pub tokenizer_path: &'static str,
    pub runtime_library_path: &'static str,
    pub embedding_dimension: usize,
    pub max_input_tokens: usize,
    pub model_id: &'static str,
}

/// Shared defaults so the CLI and tests stay in sync.
pub const ONNX_DEFAULTS: OnnxDefaults = OnnxDefaults {
    model_path: "models/ko-sbert-nli-onnx/model.onnx",
    tokenizer_path: "models/ko-sbert-nli-onnx/tokenizer.json",
    runtime_library_path: "bin/onnxruntime-linux-x64-1.23.1/lib/libonnxruntime.so",
    embedding_dimension: 768,
    max_input_tokens: 512,
    model_id: "ko-sbert-nli-onnx",
};

/// Convenience helper to build an [`OnnxConfig`] from the shared defaults.
pub fn default_onnx_config() -> OnnxConfig {
    // Resolve asset paths relative to this crate's directory, so it works
    // regardless of the current working directory (workspace root or crate dir).
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));

    OnnxConfig {
        model_path: base.join(ONNX_DEFAULTS.model_path),
        tokenizer_path: base.join(ONNX_DEFAULTS.tokenizer_path),
        runtime_library_path: base.join(ONNX_DEFAULTS.runtime_library_path),
        dimension: ONNX_DEFAULTS.embedding_dimension,
        max_input_length: ONNX_DEFAULTS.max_input_tokens,
        model_id: ONNX_DEFAULTS.model_id.into(),
    }
}
