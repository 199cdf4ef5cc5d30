use std::cmp::min;

use embedding_provider::config::{default_onnx_config, ONNX_DEFAULTS};
use embedding_provider::{cosine_similarity, Embedder, OnnxEmbedder};

/// Smoke tool: embed one or two texts with the default ONNX model.
/// With two texts (separated by `--`) it also prints their cosine similarity.
fn main() {
    let args = std::env::args().skip(1).collect::<Vec<_>>();

    let (first, second) = match args.iter().position(|a| a == "--") {
        Some(split) => (
            args[..split].join(" ").trim().to_owned(),
            Some(args[split + 1..].join(" ").trim().to_owned()),
        ),
        None => (args.join(" ").trim().to_owned(), None),
    };

    let input = if first.is_empty() {
        "sample text for embedding".to_string()
    } else {
        first
    };

    let config = default_onnx_config();
    println!("model path: {}", ONNX_DEFAULTS.model_path);
    println!("runtime library: {}", ONNX_DEFAULTS.runtime_library_path);

    let embedder = OnnxEmbedder::new(config).expect("failed to initialize embedder");
    let vector = embedder.embed(&input).expect("embedding failed");

    println!("input: {input}");
    println!("vector length: {}", vector.len());

    let preview = &vector[..min(8, vector.len())];
    println!("first {} values: {preview:?}", preview.len());

    if let Some(other) = second.filter(|s| !s.is_empty()) {
        let other_vector = embedder.embed(&other).expect("embedding failed");
        println!("other: {other}");
        println!(
            "cosine similarity: {:.4}",
            cosine_similarity(&vector, &other_vector)
        );
    }
}
