use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use doc_io::{
    default_backend, read_pdf_lines_with, read_template, DocxWriter, ExtractedPage, PdfBackend,
};
use embedding_provider::config::default_onnx_config;
use embedding_provider::{Embedder, HashedConfig, HashedEmbedder, OnnxConfig, OnnxEmbedder};
use restore_engine::{restore, RestoreOptions};

fn print_usage() {
    eprintln!(
        "Usage:\n\
         formfill run --template T.docx --pdf-dir DIR --out OUT.docx [--threshold 0.70] [--backend pdfium|pure|stub] [--hash-dim N]\n\
         formfill inspect --template T.docx\n\
         \n\
         Model overrides (optional, ONNX embedder):\n\
         --model PATH_ONNX   --tokenizer PATH_JSON   --runtime PATH_LIB   --dim N   --max-tokens N\n\
         Notes: --hash-dim selects the deterministic hashed embedder (no model files needed);\n\
         PDF files in --pdf-dir are processed in sorted filename order.\n"
    );
}

fn parse_backend(name: &str) -> Result<PdfBackend, String> {
    match name {
        "pdfium" => Ok(PdfBackend::Pdfium),
        "pure" => Ok(PdfBackend::PureRust),
        "stub" => Ok(PdfBackend::Stub),
        other => Err(format!("unknown backend '{other}' (expected pdfium, pure, or stub)")),
    }
}

fn build_embedder_from_args(args: &[String]) -> Result<Box<dyn Embedder>, String> {
    // Defaults from embedding_provider
    let mut cfg: OnnxConfig = default_onnx_config();
    let mut hash_dim: Option<usize> = None;

    // Parse overrides
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--hash-dim" => { if i+1<args.len() { hash_dim = Some(args[i+1].parse().unwrap_or_else(|_| HashedConfig::default().dimension)); i+=2; } else { return Err("--hash-dim requires number".into()); } }
            "--model" => { if i+1<args.len() { cfg.model_path = PathBuf::from(&args[i+1]); i+=2; } else { return Err("--model requires path".into()); } }
            "--tokenizer" => { if i+1<args.len() { cfg.tokenizer_path = PathBuf::from(&args[i+1]); i+=2; } else { return Err("--tokenizer requires path".into()); } }
            "--runtime" => { if i+1<args.len() { cfg.runtime_library_path = PathBuf::from(&args[i+1]); i+=2; } else { return Err("--runtime requires path".into()); } }
            "--dim" => { if i+1<args.len() { cfg.dimension = args[i+1].parse().unwrap_or(cfg.dimension); i+=2; } else { return Err("--dim requires number".into()); } }
            "--max-tokens" => { if i+1<args.len() { cfg.max_input_length = args[i+1].parse().unwrap_or(cfg.max_input_length); i+=2; } else { return Err("--max-tokens requires number".into()); } }
            _ => { i+=1; }
        }
    }

    if let Some(dimension) = hash_dim {
        let hashed = HashedEmbedder::new(HashedConfig {
            dimension,
            ..HashedConfig::default()
        })
        .map_err(|e| format!("hashed embedder init failed: {e}"))?;
        return Ok(Box::new(hashed));
    }

    let onnx = OnnxEmbedder::new(cfg).map_err(|e| format!("embedder init failed: {e}"))?;
    Ok(Box::new(onnx))
}

/// All pages of all PDFs in `dir`, files in sorted filename order, pages
/// renumbered sequentially across the whole run.
fn collect_pdf_pages(dir: &str, backend: PdfBackend) -> Result<Vec<ExtractedPage>, String> {
    let entries = fs::read_dir(dir).map_err(|e| format!("read {dir}: {e}"))?;
    let mut names: Vec<String> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| format!("read {dir}: {e}"))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(".pdf") {
            names.push(name);
        }
    }
    names.sort();

    let mut pages: Vec<ExtractedPage> = Vec::new();
    for name in &names {
        let path = Path::new(dir).join(name);
        let path = path.to_string_lossy();
        let extracted =
            read_pdf_lines_with(&path, backend).map_err(|e| format!("pdf {path}: {e}"))?;
        log::info!("{name}: {} page(s) extracted", extracted.len());
        for page in extracted {
            let number = (pages.len() + 1) as u32;
            pages.push(ExtractedPage {
                number,
                lines: page.lines,
            });
        }
    }
    Ok(pages)
}

fn do_run(args: Vec<String>) -> Result<(), String> {
    let mut template_path: Option<String> = None;
    let mut pdf_dir: Option<String> = None;
    let mut out_path: Option<String> = None;
    let mut options = RestoreOptions::default();
    let mut backend = default_backend();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--template" => { if i+1<args.len() { template_path = Some(args[i+1].clone()); i+=2; } else { return Err("--template requires path".into()); } }
            "--pdf-dir" => { if i+1<args.len() { pdf_dir = Some(args[i+1].clone()); i+=2; } else { return Err("--pdf-dir requires path".into()); } }
            "--out" => { if i+1<args.len() { out_path = Some(args[i+1].clone()); i+=2; } else { return Err("--out requires path".into()); } }
            "--threshold" => { if i+1<args.len() { options.threshold = args[i+1].parse().unwrap_or(options.threshold); i+=2; } else { return Err("--threshold requires number".into()); } }
            "--backend" => { if i+1<args.len() { backend = parse_backend(&args[i+1])?; i+=2; } else { return Err("--backend requires name".into()); } }
            _ => { i += 1; }
        }
    }
    let template_path = template_path.ok_or("--template is required")?;
    let pdf_dir = pdf_dir.ok_or("--pdf-dir is required")?;
    let out_path = out_path.ok_or("--out is required")?;

    let embedder = build_embedder_from_args(&args)?;

    // Both inputs must be readable before anything is written.
    let mut template =
        read_template(&template_path).map_err(|e| format!("template {template_path}: {e}"))?;
    let pages = collect_pdf_pages(&pdf_dir, backend)?;
    if pages.is_empty() {
        return Err(format!("no PDF files found in {pdf_dir}"));
    }

    let mut writer = DocxWriter::new();
    let report = restore(&mut template, &pages, embedder.as_ref(), &mut writer, &options)
        .map_err(|e| format!("reconstruction failed: {e}"))?;
    writer.save(&out_path).map_err(|e| format!("write {out_path}: {e}"))?;

    for page in &report.pages {
        println!(
            "page {}: {}/{} lines consumed, {} cells, {} paragraphs, {} merges applied ({} skipped)",
            page.page_number,
            page.lines_consumed,
            page.lines_offered,
            page.cells_written,
            page.paragraphs_written,
            page.merges_applied,
            page.merges_skipped
        );
    }
    println!("saved {out_path}");
    Ok(())
}

fn do_inspect(args: Vec<String>) -> Result<(), String> {
    let mut template_path: Option<String> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--template" => { if i+1<args.len() { template_path = Some(args[i+1].clone()); i+=2; } else { return Err("--template requires path".into()); } }
            _ => { i += 1; }
        }
    }
    let template_path = template_path.ok_or("--template is required")?;

    let template =
        read_template(&template_path).map_err(|e| format!("template {template_path}: {e}"))?;
    let json = serde_json::to_string_pretty(&template)
        .map_err(|e| format!("serialize template: {e}"))?;
    println!("{json}");
    Ok(())
}

fn main() {
    env_logger::init();

    let mut args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() { print_usage(); return; }
    let cmd = args.remove(0);
    let res = match cmd.as_str() {
        "run" => do_run(args),
        "inspect" => do_inspect(args),
        _ => { print_usage(); return; }
    };
    if let Err(err) = res {
        eprintln!("Error: {}", err);
        print_usage();
        std::process::exit(1);
    }
}
