//! Pure-Rust PDF reader via `lopdf`. Behind feature `pure-pdf`.
//!
//! Line fidelity is approximate: `lopdf` reconstructs text from the content
//! streams' text-showing operators, which keeps reading order but can split
//! or join lines differently from a renderer-backed extractor.

#![cfg(feature = "pure-pdf")]

use crate::reader_pdf::{split_visual_lines, ExtractedPage};
use crate::DocIoError;
use lopdf::Document;

pub fn read_pdf_lines_pure(path: &str) -> Result<Vec<ExtractedPage>, DocIoError> {
    let doc = Document::load(path).map_err(|err| DocIoError::Pdf {
        backend: "lopdf",
        message: format!("failed to open {path}: {err}"),
    })?;

    let mut pages = Vec::new();
    for (number, _object_id) in doc.get_pages() {
        let text = doc.extract_text(&[number]).unwrap_or_default();
        pages.push(ExtractedPage {
            number,
            lines: split_visual_lines(&text),
        });
    }
    Ok(pages)
}
