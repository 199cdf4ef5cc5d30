//! PDFium-backed PDF reader. Behind feature `pdfium`.

#![cfg(feature = "pdfium")]

use crate::reader_pdf::{split_visual_lines, ExtractedPage};
use crate::DocIoError;
use pdfium_render::prelude::*;
use std::path::PathBuf;

fn bind_pdfium_from_env() -> Option<Box<dyn PdfiumLibraryBindings>> {
    // Prefer an explicit full library path
    if let Ok(path) = std::env::var("PDFIUM_DLL_PATH") {
        let pb = PathBuf::from(path);
        let lib_path = if pb.is_dir() {
            Pdfium::pdfium_platform_library_name_at_path(&pb)
        } else {
            pb
        };
        if let Ok(b) = Pdfium::bind_to_library(&lib_path) {
            return Some(b);
        }
    }
    // Common alternative env var that points to a dir
    if let Ok(dir) = std::env::var("PDFIUM_DIR") {
        let pb = PathBuf::from(dir);
        let lib_path = Pdfium::pdfium_platform_library_name_at_path(&pb);
        if let Ok(b) = Pdfium::bind_to_library(&lib_path) {
            return Some(b);
        }
    }
    None
}

pub fn read_pdf_lines_pdfium(path: &str) -> Result<Vec<ExtractedPage>, DocIoError> {
    let bindings = match bind_pdfium_from_env() {
        Some(b) => b,
        None => Pdfium::bind_to_system_library().map_err(|err| DocIoError::Pdf {
            backend: "pdfium",
            message: format!("failed to bind the pdfium library: {err}"),
        })?,
    };

    let pdfium = Pdfium::new(bindings);
    let document = pdfium
        .load_pdf_from_file(path, None)
        .map_err(|err| DocIoError::Pdf {
            backend: "pdfium",
            message: format!("failed to open {path}: {err}"),
        })?;

    let mut pages = Vec::new();
    for (index, page) in document.pages().iter().enumerate() {
        let text = match page.text() {
            Ok(t) => t.all(),
            Err(_) => String::new(),
        };
        pages.push(ExtractedPage {
            number: index as u32 + 1,
            lines: split_visual_lines(&text),
        });
    }
    Ok(pages)
}
