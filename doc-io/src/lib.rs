//! Document I/O for the form-fill pipeline.
//!
//! Three surfaces live here: a DOCX template reader that lifts
//! `word/document.xml` into a [`layout_model::TemplateModel`], a DOCX writer
//! that emits a complete package from reconstructed content, and a PDF line
//! extractor with pluggable backends (stub, pure-Rust, PDFium).

use thiserror::Error;

pub mod reader_docx;
pub mod reader_pdf;
pub mod writer_docx;

#[cfg(feature = "pdfium")]
pub mod reader_pdf_pdfium;
#[cfg(feature = "pure-pdf")]
pub mod reader_pdf_pure;

pub use reader_docx::read_template;
pub use reader_pdf::{
    default_backend, read_pdf_lines, read_pdf_lines_with, split_visual_lines, ExtractedPage,
    PdfBackend,
};
pub use writer_docx::{DocxWriter, TableBuilder};

/// Everything that can go wrong while reading or writing documents.
#[derive(Debug, Error)]
pub enum DocIoError {
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("zip package failure: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML failure: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("{path}: package entry '{entry}' is missing")]
    MissingEntry { path: String, entry: String },

    #[error("table needs at least one row and one column, got {rows}x{cols}")]
    InvalidTableShape { rows: usize, cols: usize },

    #[error("row {row} is out of range for a table with {rows} rows")]
    RowOutOfRange { row: usize, rows: usize },

    #[error("column {col} is out of range for a table with {cols} columns")]
    ColumnOutOfRange { col: usize, cols: usize },

    #[error("cannot merge at ({row}, {col}): {message}")]
    Merge {
        row: usize,
        col: usize,
        message: String,
    },

    #[error("PDF backend '{backend}' failed: {message}")]
    Pdf {
        backend: &'static str,
        message: String,
    },
}
