//! PDF text extraction with pluggable backends.
//!
//! Every backend produces the same shape: pages of visual lines, top to
//! bottom, with the spans of one line joined by single spaces. Line order is
//! preserved verbatim because downstream matching consumes lines positionally.

use crate::DocIoError;
use serde::{Deserialize, Serialize};

/// One page of extracted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedPage {
    /// 1-based page number.
    pub number: u32,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfBackend {
    Stub,
    PureRust,
    Pdfium,
}

/// Select the default backend based on enabled cargo features.
pub fn default_backend() -> PdfBackend {
    #[cfg(feature = "pdfium")]
    {
        return PdfBackend::Pdfium;
    }
    #[cfg(all(not(feature = "pdfium"), feature = "pure-pdf"))]
    {
        return PdfBackend::PureRust;
    }
    #[cfg(all(not(feature = "pdfium"), not(feature = "pure-pdf")))]
    {
        PdfBackend::Stub
    }
}

/// Extract page lines with the default backend.
pub fn read_pdf_lines(path: &str) -> Result<Vec<ExtractedPage>, DocIoError> {
    read_pdf_lines_with(path, default_backend())
}

pub fn read_pdf_lines_with(path: &str, backend: PdfBackend) -> Result<Vec<ExtractedPage>, DocIoError> {
    match backend {
        PdfBackend::Stub => Ok(read_pdf_stub(path)),
        PdfBackend::PureRust => {
            #[cfg(feature = "pure-pdf")]
            {
                return crate::reader_pdf_pure::read_pdf_lines_pure(path);
            }
            #[allow(unreachable_code)]
            {
                log::warn!("pure-pdf backend not enabled; falling back to stub");
                Ok(read_pdf_stub(path))
            }
        }
        PdfBackend::Pdfium => {
            #[cfg(feature = "pdfium")]
            {
                return crate::reader_pdf_pdfium::read_pdf_lines_pdfium(path);
            }
            #[allow(unreachable_code)]
            {
                log::warn!("pdfium backend not enabled; falling back to stub");
                Ok(read_pdf_stub(path))
            }
        }
    }
}

/// Raw page text to visual lines: split on newlines, collapse runs of inner
/// whitespace to single spaces, drop blank lines.
pub fn split_visual_lines(text: &str) -> Vec<String> {
    text.replace('\r', "\n")
        .split('\n')
        .filter_map(|line| {
            let joined = line.split_whitespace().collect::<Vec<_>>().join(" ");
            if joined.is_empty() {
                None
            } else {
                Some(joined)
            }
        })
        .collect()
}

/// Stub backend: a deterministic one-page form so the pipeline runs without
/// any PDF library present.
fn read_pdf_stub(_path: &str) -> Vec<ExtractedPage> {
    vec![ExtractedPage {
        number: 1,
        lines: vec![
            "신청서".to_string(),
            "성명 : 홍길동".to_string(),
            "생년월일 : 1990-01-01".to_string(),
            "주소 : 서울특별시 강남구".to_string(),
            "연락처 : 010-1234-5678".to_string(),
        ],
    }]
}
