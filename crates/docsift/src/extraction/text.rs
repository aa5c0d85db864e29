//! The generic bytes-to-text conversion collaborator.
//!
//! Flow-text formats (XML, HTML, legacy Word) and the PDF text pass all go
//! through a [`TextConverter`] keyed by MIME type, so callers can swap in
//! their own conversion service.

use crate::core::formats::{HTML_MIME_TYPE, LEGACY_WORD_MIME_TYPE, PDF_MIME_TYPE, XML_MIME_TYPE};
use crate::error::{DocsiftError, Result};
use crate::extraction::{html, libreoffice, xml};

/// Converts a whole document to text.
///
/// Implementations must be stateless across calls; the dispatcher may share
/// one converter between threads.
pub trait TextConverter: Send + Sync {
    fn convert(&self, bytes: &[u8], mime_type: &str) -> Result<String>;
}

/// The built-in converter.
///
/// | MIME type            | Backend                     |
/// |----------------------|-----------------------------|
/// | `application/xml`    | `quick-xml` text events     |
/// | `text/html`          | `html-to-markdown-rs`       |
/// | `application/msword` | headless LibreOffice        |
/// | `application/pdf`    | `pdf-extract`               |
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConverter;

impl TextConverter for DefaultConverter {
    fn convert(&self, bytes: &[u8], mime_type: &str) -> Result<String> {
        match mime_type {
            XML_MIME_TYPE => xml::extract_xml_text(bytes),
            HTML_MIME_TYPE => html::convert_html(bytes),
            LEGACY_WORD_MIME_TYPE => libreoffice::convert_doc_to_text(bytes),
            PDF_MIME_TYPE => pdf_extract::extract_text_from_mem(bytes)
                .map_err(|e| DocsiftError::backend("convert application/pdf", e.to_string())),
            other => Err(DocsiftError::backend(
                "convert text",
                format!("no converter for MIME type {}", other),
            )),
        }
    }
}
