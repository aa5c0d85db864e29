//! Supported formats and extension-based routing.
//!
//! Routing looks only at the document name: the suffix starting at the final dot
//! of the final slash-separated element, matched case-sensitively against a fixed
//! table. Anything not in the table is unsupported.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

pub const PLAIN_TEXT_MIME_TYPE: &str = "text/plain";
pub const XML_MIME_TYPE: &str = "application/xml";
pub const HTML_MIME_TYPE: &str = "text/html";
pub const LEGACY_WORD_MIME_TYPE: &str = "application/msword";
pub const DOCX_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const POWER_POINT_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.presentationml.presentation";
pub const EXCEL_BINARY_MIME_TYPE: &str = "application/vnd.ms-excel";
pub const EXCEL_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Formats handed as a whole to the text converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowKind {
    Xml,
    Html,
    Doc,
}

/// One variant per adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Text,
    FlowText(FlowKind),
    Docx,
    Pptx,
    Xls,
    Xlsx,
    Pdf,
}

static EXT_TO_FORMAT: Lazy<HashMap<&'static str, Format>> = Lazy::new(|| {
    let mut m = HashMap::new();

    m.insert(".txt", Format::Text);

    m.insert(".xml", Format::FlowText(FlowKind::Xml));
    m.insert(".htm", Format::FlowText(FlowKind::Html));
    m.insert(".html", Format::FlowText(FlowKind::Html));
    m.insert(".doc", Format::FlowText(FlowKind::Doc));

    m.insert(".docx", Format::Docx);
    m.insert(".pptx", Format::Pptx);
    m.insert(".xls", Format::Xls);
    m.insert(".xlsx", Format::Xlsx);
    m.insert(".pdf", Format::Pdf);

    m
});

impl Format {
    /// Resolve a document name to its format.
    ///
    /// Returns `None` for unknown extensions and for names without one.
    pub fn from_name(name: &str) -> Option<Self> {
        extension_of(name).and_then(Self::from_extension)
    }

    /// Resolve a dotted extension (`".pdf"`). Case-sensitive.
    pub fn from_extension(extension: &str) -> Option<Self> {
        EXT_TO_FORMAT.get(extension).copied()
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Format::Text => PLAIN_TEXT_MIME_TYPE,
            Format::FlowText(FlowKind::Xml) => XML_MIME_TYPE,
            Format::FlowText(FlowKind::Html) => HTML_MIME_TYPE,
            Format::FlowText(FlowKind::Doc) => LEGACY_WORD_MIME_TYPE,
            Format::Docx => DOCX_MIME_TYPE,
            Format::Pptx => POWER_POINT_MIME_TYPE,
            Format::Xls => EXCEL_BINARY_MIME_TYPE,
            Format::Xlsx => EXCEL_MIME_TYPE,
            Format::Pdf => PDF_MIME_TYPE,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Text => "txt",
            Format::FlowText(FlowKind::Xml) => "xml",
            Format::FlowText(FlowKind::Html) => "html",
            Format::FlowText(FlowKind::Doc) => "doc",
            Format::Docx => "docx",
            Format::Pptx => "pptx",
            Format::Xls => "xls",
            Format::Xlsx => "xlsx",
            Format::Pdf => "pdf",
        };
        f.write_str(name)
    }
}

/// The dotted suffix of the last path element, if any.
///
/// `"dir.v2/report.tar.pdf"` yields `".pdf"`; `"dir.v2/README"` yields `None`.
pub fn extension_of(name: &str) -> Option<&str> {
    let file_name = name.rsplit('/').next().unwrap_or(name);
    file_name.rfind('.').map(|idx| &file_name[idx..])
}
