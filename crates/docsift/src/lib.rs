//! docsift - bounded text and image extraction from office documents and PDFs.
//!
//! Given a named byte source, docsift picks an adapter from the file
//! extension and returns the document's text and embedded images, capped by
//! an extraction policy:
//!
//! - at most `max_image_count` images, each at least `image_min_size` bytes
//! - PDFs with too few pages are rejected, and leading pages are skipped
//! - PDF text is dropped when the document is mostly images
//! - spreadsheets are read up to a sheet, row and cell ceiling
//!
//! Panics raised by format libraries on malformed input are caught and
//! returned as [`DocsiftError::Fault`].
//!
//! # Quick Start
//!
//! ```rust
//! use docsift::{Document, analyze};
//!
//! # fn main() -> docsift::Result<()> {
//! let mut document = Document::from_bytes("notes.txt", b"plain text");
//! let extraction = analyze(Some(&mut document), None)?;
//! assert_eq!(extraction.text, "plain text");
//! # Ok(())
//! # }
//! ```
//!
//! # Supported extensions
//!
//! `.txt`, `.xml`, `.htm`, `.html`, `.doc`, `.docx`, `.pptx`, `.xls`, `.xlsx`
//! and `.pdf`. Matching is case-sensitive.

#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod extraction;
pub mod logger;
pub mod pdf;
pub mod types;

pub use error::{DocsiftError, PolicyRejection, Result};

pub use core::analyzer::{Analyzer, analyze};
pub use core::config::{Options, ValidatedOptions};
pub use core::document::Document;
pub use core::formats::Format;

pub use extraction::text::{DefaultConverter, TextConverter};
pub use logger::{Logger, NoopLogger, TracingLogger};
pub use pdf::{PdfBackend, PdfScanReport};
pub use types::{Extraction, Image};
