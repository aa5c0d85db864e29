//! The document dispatcher.
//!
//! [`Analyzer::analyze`] checks the handle, routes on the name's extension,
//! runs the matching adapter and reports the outcome through the logger hook.
//! Routing and extraction run inside the fault barrier, so a panicking
//! collaborator produces [`DocsiftError::Fault`] instead of unwinding into the
//! caller.

use crate::core::config::{Options, ValidatedOptions};
use crate::core::document::Document;
use crate::core::fault::contain;
use crate::core::formats::{Format, extension_of};
use crate::error::{DocsiftError, Result};
use crate::extraction::text::{DefaultConverter, TextConverter};
use crate::extraction::{extract_docx, extract_pptx, extract_xls, extract_xlsx};
use crate::logger::{Level, Logger, NoopLogger, emit};
use crate::pdf::extract_pdf;
use crate::types::Extraction;
use std::fmt;
use std::sync::Arc;

/// Extracts images and text from documents under one validated policy.
///
/// An `Analyzer` holds no per-call state and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use docsift::{Analyzer, Document, Options};
///
/// let analyzer = Analyzer::new(&Options::default());
/// let mut document = Document::from_bytes("notes.txt", b"hello");
/// let extraction = analyzer.analyze(Some(&mut document)).unwrap();
/// assert_eq!(extraction.text, "hello");
/// ```
#[derive(Clone)]
pub struct Analyzer {
    options: ValidatedOptions,
    logger: Arc<dyn Logger>,
    converter: Arc<dyn TextConverter>,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::with_validated(ValidatedOptions::default())
    }
}

impl fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analyzer").field("options", &self.options).finish_non_exhaustive()
    }
}

impl Analyzer {
    pub fn new(options: &Options) -> Self {
        Self::with_validated(options.validate())
    }

    pub fn with_validated(options: ValidatedOptions) -> Self {
        Self {
            options,
            logger: Arc::new(NoopLogger),
            converter: Arc::new(DefaultConverter),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_converter(mut self, converter: Arc<dyn TextConverter>) -> Self {
        self.converter = converter;
        self
    }

    pub fn options(&self) -> &ValidatedOptions {
        &self.options
    }

    /// Extract images and text from `document`.
    ///
    /// # Errors
    ///
    /// - `NoFile` when the handle is absent, unnamed, or has no byte source
    /// - `Unsupported` when the extension is not recognised
    /// - `Io`, `Backend` or `Policy` from the adapter
    /// - `Fault` when a collaborator panicked
    pub fn analyze(&self, document: Option<&mut Document<'_>>) -> Result<Extraction> {
        let Some(document) = document else {
            return Err(DocsiftError::NoFile);
        };
        if document.name().is_empty() || !document.has_source() {
            return Err(DocsiftError::NoFile);
        }

        let name = document.name().to_string();
        let extension = extension_of(&name).unwrap_or_default().to_string();

        let result = contain(|| self.route(document));

        match &result {
            Ok(extraction) => emit(
                self.logger.as_ref(),
                Level::Debug,
                "document extracted",
                &[
                    ("name", &name),
                    ("format", &extension),
                    ("images", &extraction.images.len()),
                    ("text_len", &extraction.text.len()),
                ],
            ),
            Err(DocsiftError::Unsupported(_)) => emit(
                self.logger.as_ref(),
                Level::Info,
                "unsupported document type",
                &[("name", &name), ("format", &extension)],
            ),
            Err(e) => emit(
                self.logger.as_ref(),
                Level::Error,
                "document extraction failed",
                &[("name", &name), ("format", &extension), ("error", e)],
            ),
        }

        result
    }

    fn route(&self, document: &mut Document<'_>) -> Result<Extraction> {
        let Some(format) = Format::from_name(document.name()) else {
            let name = document.name();
            return Err(DocsiftError::Unsupported(extension_of(name).unwrap_or(name).to_string()));
        };

        let bytes = document.read_all()?;
        tracing::debug!("Routing {} ({} bytes) as {}", document.name(), bytes.len(), format);

        match format {
            Format::Text => Ok(Extraction::text_only(String::from_utf8_lossy(&bytes).into_owned())),
            Format::FlowText(_) => self
                .converter
                .convert(&bytes, format.mime_type())
                .map(Extraction::text_only),
            Format::Docx => extract_docx(&bytes, &self.options),
            Format::Pptx => extract_pptx(&bytes, &self.options),
            Format::Xls => extract_xls(&bytes, &self.options),
            Format::Xlsx => extract_xlsx(&bytes, &self.options),
            Format::Pdf => extract_pdf(&bytes, &self.options, self.logger.as_ref(), self.converter.as_ref()),
        }
    }
}

/// One-shot extraction with the default logger and converter.
///
/// `None` options means all defaults.
pub fn analyze(document: Option<&mut Document<'_>>, options: Option<&Options>) -> Result<Extraction> {
    let validated = options.map(Options::validate).unwrap_or_default();
    Analyzer::with_validated(validated).analyze(document)
}
