//! PDF extraction: a collaborator trait over the PDF library, image decoding,
//! and the adaptive page-scan policy.
//!
//! # Example
//!
//! ```rust,no_run
//! use docsift::core::config::ValidatedOptions;
//! use docsift::logger::NoopLogger;
//! use docsift::pdf::extract_pdf;
//! use docsift::DefaultConverter;
//!
//! # fn example() -> docsift::Result<()> {
//! let bytes = std::fs::read("scan.pdf")?;
//! let result = extract_pdf(&bytes, &ValidatedOptions::default(), &NoopLogger, &DefaultConverter)?;
//! println!("{} images, {} bytes of text", result.images.len(), result.text.len());
//! # Ok(())
//! # }
//! ```
pub mod adaptive;
pub mod backend;
pub mod error;
pub mod images;

pub use adaptive::{AdaptivePdfExtractor, PdfScanReport};
pub use backend::{LopdfBackend, PdfBackend};
pub use error::PdfError;

use crate::core::config::ValidatedOptions;
use crate::extraction::text::TextConverter;
use crate::logger::Logger;
use crate::types::Extraction;

/// Open `bytes` with `lopdf` and run the adaptive extractor over it.
pub fn extract_pdf(
    bytes: &[u8],
    options: &ValidatedOptions,
    logger: &dyn Logger,
    converter: &dyn TextConverter,
) -> crate::Result<Extraction> {
    let backend = LopdfBackend::open(bytes, converter)?;
    AdaptivePdfExtractor::new(options, logger).extract(&backend)
}
