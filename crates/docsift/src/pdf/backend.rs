//! The PDF collaborator capability and its `lopdf` implementation.

use super::error::PdfError;
use super::images::decode_pdf_image;
use crate::core::formats::PDF_MIME_TYPE;
use crate::error::{DocsiftError, Result};
use crate::extraction::text::TextConverter;
use image::DynamicImage;
use lopdf::{Document, ObjectId};
use std::collections::BTreeMap;

/// What the adaptive extractor needs from a PDF library.
///
/// Pages are numbered from 1. `page_images` fails as a whole when the page
/// cannot be read; each inner result is one image on that page.
pub trait PdfBackend {
    fn is_encrypted(&self) -> Result<bool>;

    fn page_count(&self) -> Result<usize>;

    fn page_images(&self, page: usize) -> Result<Vec<Result<DynamicImage>>>;

    /// Text of the whole document.
    fn text(&self) -> Result<String>;
}

/// [`PdfBackend`] over an in-memory document parsed by `lopdf`.
pub struct LopdfBackend<'a> {
    bytes: &'a [u8],
    document: Document,
    pages: BTreeMap<u32, ObjectId>,
    converter: &'a dyn TextConverter,
}

impl<'a> LopdfBackend<'a> {
    pub fn open(bytes: &'a [u8], converter: &'a dyn TextConverter) -> Result<Self> {
        let document = Document::load_mem(bytes)
            .map_err(|e| DocsiftError::backend_with_source("open pdf", e.to_string(), PdfError::from(e)))?;
        let pages = document.get_pages();
        Ok(Self {
            bytes,
            document,
            pages,
            converter,
        })
    }
}

impl PdfBackend for LopdfBackend<'_> {
    fn is_encrypted(&self) -> Result<bool> {
        Ok(self.document.is_encrypted())
    }

    fn page_count(&self) -> Result<usize> {
        Ok(self.pages.len())
    }

    fn page_images(&self, page: usize) -> Result<Vec<Result<DynamicImage>>> {
        let page_id = u32::try_from(page)
            .ok()
            .and_then(|number| self.pages.get(&number))
            .copied()
            .ok_or(PdfError::PageNotFound(page))?;

        let images = self.document.get_page_images(page_id).map_err(PdfError::from)?;

        Ok(images
            .iter()
            .map(|pdf_image| decode_pdf_image(&self.document, pdf_image).map_err(DocsiftError::from))
            .collect())
    }

    fn text(&self) -> Result<String> {
        self.converter.convert(self.bytes, PDF_MIME_TYPE)
    }
}
