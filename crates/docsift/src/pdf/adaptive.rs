//! Adaptive PDF extraction.
//!
//! The extractor walks the pages after the skipped prefix, keeps re-encoded
//! images that pass the size filter, and stops reading text once the share
//! of image-bearing pages exceeds the configured ratio. Text is extracted
//! once for the whole document, or not at all.
//!
//! Failures are split by scope:
//!
//! | Failure                       | Outcome                                   |
//! |-------------------------------|-------------------------------------------|
//! | encrypted / check failed      | `PolicyRejection`, no content             |
//! | pages `<= skip`               | `PolicyRejection::TooFewPages`            |
//! | one page unreadable or panics | page skipped                              |
//! | one image undecodable         | image skipped                             |
//! | text fails, images kept       | logged, images returned with empty text   |
//! | text fails, no images         | the text error                            |
//!
//! A panic in the text step counts as a text failure.

use super::backend::PdfBackend;
use super::images::encode_jpeg;
use crate::core::config::ValidatedOptions;
use crate::core::fault::contain;
use crate::error::{PolicyRejection, Result};
use crate::logger::{Level, Logger, emit};
use crate::types::{Extraction, Image};
use image::DynamicImage;

/// Counters gathered during one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PdfScanReport {
    pub total_pages: usize,
    pub pages_scanned: usize,
    pub pages_failed: usize,
    pub image_pages: usize,
    pub images_kept: usize,
    pub images_discarded: usize,
    pub text_abandoned: bool,
    pub stopped_early: bool,
}

pub struct AdaptivePdfExtractor<'a> {
    options: &'a ValidatedOptions,
    logger: &'a dyn Logger,
}

impl<'a> AdaptivePdfExtractor<'a> {
    pub fn new(options: &'a ValidatedOptions, logger: &'a dyn Logger) -> Self {
        Self { options, logger }
    }

    pub fn extract<B: PdfBackend + ?Sized>(&self, backend: &B) -> Result<Extraction> {
        self.extract_with_report(backend).map(|(extraction, _)| extraction)
    }

    pub fn extract_with_report<B: PdfBackend + ?Sized>(&self, backend: &B) -> Result<(Extraction, PdfScanReport)> {
        match backend.is_encrypted() {
            Ok(false) => {}
            Ok(true) => return Err(PolicyRejection::Encrypted.into()),
            Err(e) => return Err(PolicyRejection::EncryptionCheckFailed(e.to_string()).into()),
        }

        let total = backend.page_count()?;
        let skip = self.options.skip_pdf_with_num_pages;
        if total <= skip {
            return Err(PolicyRejection::TooFewPages {
                pages: total,
                threshold: skip,
            }
            .into());
        }

        let max_images = self.options.max_image_count;
        let mut report = PdfScanReport {
            total_pages: total,
            ..PdfScanReport::default()
        };
        let mut images: Vec<Image> = Vec::new();
        let mut need_read_text = true;

        for page in (skip + 1)..=total {
            if !need_read_text && images.len() >= max_images {
                report.stopped_early = true;
                break;
            }
            report.pages_scanned += 1;

            let decoded = match contain(|| backend.page_images(page)) {
                Ok(decoded) => decoded,
                Err(e) => {
                    report.pages_failed += 1;
                    tracing::debug!("Skipping PDF page {}: {}", page, e);
                    continue;
                }
            };

            let mut page_has_image = false;
            for image in decoded {
                let Some(body) = self.qualifying_jpeg(page, image) else {
                    continue;
                };
                page_has_image = true;
                if images.len() < max_images {
                    images.push(Image::encoded("jpeg", body));
                } else {
                    report.images_discarded += 1;
                }
            }

            if page_has_image && need_read_text {
                report.image_pages += 1;
                if report.image_pages as f64 > self.options.read_text_with_image_proportion * total as f64 {
                    need_read_text = false;
                    tracing::debug!(
                        "PDF is image-dominant after page {} ({} of {} pages), skipping text",
                        page,
                        report.image_pages,
                        total
                    );
                }
            }
        }

        report.images_kept = images.len();
        report.text_abandoned = !need_read_text;

        let mut text = String::new();
        if need_read_text {
            match contain(|| backend.text()) {
                Ok(extracted) => text = extracted,
                Err(e) if !images.is_empty() => {
                    emit(
                        self.logger,
                        Level::Error,
                        "pdf text extraction failed, returning images only",
                        &[("images", &images.len()), ("error", &e)],
                    );
                }
                Err(e) => return Err(e),
            }
        }

        tracing::debug!(
            total_pages = report.total_pages,
            pages_scanned = report.pages_scanned,
            pages_failed = report.pages_failed,
            image_pages = report.image_pages,
            images_kept = report.images_kept,
            text_abandoned = report.text_abandoned,
            "PDF scan finished"
        );

        Ok((Extraction::new(images, text), report))
    }

    /// Re-encode one decoded image; `None` when it fails or is too small.
    fn qualifying_jpeg(&self, page: usize, image: Result<DynamicImage>) -> Option<Vec<u8>> {
        let image = match image {
            Ok(image) => image,
            Err(e) => {
                tracing::trace!("Skipping image on page {}: {}", page, e);
                return None;
            }
        };
        let body = match encode_jpeg(&image) {
            Ok(body) => body,
            Err(e) => {
                tracing::trace!("Failed to encode image on page {}: {}", page, e);
                return None;
            }
        };
        (body.len() >= self.options.image_min_size).then_some(body)
    }
}
