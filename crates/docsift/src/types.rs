//! Result types returned by extraction.

use serde::Serialize;
use std::fmt;

/// One extracted image.
///
/// `path` locates the image inside its source (an archive path for OOXML
/// packages, empty for images the engine re-encoded itself). `format` is an
/// extension-style tag such as `"jpeg"` or `"png"`. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    path: String,
    format: String,
    #[serde(skip)]
    body: Vec<u8>,
}

impl Image {
    pub fn new(path: impl Into<String>, format: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            format: format.into(),
            body,
        }
    }

    /// An image produced in memory by the engine (no origin path).
    pub fn encoded(format: impl Into<String>, body: Vec<u8>) -> Self {
        Self::new(String::new(), format, body)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

impl fmt::Display for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.path, self.format)
    }
}

/// Images and text extracted from one document.
///
/// Images are in document order (pages, slides, rows); text is the
/// concatenation of text runs in the same order. Empty text is a valid outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Extraction {
    pub images: Vec<Image>,
    pub text: String,
}

impl Extraction {
    pub fn new(images: Vec<Image>, text: String) -> Self {
        Self { images, text }
    }

    pub fn text_only(text: String) -> Self {
        Self {
            images: Vec::new(),
            text,
        }
    }

    pub fn images_only(images: Vec<Image>) -> Self {
        Self {
            images,
            text: String::new(),
        }
    }

    pub fn into_parts(self) -> (Vec<Image>, String) {
        (self.images, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_display() {
        let image = Image::new("xl/media/image1", "png", vec![1, 2, 3]);
        assert_eq!(image.to_string(), "xl/media/image1.png");
        assert_eq!(image.len(), 3);
    }

    #[test]
    fn test_encoded_image_has_no_path() {
        let image = Image::encoded("jpeg", vec![0xFF, 0xD8]);
        assert!(image.path().is_empty());
        assert_eq!(image.format(), "jpeg");
        assert_eq!(image.body(), &[0xFF, 0xD8]);
    }

    #[test]
    fn test_serialization_skips_body() {
        let image = Image::new("word/media/a.png", "png", vec![0; 16]);
        let json = serde_json::to_value(&image).unwrap();
        assert_eq!(json["path"], "word/media/a.png");
        assert!(json.get("body").is_none());
    }

    #[test]
    fn test_into_parts() {
        let extraction = Extraction::new(vec![Image::encoded("jpeg", vec![1])], "hello".to_string());
        let (images, text) = extraction.into_parts();
        assert_eq!(images.len(), 1);
        assert_eq!(text, "hello");
    }
}
