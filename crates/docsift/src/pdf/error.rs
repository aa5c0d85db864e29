use std::fmt;

#[derive(Debug, Clone)]
pub enum PdfError {
    InvalidPdf(String),
    PageNotFound(usize),
    UnsupportedImage(String),
    ImageDecodeFailed(String),
    ImageEncodeFailed(String),
    IOError(String),
}

impl fmt::Display for PdfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PdfError::InvalidPdf(msg) => write!(f, "Invalid PDF: {}", msg),
            PdfError::PageNotFound(page) => write!(f, "Page {} not found", page),
            PdfError::UnsupportedImage(kind) => write!(f, "Unsupported image encoding: {}", kind),
            PdfError::ImageDecodeFailed(msg) => write!(f, "Image decoding failed: {}", msg),
            PdfError::ImageEncodeFailed(msg) => write!(f, "Image encoding failed: {}", msg),
            PdfError::IOError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for PdfError {}

impl From<lopdf::Error> for PdfError {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(io_err) => PdfError::IOError(io_err.to_string()),
            _ => PdfError::InvalidPdf(err.to_string()),
        }
    }
}

impl From<image::ImageError> for PdfError {
    fn from(err: image::ImageError) -> Self {
        PdfError::ImageDecodeFailed(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PdfError>;
