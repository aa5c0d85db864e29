//! Error types for docsift.
//!
//! Every public operation returns [`DocsiftError`]. The variants follow the
//! extraction contract:
//!
//! - `NoFile` / `Unsupported` - caller errors, detected before any parsing
//! - `Io` - reading the byte source failed; always bubbles up unchanged
//! - `Backend` - a format collaborator (zip, calamine, lopdf, converters) failed
//! - `Policy` - a PDF was rejected by policy (encrypted, too few pages)
//! - `Fault` - a panic inside a collaborator, caught at the dispatcher boundary
//! - `Config` - a configuration file could not be loaded
//!
//! # Example
//!
//! ```rust
//! use docsift::{DocsiftError, Result};
//!
//! fn open_stage(bytes: &[u8]) -> Result<usize> {
//!     if bytes.is_empty() {
//!         return Err(DocsiftError::backend("open", "empty payload"));
//!     }
//!     Ok(bytes.len())
//! }
//!
//! assert!(open_stage(b"").is_err());
//! ```
use thiserror::Error;

/// Result type alias using `DocsiftError`.
pub type Result<T> = std::result::Result<T, DocsiftError>;

/// Main error type for all docsift operations.
#[derive(Debug, Error)]
pub enum DocsiftError {
    #[error("file not exists")]
    NoFile,

    #[error("no support file type: {0}")]
    Unsupported(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{operation} failed: {message}")]
    Backend {
        operation: &'static str,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Policy rejection: {0}")]
    Policy(#[from] PolicyRejection),

    #[error("Recovered from fault: {message}")]
    Fault { message: String, backtrace: String },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Expected, policy-driven refusals to process a PDF.
///
/// These are not parsing defects: the document may be perfectly valid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyRejection {
    #[error("PDF is encrypted")]
    Encrypted,

    #[error("PDF encryption check failed: {0}")]
    EncryptionCheckFailed(String),

    #[error("too few pages: {pages} (must exceed {threshold})")]
    TooFewPages { pages: usize, threshold: usize },
}

impl DocsiftError {
    /// Create a `Backend` error tagged with the failing stage.
    pub fn backend<S: Into<String>>(operation: &'static str, message: S) -> Self {
        Self::Backend {
            operation,
            message: message.into(),
            source: None,
        }
    }

    /// Create a `Backend` error tagged with the failing stage, keeping the cause.
    pub fn backend_with_source<S, E>(operation: &'static str, message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend {
            operation,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    pub fn config_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// True for the expected PDF policy outcomes (encrypted, too few pages).
    pub fn is_policy_rejection(&self) -> bool {
        matches!(self, Self::Policy(_))
    }

    /// True when the error was produced by the fault barrier from a panic.
    pub fn is_fault(&self) -> bool {
        matches!(self, Self::Fault { .. })
    }

    /// Stage tag of a `Backend` error.
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            Self::Backend { operation, .. } => Some(operation),
            _ => None,
        }
    }
}

impl From<calamine::Error> for DocsiftError {
    fn from(err: calamine::Error) -> Self {
        DocsiftError::backend_with_source("read spreadsheet", err.to_string(), err)
    }
}

impl From<zip::result::ZipError> for DocsiftError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            // Real IO errors bubble up unchanged
            zip::result::ZipError::Io(io_err) => DocsiftError::Io(io_err),
            other => DocsiftError::backend_with_source("read package", other.to_string(), other),
        }
    }
}

impl From<crate::pdf::error::PdfError> for DocsiftError {
    fn from(err: crate::pdf::error::PdfError) -> Self {
        DocsiftError::backend_with_source("read pdf", err.to_string(), err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_file_message() {
        assert_eq!(DocsiftError::NoFile.to_string(), "file not exists");
    }

    #[test]
    fn test_unsupported_message() {
        let err = DocsiftError::Unsupported(".odt".to_string());
        assert_eq!(err.to_string(), "no support file type: .odt");
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "short read");
        let err: DocsiftError = io_err.into();
        assert!(matches!(err, DocsiftError::Io(_)));
        assert!(err.to_string().contains("short read"));
    }

    #[test]
    fn test_backend_error() {
        let err = DocsiftError::backend("open pdf", "bad xref");
        assert_eq!(err.to_string(), "open pdf failed: bad xref");
        assert_eq!(err.operation(), Some("open pdf"));
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn test_backend_error_with_source() {
        let source = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad data");
        let err = DocsiftError::backend_with_source("read docx", "invalid package", source);
        assert_eq!(err.to_string(), "read docx failed: invalid package");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_policy_rejection() {
        let err: DocsiftError = PolicyRejection::TooFewPages { pages: 3, threshold: 3 }.into();
        assert!(err.is_policy_rejection());
        assert!(!err.is_fault());
        assert_eq!(err.to_string(), "Policy rejection: too few pages: 3 (must exceed 3)");

        let err: DocsiftError = PolicyRejection::Encrypted.into();
        assert_eq!(err.to_string(), "Policy rejection: PDF is encrypted");
    }

    #[test]
    fn test_fault_error() {
        let err = DocsiftError::Fault {
            message: "index out of bounds".to_string(),
            backtrace: String::new(),
        };
        assert!(err.is_fault());
        assert_eq!(err.to_string(), "Recovered from fault: index out of bounds");
    }

    #[test]
    fn test_config_error_with_source() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = DocsiftError::config_with_source("Failed to read docsift.toml", source);
        assert_eq!(err.to_string(), "Configuration error: Failed to read docsift.toml");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_zip_io_error_bubbles_unchanged() {
        let zip_err = zip::result::ZipError::Io(std::io::Error::other("disk gone"));
        let err: DocsiftError = zip_err.into();
        assert!(matches!(err, DocsiftError::Io(_)));
    }

    #[test]
    fn test_zip_format_error_is_backend() {
        let zip_err = zip::result::ZipError::FileNotFound;
        let err: DocsiftError = zip_err.into();
        assert_eq!(err.operation(), Some("read package"));
    }

    #[test]
    fn test_calamine_error_conversion() {
        let cal_err = calamine::Error::Msg("invalid Excel file");
        let err: DocsiftError = cal_err.into();
        assert_eq!(err.operation(), Some("read spreadsheet"));
    }

    #[test]
    fn test_pdf_error_conversion() {
        let pdf_err = crate::pdf::error::PdfError::InvalidPdf("corrupt PDF".to_string());
        let err: DocsiftError = pdf_err.into();
        assert_eq!(err.operation(), Some("read pdf"));
        assert!(err.to_string().contains("corrupt PDF"));
    }
}
