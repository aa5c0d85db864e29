//! Format adapters.
//!
//! Each adapter turns the bytes of one format family into an
//! [`Extraction`](crate::types::Extraction), applying the count, size and
//! spreadsheet bounds from [`ValidatedOptions`](crate::core::config::ValidatedOptions).

pub mod docx;
pub mod excel;
pub mod html;
pub mod libreoffice;
pub(crate) mod package;
pub mod pptx;
pub mod text;
pub mod xml;

pub use docx::extract_docx;
pub use excel::{extract_xls, extract_xlsx};
pub use pptx::extract_pptx;
pub use text::{DefaultConverter, TextConverter};
