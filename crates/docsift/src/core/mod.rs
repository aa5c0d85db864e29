//! Dispatch, configuration and the input model.
//!
//! - [`analyzer`]: routes a [`Document`](document::Document) to its adapter
//!   inside the fault barrier
//! - [`config`]: the extraction policy and its normalisation
//! - [`formats`]: the extension table and MIME types
//! - [`fault`]: panic containment

pub mod analyzer;
pub mod config;
pub mod document;
pub mod fault;
pub mod formats;

pub use analyzer::{Analyzer, analyze};
pub use config::{Options, ValidatedOptions};
pub use document::{Document, ReadSeek};
pub use formats::{FlowKind, Format};
