//! The input handle passed to the dispatcher.

use crate::Result;
use std::fmt;
use std::io::{Cursor, Read, Seek, SeekFrom};

/// A random-access byte source.
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek> ReadSeek for T {}

/// A document to analyse: a name used for routing, a declared length and a
/// byte source covering `[0, size)`.
///
/// The engine borrows the handle for one call and never keeps it.
pub struct Document<'a> {
    name: String,
    size: u64,
    source: Option<Box<dyn ReadSeek + 'a>>,
}

impl<'a> Document<'a> {
    pub fn new(name: impl Into<String>, size: u64, source: impl ReadSeek + 'a) -> Self {
        Self {
            name: name.into(),
            size,
            source: Some(Box::new(source)),
        }
    }

    /// A document over an in-memory buffer; `size` is the buffer length.
    pub fn from_bytes(name: impl Into<String>, bytes: &'a [u8]) -> Self {
        Self::new(name, bytes.len() as u64, Cursor::new(bytes))
    }

    /// A handle with no byte source. Analysing it yields `NoFile`.
    pub fn without_source(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: 0,
            source: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub(crate) fn has_source(&self) -> bool {
        self.source.is_some()
    }

    /// Read the declared range `[0, size)` into memory.
    ///
    /// A source shorter than `size` yields what it has.
    pub(crate) fn read_all(&mut self) -> Result<Vec<u8>> {
        let size = self.size;
        let Some(source) = self.source.as_mut() else {
            return Err(crate::DocsiftError::NoFile);
        };

        source.seek(SeekFrom::Start(0))?;
        let capacity = usize::try_from(size).unwrap_or(0).min(64 * 1024 * 1024);
        let mut buffer = Vec::with_capacity(capacity);
        source.take(size).read_to_end(&mut buffer)?;
        Ok(buffer)
    }
}

impl fmt::Debug for Document<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("has_source", &self.source.is_some())
            .finish()
    }
}
