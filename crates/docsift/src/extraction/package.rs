//! Shared access to Office Open XML packages (zip archives).
//!
//! The DOCX, PPTX and XLSX adapters all read parts, relationships and media
//! entries through [`OoxmlPackage`], and all filter media through
//! [`ImageBudget`].

use crate::error::{DocsiftError, Result};
use crate::types::Image;
use roxmltree::Document;
use std::io::{Cursor, Read};
use zip::ZipArchive;

/// A relationship pointing at an image part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImageRelationship {
    pub id: String,
    pub target: String,
}

/// Size and kind of one archive entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EntryStat {
    pub size: u64,
    pub is_dir: bool,
}

pub(crate) struct OoxmlPackage<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
}

impl<'a> OoxmlPackage<'a> {
    pub fn open(bytes: &'a [u8], operation: &'static str) -> Result<Self> {
        let archive = match ZipArchive::new(Cursor::new(bytes)) {
            Ok(archive) => archive,
            Err(zip::result::ZipError::Io(io_err)) => return Err(io_err.into()),
            Err(e) => {
                return Err(DocsiftError::backend_with_source(
                    operation,
                    format!("invalid package: {}", e),
                    e,
                ));
            }
        };
        Ok(Self { archive })
    }

    /// Entry names in archive order.
    pub fn entry_names(&self) -> Vec<String> {
        self.archive.file_names().map(str::to_string).collect()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.archive.index_for_name(path).is_some()
    }

    pub fn read(&mut self, path: &str) -> Result<Vec<u8>> {
        let mut file = self.archive.by_name(path)?;
        let mut contents = Vec::with_capacity(file.size().min(16 * 1024 * 1024) as usize);
        // IO errors bubble up unchanged
        file.read_to_end(&mut contents)?;
        Ok(contents)
    }

    pub fn read_string(&mut self, path: &str) -> Result<String> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes)
            .map_err(|e| DocsiftError::backend_with_source("read package", format!("{} is not UTF-8", path), e))
    }

    /// Stored (uncompressed) size of an entry, without reading it.
    pub fn stat(&mut self, path: &str) -> Result<EntryStat> {
        let file = self.archive.by_name(path)?;
        Ok(EntryStat {
            size: file.size(),
            is_dir: file.is_dir(),
        })
    }

    /// Image relationships declared in a `.rels` part, in document order.
    /// A missing part yields no relationships.
    pub fn image_relationships(&mut self, rels_path: &str) -> Result<Vec<ImageRelationship>> {
        if !self.contains(rels_path) {
            return Ok(Vec::new());
        }
        let xml = self.read_string(rels_path)?;
        parse_image_relationships(&xml)
    }
}

pub(crate) fn parse_xml<'x>(xml: &'x str, part: &str) -> Result<Document<'x>> {
    Document::parse(xml)
        .map_err(|e| DocsiftError::backend_with_source("parse xml", format!("failed to parse {}", part), e))
}

pub(crate) fn parse_image_relationships(xml: &str) -> Result<Vec<ImageRelationship>> {
    let doc = parse_xml(xml, "relationships")?;

    let mut images = Vec::new();
    for node in doc.descendants() {
        if node.has_tag_name("Relationship")
            && let Some(rel_type) = node.attribute("Type")
            && rel_type.ends_with("/image")
            && node.attribute("TargetMode") != Some("External")
            && let (Some(id), Some(target)) = (node.attribute("Id"), node.attribute("Target"))
        {
            images.push(ImageRelationship {
                id: id.to_string(),
                target: target.to_string(),
            });
        }
    }

    Ok(images)
}

/// `.rels` part for a package part: `ppt/slides/slide1.xml` -> `ppt/slides/_rels/slide1.xml.rels`.
pub(crate) fn rels_path_for(part_path: &str) -> String {
    match part_path.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part_path),
    }
}

/// Resolve a relationship target against the directory of its source part.
///
/// Handles `../` segments and absolute (`/word/media/x.png`) targets.
pub(crate) fn resolve_target(part_path: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = match part_path.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };

    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    segments.join("/")
}

/// Lower-cased extension of a package path, without the dot.
pub(crate) fn path_extension(path: &str) -> Option<String> {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// Sniff an image format from its leading bytes.
pub(crate) fn detect_image_format(data: &[u8]) -> String {
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "jpeg".to_string()
    } else if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        "png".to_string()
    } else if data.starts_with(b"GIF") {
        "gif".to_string()
    } else if data.starts_with(b"BM") {
        "bmp".to_string()
    } else if data.starts_with(b"<svg") || data.starts_with(b"<?xml") {
        "svg".to_string()
    } else if data.starts_with(b"II\x2A\x00") || data.starts_with(b"MM\x00\x2A") {
        "tiff".to_string()
    } else {
        "unknown".to_string()
    }
}

/// Count and size filter applied to embedded images.
///
/// An image is kept while fewer than `max_count` images have been kept and its
/// stored size is at least `min_size` bytes.
#[derive(Debug)]
pub(crate) struct ImageBudget {
    max_count: usize,
    min_size: usize,
    kept: Vec<Image>,
}

impl ImageBudget {
    pub fn new(max_count: usize, min_size: usize) -> Self {
        Self {
            max_count,
            min_size,
            kept: Vec::new(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.kept.len() >= self.max_count
    }

    /// Stat, filter and read one media entry. Entries that cannot be stat'ed
    /// or read, directories, and undersized entries are skipped silently.
    pub fn offer(&mut self, package: &mut OoxmlPackage<'_>, path: &str) {
        if self.is_full() {
            return;
        }

        let stat = match package.stat(path) {
            Ok(stat) => stat,
            Err(e) => {
                tracing::debug!("Skipping unreadable media entry {}: {}", path, e);
                return;
            }
        };
        if stat.is_dir || stat.size < self.min_size as u64 {
            tracing::trace!("Skipping media entry {} ({} bytes)", path, stat.size);
            return;
        }

        let body = match package.read(path) {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!("Failed to read media entry {}: {}", path, e);
                return;
            }
        };

        let format = path_extension(path).unwrap_or_else(|| detect_image_format(&body));
        self.kept.push(Image::new(path, format, body));
    }

    pub fn into_images(self) -> Vec<Image> {
        self.kept
    }
}
