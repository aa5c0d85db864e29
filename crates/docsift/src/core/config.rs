//! Extraction policy configuration.
//!
//! [`Options`] is the user-facing surface: every field is optional in config files
//! and signed, so out-of-range input can be expressed and then normalised.
//! [`Options::validate`] is total: it never fails, it coerces each bad field to a
//! safe value and returns [`ValidatedOptions`], whose fields are directly usable
//! as loop bounds.
//!
//! Configuration can be loaded from TOML, YAML or JSON, or discovered as
//! `docsift.toml` in the current directory or any parent.

use crate::{DocsiftError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_MAX_IMAGE_COUNT: usize = 10;
pub const DEFAULT_IMAGE_MIN_SIZE: usize = 32 * 1024;
pub const DEFAULT_READ_TEXT_WITH_IMAGE_PROPORTION: f64 = 0.7;
pub const DEFAULT_SKIP_PDF_WITH_NUM_PAGES: usize = 1 << 16;
pub const DEFAULT_EXCEL_MAX_ROW: usize = 1000;
pub const DEFAULT_EXCEL_MAX_CELL_IN_ROW: usize = 1000;
pub const DEFAULT_EXCEL_MAX_SHEET: usize = 20;

/// Name of the file searched by [`Options::discover`].
pub const CONFIG_FILE_NAME: &str = "docsift.toml";

/// Extraction policy as supplied by a caller or a config file.
///
/// # Example
///
/// ```rust
/// use docsift::Options;
///
/// let options = Options {
///     max_image_count: 3,
///     image_min_size: -5,
///     ..Options::default()
/// };
/// let validated = options.validate();
/// assert_eq!(validated.max_image_count, 3);
/// assert_eq!(validated.image_min_size, 32 * 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Hard ceiling on returned images.
    pub max_image_count: i64,

    /// Images smaller than this many bytes are dropped.
    pub image_min_size: i64,

    /// When the share of pages carrying a kept image exceeds this ratio, PDF
    /// text extraction is abandoned.
    pub read_text_with_image_proportion: f64,

    /// PDFs with at most this many pages are rejected; this many leading pages
    /// are never scanned.
    pub skip_pdf_with_num_pages: i64,

    pub excel_max_row: i64,
    pub excel_max_cell_in_row: i64,
    pub excel_max_sheet: i64,
}

impl Default for Options {
    fn default() -> Self {
        let defaults = ValidatedOptions::default();
        Self {
            max_image_count: defaults.max_image_count as i64,
            image_min_size: defaults.image_min_size as i64,
            read_text_with_image_proportion: defaults.read_text_with_image_proportion,
            skip_pdf_with_num_pages: defaults.skip_pdf_with_num_pages as i64,
            excel_max_row: defaults.excel_max_row as i64,
            excel_max_cell_in_row: defaults.excel_max_cell_in_row as i64,
            excel_max_sheet: defaults.excel_max_sheet as i64,
        }
    }
}

/// Options after normalisation.
///
/// Constructed only through [`Options::validate`] or [`Default`]; never mutated
/// by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValidatedOptions {
    pub max_image_count: usize,
    pub image_min_size: usize,
    pub read_text_with_image_proportion: f64,
    pub skip_pdf_with_num_pages: usize,
    pub excel_max_row: usize,
    pub excel_max_cell_in_row: usize,
    pub excel_max_sheet: usize,
}

impl Default for ValidatedOptions {
    fn default() -> Self {
        Self {
            max_image_count: DEFAULT_MAX_IMAGE_COUNT,
            image_min_size: DEFAULT_IMAGE_MIN_SIZE,
            read_text_with_image_proportion: DEFAULT_READ_TEXT_WITH_IMAGE_PROPORTION,
            skip_pdf_with_num_pages: DEFAULT_SKIP_PDF_WITH_NUM_PAGES,
            excel_max_row: DEFAULT_EXCEL_MAX_ROW,
            excel_max_cell_in_row: DEFAULT_EXCEL_MAX_CELL_IN_ROW,
            excel_max_sheet: DEFAULT_EXCEL_MAX_SHEET,
        }
    }
}

/// Zero is a legal value (e.g. "return no images").
fn non_negative(value: i64, default: usize) -> usize {
    usize::try_from(value).unwrap_or(default)
}

fn positive(value: i64, default: usize) -> usize {
    if value <= 0 { default } else { non_negative(value, default) }
}

fn ratio(value: f64) -> f64 {
    if !value.is_finite() {
        DEFAULT_READ_TEXT_WITH_IMAGE_PROPORTION
    } else if value < 0.0 {
        0.0
    } else {
        value
    }
}

impl Options {
    /// Normalise every field into its safe domain. Never fails.
    pub fn validate(&self) -> ValidatedOptions {
        ValidatedOptions {
            max_image_count: non_negative(self.max_image_count, DEFAULT_MAX_IMAGE_COUNT),
            image_min_size: positive(self.image_min_size, DEFAULT_IMAGE_MIN_SIZE),
            read_text_with_image_proportion: ratio(self.read_text_with_image_proportion),
            skip_pdf_with_num_pages: non_negative(self.skip_pdf_with_num_pages, DEFAULT_SKIP_PDF_WITH_NUM_PAGES),
            excel_max_row: positive(self.excel_max_row, DEFAULT_EXCEL_MAX_ROW),
            excel_max_cell_in_row: positive(self.excel_max_cell_in_row, DEFAULT_EXCEL_MAX_CELL_IN_ROW),
            excel_max_sheet: positive(self.excel_max_sheet, DEFAULT_EXCEL_MAX_SHEET),
        }
    }

    /// Load options from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `DocsiftError::Config` if the file can't be read or is invalid TOML.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;

        toml::from_str(&content).map_err(|e| {
            DocsiftError::config_with_source(format!("Invalid TOML in {}", path.as_ref().display()), e)
        })
    }

    /// Load options from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;

        serde_yaml_ng::from_str(&content).map_err(|e| {
            DocsiftError::config_with_source(format!("Invalid YAML in {}", path.as_ref().display()), e)
        })
    }

    /// Load options from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;

        serde_json::from_str(&content).map_err(|e| {
            DocsiftError::config_with_source(format!("Invalid JSON in {}", path.as_ref().display()), e)
        })
    }

    /// Load options from a file, picking the parser from its extension
    /// (`.toml`, `.yaml`/`.yml`, `.json`).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(DocsiftError::config(format!(
                "Unknown config format for {} (expected .toml, .yaml or .json)",
                path.display()
            ))),
        }
    }

    /// Discover `docsift.toml` in the current directory or its parents.
    ///
    /// # Returns
    ///
    /// - `Some(options)` if found
    /// - `None` if no config file exists up to the filesystem root
    pub fn discover() -> Result<Option<Self>> {
        let mut current = std::env::current_dir().map_err(DocsiftError::Io)?;

        loop {
            let candidate = current.join(CONFIG_FILE_NAME);
            if candidate.exists() {
                return Ok(Some(Self::from_toml_file(candidate)?));
            }

            if let Some(parent) = current.parent() {
                current = parent.to_path_buf();
            } else {
                break;
            }
        }

        Ok(None)
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| DocsiftError::config_with_source(format!("Failed to read config file {}", path.display()), e))
}
