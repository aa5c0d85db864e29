//! Spreadsheet adapter for `.xls` and `.xlsx`, built on `calamine`.
//!
//! Only textual cells contribute to the output: shared/inline strings and the
//! ISO date-time and duration forms. Numbers, booleans and error cells are
//! skipped. Three bounds apply independently: sheets per workbook, rows per
//! sheet and cells per row.
//!
//! Legacy `.xls` output also carries each scanned sheet's name ahead of its
//! cells. `.xlsx` output holds cell text only.

use calamine::{Data, Range, Reader};
use std::io::Cursor;

use crate::core::config::ValidatedOptions;
use crate::error::Result;
use crate::extraction::package::{ImageBudget, OoxmlPackage, path_extension};
use crate::types::Extraction;

/// Media entries copied out of an `.xlsx` archive.
const XLSX_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Whether a sheet's name is written before its cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SheetNames {
    Include,
    Omit,
}

/// Sheet, row and cell ceilings for one workbook.
#[derive(Debug, Clone, Copy)]
struct SheetBounds {
    max_sheets: usize,
    max_rows: usize,
    max_cells: usize,
}

impl From<&ValidatedOptions> for SheetBounds {
    fn from(options: &ValidatedOptions) -> Self {
        Self {
            max_sheets: options.excel_max_sheet,
            max_rows: options.excel_max_row,
            max_cells: options.excel_max_cell_in_row,
        }
    }
}

pub fn extract_xls(bytes: &[u8], options: &ValidatedOptions) -> Result<Extraction> {
    let workbook = calamine::Xls::new(Cursor::new(bytes)).map_err(calamine::Error::Xls)?;
    let text = collect_text(workbook, SheetBounds::from(options), SheetNames::Include);
    Ok(Extraction::text_only(text))
}

pub fn extract_xlsx(bytes: &[u8], options: &ValidatedOptions) -> Result<Extraction> {
    let workbook = calamine::Xlsx::new(Cursor::new(bytes)).map_err(calamine::Error::Xlsx)?;
    let text = collect_text(workbook, SheetBounds::from(options), SheetNames::Omit);

    let mut package = OoxmlPackage::open(bytes, "read xlsx")?;
    let mut budget = ImageBudget::new(options.max_image_count, options.image_min_size);
    for name in package.entry_names() {
        if budget.is_full() {
            break;
        }
        let is_image = path_extension(&name).is_some_and(|ext| XLSX_IMAGE_EXTENSIONS.contains(&ext.as_str()));
        if is_image {
            budget.offer(&mut package, &name);
        }
    }

    Ok(Extraction::new(budget.into_images(), text))
}

fn collect_text<RS, R>(mut workbook: R, bounds: SheetBounds, names: SheetNames) -> String
where
    RS: std::io::Read + std::io::Seek,
    R: Reader<RS>,
{
    let sheet_names = workbook.sheet_names();
    let mut text = String::new();

    for name in sheet_names.iter().take(bounds.max_sheets) {
        if names == SheetNames::Include {
            text.push_str(name);
        }
        match workbook.worksheet_range(name) {
            Ok(range) => append_sheet_text(&mut text, &range, bounds),
            Err(e) => tracing::debug!("Skipping unreadable sheet {}: {:?}", name, e),
        }
    }

    tracing::debug!(
        "Spreadsheet extraction: {} of {} sheets read, {} text bytes",
        sheet_names.len().min(bounds.max_sheets),
        sheet_names.len(),
        text.len()
    );

    text
}

#[inline]
fn append_sheet_text(buffer: &mut String, range: &Range<Data>, bounds: SheetBounds) {
    for row in range.rows().take(bounds.max_rows) {
        for cell in row.iter().take(bounds.max_cells) {
            if let Some(value) = cell_text(cell) {
                buffer.push_str(value);
            }
        }
    }
}

#[inline]
fn cell_text(data: &Data) -> Option<&str> {
    match data {
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) if !s.is_empty() => Some(s.as_str()),
        _ => None,
    }
}
