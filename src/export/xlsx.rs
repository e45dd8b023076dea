use atomic_write_file::AtomicWriteFile;
use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::engine::{Cell, ExportTable, EXPORT_COLUMNS};
use crate::error::ConsoleError;

pub const SHEET_NAME: &str = "Results";

/// `Results_<category>_<event>_<YYYY-MM-DD>.xlsx`, with characters that
/// cannot appear in a file name replaced by `_`
pub fn export_filename(category_name: &str, event_name: &str, date: NaiveDate) -> String {
    format!(
        "Results_{}_{}_{}.xlsx",
        sanitize(category_name),
        sanitize(event_name),
        date.format("%Y-%m-%d")
    )
}

fn sanitize(part: &str) -> String {
    part.trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

fn build_workbook(table: &ExportTable) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, label) in EXPORT_COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *label, &header)?;
        sheet.set_column_width(col as u16, (label.len() + 4) as f64)?;
    }

    for (i, row) in table.rows.iter().enumerate() {
        let r = (i + 1) as u32;
        for (col, cell) in row.cells().into_iter().enumerate() {
            match cell {
                Cell::Text(text) => sheet.write_string(r, col as u16, text)?,
                Cell::Number(n) => sheet.write_number(r, col as u16, n)?,
            };
        }
    }

    workbook.save_to_buffer()
}

/// Write the table as a one-sheet workbook at `path`.
///
/// The file is replaced atomically, so an interrupted export never leaves a
/// truncated workbook behind.
pub fn write_workbook(table: &ExportTable, path: &Path) -> Result<PathBuf, ConsoleError> {
    let bytes = build_workbook(table).map_err(|e| ConsoleError::Export(e.to_string()))?;

    let mut file = AtomicWriteFile::open(path).map_err(|e| {
        ConsoleError::Export(format!("cannot open {}: {}", path.display(), e))
    })?;
    file.write_all(&bytes)
        .map_err(|e| ConsoleError::Export(format!("cannot write {}: {}", path.display(), e)))?;
    file.commit()
        .map_err(|e| ConsoleError::Export(format!("cannot write {}: {}", path.display(), e)))?;

    info!(path = %path.display(), rows = table.rows.len(), "exported results workbook");
    Ok(path.to_path_buf())
}
