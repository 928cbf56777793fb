//! Spreadsheet-backed reference source
//!
//! Reads `.xlsx`, `.xlsm`, `.xls` and `.ods` workbooks through `calamine`.

use super::{CellValue, TabularSource};
use crate::error::{EtlError, Result};
use calamine::{Data, Reader, Sheets, open_workbook_auto};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;

/// An open reference workbook
pub struct SpreadsheetWorkbook {
    path: PathBuf,
    sheets: Sheets<BufReader<File>>,
}

impl SpreadsheetWorkbook {
    /// Open a workbook, detecting the format from the file extension
    pub fn open(path: &Path) -> Result<Self> {
        let sheets = open_workbook_auto(path).map_err(|source| EtlError::WorkbookOpen {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            "Opened workbook {} with sheets {:?}",
            path.display(),
            sheets.sheet_names()
        );

        Ok(Self {
            path: path.to_path_buf(),
            sheets,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.sheet_names()
    }
}

impl TabularSource for SpreadsheetWorkbook {
    fn column_cells(
        &mut self,
        sheet: &str,
        column: u32,
        start_row: u32,
    ) -> Result<Vec<(u32, CellValue)>> {
        if !self.sheets.sheet_names().iter().any(|name| name == sheet) {
            return Err(EtlError::SheetNotFound {
                path: self.path.clone(),
                sheet: sheet.to_string(),
            });
        }

        let range = self
            .sheets
            .worksheet_range(sheet)
            .map_err(|source| EtlError::SheetRead {
                path: self.path.clone(),
                sheet: sheet.to_string(),
                source,
            })?;

        // Positions are absolute; the used range may not start at A1.
        let Some((last_row, _)) = range.end() else {
            return Ok(Vec::new());
        };

        let cells = (start_row..=last_row)
            .map(|row| {
                let value = range
                    .get_value((row, column))
                    .map(cell_value)
                    .unwrap_or(CellValue::Empty);
                (row, value)
            })
            .collect();

        Ok(cells)
    }
}

fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(text) => CellValue::Text(text.clone()),
        Data::Float(number) => CellValue::Number(*number),
        Data::Int(number) => CellValue::Number(*number as f64),
        Data::Bool(flag) => CellValue::Bool(*flag),
        Data::DateTime(datetime) => CellValue::Other(format!("date {:?}", datetime)),
        Data::DateTimeIso(text) => CellValue::Other(format!("date {}", text)),
        Data::DurationIso(text) => CellValue::Other(format!("duration {}", text)),
        Data::Error(error) => CellValue::Other(format!("error {:?}", error)),
    }
}
