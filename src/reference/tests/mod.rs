//! Shared test utilities and fixtures for reference code loading tests

use super::{CellValue, TabularSource};
use crate::config::{CodeColumn, ReferenceConfig};
use crate::error::{EtlError, Result};
use rust_xlsxwriter::Workbook;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};


/// In-memory sheets keyed by name, each a sparse grid of cells
#[derive(Debug, Default)]
pub struct InMemorySheets {
    sheets: BTreeMap<String, BTreeMap<(u32, u32), CellValue>>,
}

impl InMemorySheets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet with a single column of text values starting at row 0
    pub fn with_text_column(mut self, sheet: &str, column: u32, values: &[&str]) -> Self {
        let grid = self.sheets.entry(sheet.to_string()).or_default();
        for (row, value) in values.iter().enumerate() {
            grid.insert((row as u32, column), CellValue::Text(value.to_string()));
        }
        self
    }

    pub fn with_cell(mut self, sheet: &str, row: u32, column: u32, value: CellValue) -> Self {
        self.sheets
            .entry(sheet.to_string())
            .or_default()
            .insert((row, column), value);
        self
    }
}

impl TabularSource for InMemorySheets {
    fn column_cells(
        &mut self,
        sheet: &str,
        column: u32,
        start_row: u32,
    ) -> Result<Vec<(u32, CellValue)>> {
        let grid = self.sheets.get(sheet).ok_or_else(|| EtlError::SheetNotFound {
            path: PathBuf::from("memory"),
            sheet: sheet.to_string(),
        })?;

        let Some(last_row) = grid.keys().map(|(row, _)| *row).max() else {
            return Ok(Vec::new());
        };

        Ok((start_row..=last_row)
            .map(|row| {
                let value = grid.get(&(row, column)).cloned().unwrap_or(CellValue::Empty);
                (row, value)
            })
            .collect())
    }
}

/// Reference configuration pointing at `path` with the given sheet names,
/// codes in column 0 below one header row
pub fn create_test_reference_config(
    path: &Path,
    anzsic06_sheet: &str,
    area_sheet: &str,
) -> ReferenceConfig {
    ReferenceConfig {
        workbook_path: path.to_path_buf(),
        anzsic06: CodeColumn::new(anzsic06_sheet, 0, 1),
        area: CodeColumn::new(area_sheet, 0, 1),
    }
}

/// Write an xlsx workbook where each sheet is a list of `(row, column, value)` cells
pub fn write_test_workbook(
    dir: &Path,
    filename: &str,
    sheets: &[(&str, Vec<(u32, u16, CellValue)>)],
) -> PathBuf {
    let path = dir.join(filename);
    let mut workbook = Workbook::new();

    for (name, cells) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name).unwrap();
        for (row, column, value) in cells {
            match value {
                CellValue::Text(text) => {
                    worksheet.write_string(*row, *column, text.as_str()).unwrap();
                }
                CellValue::Number(number) => {
                    worksheet.write_number(*row, *column, *number).unwrap();
                }
                CellValue::Bool(flag) => {
                    worksheet.write_boolean(*row, *column, *flag).unwrap();
                }
                CellValue::Empty | CellValue::Other(_) => {}
            }
        }
    }

    workbook.save(&path).unwrap();
    path
}

/// Standard two-sheet reference workbook: header row, then codes
pub fn write_standard_workbook(dir: &Path) -> PathBuf {
    let text = |s: &str| CellValue::Text(s.to_string());
    write_test_workbook(
        dir,
        "metadata.xlsx",
        &[
            (
                "Anzsic06",
                vec![
                    (0, 0, text("anzsic06")),
                    (0, 1, text("description")),
                    (1, 0, text("A01")),
                    (1, 1, text("Agriculture")),
                    (2, 0, text("B06")),
                    (2, 1, text("Coal Mining")),
                    (3, 0, text("A01")),
                    (4, 0, text("C11")),
                ],
            ),
            (
                "Area",
                vec![
                    (0, 0, text("area")),
                    (1, 0, text("AREA1")),
                    (2, 0, text("AREA2")),
                ],
            ),
        ],
    )
}
