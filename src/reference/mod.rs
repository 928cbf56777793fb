//! Reference code sets used for membership validation
//!
//! Two sets of valid codes (ANZSIC06 industry codes and area codes) are read
//! from a reference workbook once at startup and held read-only for the run.
//!
//! # Architecture
//!
//! - [`TabularSource`] - anything that can hand back the cells of one sheet column
//! - [`extract_code_set`] - column-to-set extraction over any `TabularSource`
//! - [`workbook`] - the `calamine`-backed implementation for spreadsheet files
//! - [`ReferenceCodes`] - the pair of loaded sets
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use geounit_etl::config::ReferenceConfig;
//! use geounit_etl::reference::ReferenceCodes;
//!
//! # fn example() -> geounit_etl::Result<()> {
//! let codes = ReferenceCodes::load(&ReferenceConfig::default())?;
//! println!("{} industry codes, {} areas", codes.anzsic06.len(), codes.area.len());
//! # Ok(())
//! # }
//! ```

pub mod workbook;

#[cfg(test)]
pub mod tests;

pub use workbook::SpreadsheetWorkbook;

use crate::config::{CodeColumn, ReferenceConfig};
use crate::error::{EtlError, Result};
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info};

/// Typed content of one sheet cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Any other typed cell (dates, formula errors, ...), described for error messages
    Other(String),
}

impl CellValue {
    /// Short type name used in error messages
    pub fn type_name(&self) -> String {
        match self {
            CellValue::Empty => "empty cell".to_string(),
            CellValue::Text(_) => "string".to_string(),
            CellValue::Number(n) => format!("number {}", n),
            CellValue::Bool(b) => format!("boolean {}", b),
            CellValue::Other(kind) => kind.clone(),
        }
    }
}

/// Source of tabular reference data
pub trait TabularSource {
    /// Cells of `column` for every row from `start_row` to the last populated
    /// row of `sheet`, as `(row, value)` pairs in row order. Absent cells are
    /// reported as [`CellValue::Empty`] or omitted.
    fn column_cells(
        &mut self,
        sheet: &str,
        column: u32,
        start_row: u32,
    ) -> Result<Vec<(u32, CellValue)>>;
}

/// Extract the distinct non-empty strings of one column
///
/// # Errors
/// * Whatever the source returns for an unreachable workbook or missing sheet
/// * `EtlError::NonStringCell` for a number, boolean or other non-string cell in range
pub fn extract_code_set<S: TabularSource + ?Sized>(
    source: &mut S,
    column: &CodeColumn,
) -> Result<HashSet<String>> {
    let cells = source.column_cells(&column.sheet, column.column, column.start_row)?;
    let mut codes = HashSet::with_capacity(cells.len());

    for (row, value) in cells {
        match value {
            CellValue::Text(text) if !text.is_empty() => {
                codes.insert(text);
            }
            CellValue::Text(_) | CellValue::Empty => {}
            other => {
                return Err(EtlError::NonStringCell {
                    sheet: column.sheet.clone(),
                    row,
                    column: column.column,
                    found: other.type_name(),
                });
            }
        }
    }

    debug!(
        "Extracted {} codes from sheet '{}' column {} starting row {}",
        codes.len(),
        column.sheet,
        column.column,
        column.start_row
    );
    Ok(codes)
}

/// The two reference code sets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceCodes {
    pub anzsic06: HashSet<String>,
    pub area: HashSet<String>,
}

impl ReferenceCodes {
    pub fn new(anzsic06: HashSet<String>, area: HashSet<String>) -> Self {
        Self { anzsic06, area }
    }

    /// Open the configured workbook and load both code sets
    pub fn load(config: &ReferenceConfig) -> Result<Self> {
        info!(
            "Loading reference codes from workbook: {}",
            config.workbook_path.display()
        );
        let start_time = Instant::now();

        let mut workbook = SpreadsheetWorkbook::open(&config.workbook_path)?;
        let codes = Self::from_source(&mut workbook, config)?;

        info!(
            "Reference codes loaded: {} anzsic06 codes from '{}', {} area codes from '{}' in {:.2}s",
            codes.anzsic06.len(),
            config.anzsic06.sheet,
            codes.area.len(),
            config.area.sheet,
            start_time.elapsed().as_secs_f64()
        );
        Ok(codes)
    }

    /// Load both code sets from an already opened source
    pub fn from_source<S: TabularSource + ?Sized>(
        source: &mut S,
        config: &ReferenceConfig,
    ) -> Result<Self> {
        let anzsic06 = extract_code_set(source, &config.anzsic06)?;
        let area = extract_code_set(source, &config.area)?;
        Ok(Self { anzsic06, area })
    }
}
