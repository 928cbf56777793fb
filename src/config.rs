//! Configuration management and validation.
//!
//! Provides the configuration structures for a load run: where the records,
//! the reference workbook and the database live, which sheet/column/row each
//! reference code set comes from, and the chunk size used for writing.

use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_ANZSIC06_SHEET, DEFAULT_AREA_SHEET,
    DEFAULT_CHUNK_SIZE, DEFAULT_CODE_COLUMN, DEFAULT_CODE_START_ROW, DEFAULT_DATABASE_PATH,
    DEFAULT_DELIMITER, DEFAULT_RECORDS_PATH, DEFAULT_WORKBOOK_PATH,
};
use crate::error::{EtlError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Location of one reference code column inside the workbook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeColumn {
    /// Sheet name
    pub sheet: String,

    /// Zero-based column index
    #[serde(default)]
    pub column: u32,

    /// Zero-based first row to read (rows above are headers)
    #[serde(default)]
    pub start_row: u32,
}

impl CodeColumn {
    pub fn new(sheet: impl Into<String>, column: u32, start_row: u32) -> Self {
        Self {
            sheet: sheet.into(),
            column,
            start_row,
        }
    }
}

/// Delimited record input
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Path to the delimited records file
    pub records_path: PathBuf,

    /// Field delimiter
    pub delimiter: char,

    /// Leading lines to skip (header rows)
    pub skip_lines: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            records_path: PathBuf::from(DEFAULT_RECORDS_PATH),
            delimiter: DEFAULT_DELIMITER,
            skip_lines: 0,
        }
    }
}

/// Reference workbook and the two code columns read from it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceConfig {
    /// Path to the reference workbook
    pub workbook_path: PathBuf,

    /// ANZSIC06 industry code column
    pub anzsic06: CodeColumn,

    /// Area code column
    pub area: CodeColumn,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            workbook_path: PathBuf::from(DEFAULT_WORKBOOK_PATH),
            anzsic06: CodeColumn::new(
                DEFAULT_ANZSIC06_SHEET,
                DEFAULT_CODE_COLUMN,
                DEFAULT_CODE_START_ROW,
            ),
            area: CodeColumn::new(DEFAULT_AREA_SHEET, DEFAULT_CODE_COLUMN, DEFAULT_CODE_START_ROW),
        }
    }
}

/// Output database
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the SQLite database holding `geographic_units`
    pub database_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
        }
    }
}

/// Configuration for one load run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EtlConfig {
    /// Accepted records per write transaction
    pub chunk_size: usize,

    pub input: InputConfig,

    pub reference: ReferenceConfig,

    pub output: OutputConfig,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            input: InputConfig::default(),
            reference: ReferenceConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl EtlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text)
            .map_err(|e| EtlError::configuration(format!("Invalid configuration: {}", e)))
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            EtlError::configuration(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        debug!("Read config file {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Default config file location (`<config dir>/geounit-etl/config.toml`)
    pub fn default_config_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or_else(|| EtlError::configuration("Could not determine user config directory"))
    }

    /// Load from an explicit path, else the default location if it exists,
    /// else defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match Self::default_config_path() {
            Ok(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Check values that downstream components cannot recover from
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(EtlError::configuration("chunk_size must be at least 1"));
        }

        for (name, column) in [
            ("anzsic06", &self.reference.anzsic06),
            ("area", &self.reference.area),
        ] {
            if column.sheet.trim().is_empty() {
                return Err(EtlError::configuration(format!(
                    "reference.{}.sheet must not be empty",
                    name
                )));
            }
        }

        Ok(())
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_records_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.input.records_path = path.into();
        self
    }

    pub fn with_skip_lines(mut self, skip_lines: usize) -> Self {
        self.input.skip_lines = skip_lines;
        self
    }

    pub fn with_workbook_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.reference.workbook_path = path.into();
        self
    }

    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output.database_path = path.into();
        self
    }
}
