//! Error handling for geographic-unit loading operations.
//!
//! Provides error types with context for reference workbook loading,
//! record reading, configuration and chunk writing failures.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Failed to open reference workbook {path}: {source}")]
    WorkbookOpen {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("Sheet '{sheet}' not found in reference workbook {path}")]
    SheetNotFound { path: PathBuf, sheet: String },

    #[error("Failed to read sheet '{sheet}' from reference workbook {path}: {source}")]
    SheetRead {
        path: PathBuf,
        sheet: String,
        #[source]
        source: calamine::Error,
    },

    #[error("Non-string cell in sheet '{sheet}' at row {row}, column {column}: found {found}")]
    NonStringCell {
        sheet: String,
        row: u32,
        column: u32,
        found: String,
    },

    #[error("Failed to open record source {path}: {source}")]
    SourceOpen {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to read record source at line {line}: {source}")]
    SourceRead {
        line: u64,
        #[source]
        source: csv::Error,
    },

    #[error("Malformed record at line {line}: {reason}")]
    RecordParse { line: u64, reason: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Failed to write chunk #{chunk_number} ({records} records): {source}")]
    ChunkWrite {
        /// 1-based position of the chunk in the run
        chunk_number: usize,
        records: usize,
        #[source]
        source: Box<EtlError>,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EtlError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a record parse error for a single input line
    pub fn record_parse(line: u64, reason: impl Into<String>) -> Self {
        Self::RecordParse {
            line,
            reason: reason.into(),
        }
    }

    /// Wrap a sink failure with the chunk it happened in
    pub fn chunk_write(chunk_number: usize, records: usize, source: EtlError) -> Self {
        Self::ChunkWrite {
            chunk_number,
            records,
            source: Box::new(source),
        }
    }

    /// Errors raised while loading reference code sets. These stop the job
    /// before the pipeline starts.
    pub fn is_reference_load_error(&self) -> bool {
        matches!(
            self,
            Self::WorkbookOpen { .. }
                | Self::SheetNotFound { .. }
                | Self::SheetRead { .. }
                | Self::NonStringCell { .. }
        )
    }

    /// Reference errors caused by cell contents rather than by reaching the
    /// workbook.
    pub fn is_data_format_error(&self) -> bool {
        matches!(self, Self::NonStringCell { .. })
    }

    /// Errors confined to a single record. The pipeline drops the record and
    /// carries on.
    pub fn is_record_level(&self) -> bool {
        matches!(self, Self::RecordParse { .. })
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
