//! Geographic Unit Loader Library
//!
//! A Rust library for loading geographic-unit records from delimited text
//! into a relational table, keeping only records that pass validation
//! against reference code sets.
//!
//! This library provides tools for:
//! - Loading ANZSIC06 and area reference codes from a spreadsheet workbook
//! - Reading five-field geographic-unit records from delimited files
//! - Validating records against code membership, year range and count rules
//! - Writing accepted records to SQLite in transactional chunks
//! - Reporting run state and read/write/filter counts to job listeners

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod reference;

// Re-export commonly used types
pub use config::EtlConfig;
pub use error::{EtlError, Result};
pub use models::{GeographicUnit, JobExecution, PipelineState, StepStats, ValidatedUnit};
pub use pipeline::{Pipeline, RecordValidator};
pub use reference::ReferenceCodes;
