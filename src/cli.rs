//! Command-line interface components.

use crate::config::EtlConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "geounit-etl")]
#[command(
    about = "Validate geographic-unit records against reference codes and load them into SQLite"
)]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Path to a TOML config file (defaults to <config dir>/geounit-etl/config.toml if present)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Delimited records file to load
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Reference workbook holding the anzsic06 and area code sheets
    #[arg(short, long, value_name = "PATH")]
    pub reference: Option<PathBuf>,

    /// SQLite database containing the geographic_units table
    #[arg(short, long, value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// Accepted records per write transaction
    #[arg(long, value_name = "N")]
    pub chunk_size: Option<usize>,

    /// Leading lines of the records file to skip (header rows)
    #[arg(long, value_name = "N")]
    pub skip_lines: Option<usize>,

    /// Summary output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Show a progress spinner while loading
    #[arg(long)]
    pub progress: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// How the final summary is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl Args {
    /// Log level implied by the verbosity flags
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }

    /// Apply command-line overrides on top of file/default configuration
    pub fn apply_overrides(&self, config: &mut EtlConfig) {
        if let Some(path) = &self.input {
            config.input.records_path = path.clone();
        }
        if let Some(path) = &self.reference {
            config.reference.workbook_path = path.clone();
        }
        if let Some(path) = &self.database {
            config.output.database_path = path.clone();
        }
        if let Some(chunk_size) = self.chunk_size {
            config.chunk_size = chunk_size;
        }
        if let Some(skip_lines) = self.skip_lines {
            config.input.skip_lines = skip_lines;
        }
    }
}
