//! Application constants for the geographic-unit loader
//!
//! Validation bounds, table layout and configuration defaults used
//! throughout the crate.

// =============================================================================
// Validation Rules
// =============================================================================

/// Earliest accepted recording year (inclusive)
pub const MIN_YEAR_RECORDED: i32 = 2000;

/// Latest accepted recording year (inclusive)
pub const MAX_YEAR_RECORDED: i32 = 2024;

/// Number of fields on every input line
pub const RECORD_FIELD_COUNT: usize = 5;

/// Input field names in file order
pub const RECORD_FIELDS: [&str; RECORD_FIELD_COUNT] =
    ["anzsic06", "area", "year", "geoCount", "ecCount"];

// =============================================================================
// Output Table
// =============================================================================

/// Destination table for accepted records
pub const TABLE_NAME: &str = "geographic_units";

/// Parameterized insert for one accepted record
pub const INSERT_SQL: &str = "INSERT INTO geographic_units (anzsic06, Area, year, geo_count, ec_count) \
     VALUES (:anzsic06, :area, :year, :geo_count, :ec_count)";

// =============================================================================
// Defaults
// =============================================================================

/// Job name reported to listeners
pub const JOB_NAME: &str = "importGeographicalUnitJob";

/// Records per write transaction
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// Input field delimiter
pub const DEFAULT_DELIMITER: char = ',';

pub const DEFAULT_RECORDS_PATH: &str = "geographic-units.csv";
pub const DEFAULT_WORKBOOK_PATH: &str = "geographic-units-metadata.xlsx";
pub const DEFAULT_DATABASE_PATH: &str = "geographic_units.db";

pub const DEFAULT_ANZSIC06_SHEET: &str = "Anzsic06";
pub const DEFAULT_AREA_SHEET: &str = "Area";

/// Code column and first data row for both reference sheets (one header row)
pub const DEFAULT_CODE_COLUMN: u32 = 0;
pub const DEFAULT_CODE_START_ROW: u32 = 1;

/// Directory name under the user config dir holding `config.toml`
pub const CONFIG_DIR_NAME: &str = "geounit-etl";
pub const CONFIG_FILE_NAME: &str = "config.toml";
