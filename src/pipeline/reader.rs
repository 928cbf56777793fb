//! Delimited record source
//!
//! Yields one [`GeographicUnit`] per input line, fields in the fixed order
//! `anzsic06, area, year, geoCount, ecCount`. Lines that cannot be split into
//! exactly those five fields come back as `EtlError::RecordParse` so the
//! pipeline can drop them and carry on; failures of the underlying reader are
//! `EtlError::SourceRead` and end the run.

use crate::config::InputConfig;
use crate::constants::{RECORD_FIELD_COUNT, RECORD_FIELDS};
use crate::error::{EtlError, Result};
use crate::models::GeographicUnit;
use csv::{ErrorKind, StringRecord};
use std::fs::File;
use std::io::Read;
use tracing::{debug, info};

/// Iterator over the records of a delimited text stream
pub struct CsvRecordSource<R: Read> {
    reader: csv::Reader<R>,
    record: StringRecord,
    skip_lines: usize,
    skipped: usize,
}

impl CsvRecordSource<File> {
    /// Open the configured records file
    pub fn open(config: &InputConfig) -> Result<Self> {
        info!("Reading records from {}", config.records_path.display());

        let delimiter = delimiter_byte(config.delimiter)?;
        let reader = reader_builder(delimiter)
            .from_path(&config.records_path)
            .map_err(|source| EtlError::SourceOpen {
                path: config.records_path.clone(),
                source,
            })?;

        Ok(Self::with_reader(reader, config.skip_lines))
    }
}

impl<R: Read> CsvRecordSource<R> {
    /// Read records from any byte stream
    pub fn from_reader(input: R, delimiter: char, skip_lines: usize) -> Result<Self> {
        let delimiter = delimiter_byte(delimiter)?;
        Ok(Self::with_reader(
            reader_builder(delimiter).from_reader(input),
            skip_lines,
        ))
    }

    fn with_reader(reader: csv::Reader<R>, skip_lines: usize) -> Self {
        Self {
            reader,
            record: StringRecord::new(),
            skip_lines,
            skipped: 0,
        }
    }

    fn skipping(&mut self, line: u64) -> bool {
        if self.skipped < self.skip_lines {
            self.skipped += 1;
            debug!("Skipping leading line {}", line);
            true
        } else {
            false
        }
    }
}

impl<R: Read> Iterator for CsvRecordSource<R> {
    type Item = Result<GeographicUnit>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.reader.read_record(&mut self.record) {
                Ok(false) => return None,
                Ok(true) => {
                    let line = self.record.position().map_or(0, |pos| pos.line());
                    if self.skipping(line) {
                        continue;
                    }
                    return Some(unit_from_record(&self.record, line));
                }
                Err(error) => {
                    let line = error.position().map_or(0, |pos| pos.line());
                    let record_level = matches!(
                        error.kind(),
                        ErrorKind::Utf8 { .. } | ErrorKind::UnequalLengths { .. }
                    );

                    if !record_level {
                        return Some(Err(EtlError::SourceRead {
                            line,
                            source: error,
                        }));
                    }
                    if self.skipping(line) {
                        continue;
                    }
                    return Some(Err(EtlError::record_parse(line, error.to_string())));
                }
            }
        }
    }
}

fn reader_builder(delimiter: u8) -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter);
    builder
}

fn delimiter_byte(delimiter: char) -> Result<u8> {
    if delimiter.is_ascii() {
        Ok(delimiter as u8)
    } else {
        Err(EtlError::configuration(format!(
            "Delimiter must be a single ASCII character, got '{}'",
            delimiter
        )))
    }
}

fn unit_from_record(record: &StringRecord, line: u64) -> Result<GeographicUnit> {
    if record.len() != RECORD_FIELD_COUNT {
        return Err(EtlError::record_parse(
            line,
            format!(
                "expected {} fields ({}), found {}",
                RECORD_FIELD_COUNT,
                RECORD_FIELDS.join(", "),
                record.len()
            ),
        ));
    }

    Ok(GeographicUnit::new(
        &record[0],
        &record[1],
        &record[2],
        &record[3],
        &record[4],
    ))
}
