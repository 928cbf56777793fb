//! Transactional chunk writers
//!
//! A [`RecordSink`] persists one chunk per call, all or nothing. The SQLite
//! implementation wraps each chunk in a transaction over the existing
//! `geographic_units` table.

use crate::constants::{INSERT_SQL, TABLE_NAME};
use crate::error::{EtlError, Result};
use crate::models::ValidatedUnit;
use rusqlite::{Connection, OptionalExtension, named_params};
use std::path::Path;
use tracing::{debug, info};

/// Destination for accepted records
pub trait RecordSink {
    /// Persist every record of `chunk` in one transaction. On error none of
    /// the chunk's records are visible.
    fn write_chunk(&mut self, chunk: &[ValidatedUnit]) -> Result<()>;
}

/// Writes chunks into the `geographic_units` table of a SQLite database
#[derive(Debug)]
pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    /// Open the database; the destination table must already exist
    pub fn open(path: &Path) -> Result<Self> {
        info!("Opening output database {}", path.display());
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        let table: Option<String> = conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [TABLE_NAME],
                |row| row.get(0),
            )
            .optional()?;

        if table.is_none() {
            return Err(EtlError::configuration(format!(
                "Output table '{}' does not exist",
                TABLE_NAME
            )));
        }

        Ok(Self { conn })
    }

    /// Rows currently in the destination table
    pub fn row_count(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", TABLE_NAME),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl RecordSink for SqliteSink {
    fn write_chunk(&mut self, chunk: &[ValidatedUnit]) -> Result<()> {
        // Dropping the transaction without commit rolls it back.
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(INSERT_SQL)?;
            for unit in chunk {
                stmt.execute(named_params! {
                    ":anzsic06": unit.anzsic06,
                    ":area": unit.area,
                    ":year": unit.year,
                    ":geo_count": unit.geo_count,
                    ":ec_count": unit.ec_count,
                })?;
            }
        }
        tx.commit()?;

        debug!("Committed {} rows to {}", chunk.len(), TABLE_NAME);
        Ok(())
    }
}
