//! Tests for the read-validate-write pipeline
//!
//! Shared fixtures: reference code sets, record builders, and in-memory
//! sinks/listeners that record what the pipeline did.

pub mod chunking_tests;

use super::{JobListener, RecordSink, RecordValidator};
use crate::error::{EtlError, Result};
use crate::models::{GeographicUnit, JobExecution, PipelineState, StepStats, ValidatedUnit};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

/// Validator knowing anzsic06 codes A01, B06 and areas AREA1, AREA2
pub fn create_test_validator() -> RecordValidator {
    let anzsic06: HashSet<String> = ["A01", "B06"].iter().map(|s| s.to_string()).collect();
    let areas: HashSet<String> = ["AREA1", "AREA2"].iter().map(|s| s.to_string()).collect();
    RecordValidator::new(anzsic06, areas)
}

/// A record that passes every rule
pub fn valid_unit(geo_count: i32) -> GeographicUnit {
    GeographicUnit::new("A01", "AREA1", "2020", geo_count.to_string(), "5")
}

pub fn unit(anzsic06: &str, area: &str, year: &str, geo: &str, ec: &str) -> GeographicUnit {
    GeographicUnit::new(anzsic06, area, year, geo, ec)
}

/// Wrap records as a successful source
pub fn source_of(units: Vec<GeographicUnit>) -> Vec<Result<GeographicUnit>> {
    units.into_iter().map(Ok).collect()
}

/// Sink that keeps every committed chunk, optionally failing one of them
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub committed: Vec<Vec<ValidatedUnit>>,
    /// 1-based number of the write call that fails
    pub fail_on_chunk: Option<usize>,
    pub attempts: usize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(chunk_number: usize) -> Self {
        Self {
            fail_on_chunk: Some(chunk_number),
            ..Self::default()
        }
    }

    pub fn chunk_sizes(&self) -> Vec<usize> {
        self.committed.iter().map(|chunk| chunk.len()).collect()
    }

    pub fn written_geo_counts(&self) -> Vec<i32> {
        self.committed
            .iter()
            .flatten()
            .map(|unit| unit.geo_count)
            .collect()
    }
}

impl RecordSink for RecordingSink {
    fn write_chunk(&mut self, chunk: &[ValidatedUnit]) -> Result<()> {
        self.attempts += 1;
        if self.fail_on_chunk == Some(self.attempts) {
            return Err(EtlError::configuration("simulated constraint violation"));
        }
        self.committed.push(chunk.to_vec());
        Ok(())
    }
}

/// What a listener saw at one hook
#[derive(Debug, Clone, PartialEq)]
pub struct ListenerEvent {
    pub hook: &'static str,
    pub state: PipelineState,
    pub stats: StepStats,
    pub failure: Option<String>,
}

/// Listener that records every callback into a shared log
#[derive(Debug, Clone, Default)]
pub struct RecordingListener {
    pub events: Rc<RefCell<Vec<ListenerEvent>>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, hook: &'static str, execution: &JobExecution) {
        self.events.borrow_mut().push(ListenerEvent {
            hook,
            state: execution.state,
            stats: execution.stats.clone(),
            failure: execution.failure.clone(),
        });
    }
}

impl JobListener for RecordingListener {
    fn before_job(&mut self, execution: &JobExecution) {
        self.record("before", execution);
    }

    fn after_job(&mut self, execution: &JobExecution) {
        self.record("after", execution);
    }
}
