//! Core data structures for geographic-unit loading.
//!
//! Defines the raw input record, its validated form, rejection reasons,
//! and the job execution state reported to listeners.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// One input line, fields kept as read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeographicUnit {
    pub anzsic06: String,
    pub area: String,
    pub year_recorded: String,
    pub geo_count: String,
    pub ec_count: String,
}

impl GeographicUnit {
    pub fn new(
        anzsic06: impl Into<String>,
        area: impl Into<String>,
        year_recorded: impl Into<String>,
        geo_count: impl Into<String>,
        ec_count: impl Into<String>,
    ) -> Self {
        Self {
            anzsic06: anzsic06.into(),
            area: area.into(),
            year_recorded: year_recorded.into(),
            geo_count: geo_count.into(),
            ec_count: ec_count.into(),
        }
    }
}

/// A record that passed every validation rule, numeric fields parsed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedUnit {
    pub anzsic06: String,
    pub area: String,
    pub year: i32,
    pub geo_count: i32,
    pub ec_count: i32,
}

/// Why a record was filtered out
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    UnknownAnzsic06,
    UnknownArea,
    UnparseableNumber,
    YearOutOfRange,
    NegativeGeoCount,
    NegativeEcCount,
    /// Line could not be split into the expected fields
    MalformedLine,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RejectionReason::UnknownAnzsic06 => "unknown anzsic06 code",
            RejectionReason::UnknownArea => "unknown area code",
            RejectionReason::UnparseableNumber => "non-integer numeric field",
            RejectionReason::YearOutOfRange => "year out of range",
            RejectionReason::NegativeGeoCount => "negative geo_count",
            RejectionReason::NegativeEcCount => "negative ec_count",
            RejectionReason::MalformedLine => "malformed line",
        };
        f.write_str(text)
    }
}

/// Lifecycle of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    NotStarted,
    Running,
    Completed,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Completed | PipelineState::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            PipelineState::NotStarted => "NOT_STARTED",
            PipelineState::Running => "RUNNING",
            PipelineState::Completed => "COMPLETED",
            PipelineState::Failed => "FAILED",
        };
        f.write_str(text)
    }
}

/// Counters for the read-validate-write step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StepStats {
    /// Records taken from the source, including rejected ones
    pub read_count: usize,
    /// Records dropped by validation
    pub filter_count: usize,
    /// Records in committed chunks
    pub write_count: usize,
    /// Committed chunks
    pub commit_count: usize,
    /// Rejections broken down by reason
    pub rejections: BTreeMap<RejectionReason, usize>,
}

impl StepStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one filtered record
    pub fn add_rejection(&mut self, reason: RejectionReason) {
        self.filter_count += 1;
        *self.rejections.entry(reason).or_insert(0) += 1;
    }

    pub fn rejections_for(&self, reason: RejectionReason) -> usize {
        self.rejections.get(&reason).copied().unwrap_or(0)
    }

    /// Get summary of step counters
    pub fn summary(&self) -> String {
        format!(
            "read={} written={} filtered={} commits={}",
            self.read_count, self.write_count, self.filter_count, self.commit_count
        )
    }
}

/// Observable state of one job run
#[derive(Debug, Clone, Serialize)]
pub struct JobExecution {
    pub job_name: String,
    pub state: PipelineState,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub stats: StepStats,
    /// Error message when the run failed
    pub failure: Option<String>,
}

impl JobExecution {
    pub fn new(job_name: impl Into<String>) -> Self {
        Self {
            job_name: job_name.into(),
            state: PipelineState::NotStarted,
            started_at: None,
            ended_at: None,
            stats: StepStats::new(),
            failure: None,
        }
    }

    /// Wall-clock run time, once the run has ended
    pub fn duration(&self) -> Option<chrono::Duration> {
        match (self.started_at, self.ended_at) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }
}
