//! Chunked read-validate-write pipeline
//!
//! Records are read one at a time, validated, and accepted ones are buffered
//! until `chunk_size` of them have accumulated. Each full buffer, and the
//! final partial one, is handed to the [`RecordSink`] as a single transaction.
//!
//! # Failure semantics
//!
//! - A rejected or malformed record is counted and dropped; the run continues.
//! - A chunk the sink cannot write is rolled back and the run stops in
//!   `Failed`. Chunks committed before it stay committed.
//! - A failure of the record source itself stops the run in `Failed`; the
//!   partially filled buffer is discarded.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use geounit_etl::pipeline::{
//!     CsvRecordSource, LoggingListener, Pipeline, RecordValidator, SqliteSink,
//! };
//! use geounit_etl::{EtlConfig, reference::ReferenceCodes};
//!
//! # fn example() -> geounit_etl::Result<()> {
//! let config = EtlConfig::default();
//! let codes = ReferenceCodes::load(&config.reference)?;
//! let sink = SqliteSink::open(&config.output.database_path)?;
//!
//! let validator = RecordValidator::from_reference(codes);
//! let mut pipeline =
//!     Pipeline::new(validator, sink, config.chunk_size)?.with_listener(LoggingListener);
//! let execution = pipeline.run(CsvRecordSource::open(&config.input)?)?;
//! println!("{}", execution.stats.summary());
//! # Ok(())
//! # }
//! ```

pub mod listener;
pub mod reader;
pub mod validator;
pub mod writer;

#[cfg(test)]
pub mod tests;

pub use listener::{JobListener, LoggingListener};
pub use reader::CsvRecordSource;
pub use validator::RecordValidator;
pub use writer::{RecordSink, SqliteSink};

use crate::constants::JOB_NAME;
use crate::error::{EtlError, Result};
use crate::models::{GeographicUnit, JobExecution, PipelineState, RejectionReason, ValidatedUnit};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, info};

/// Single-threaded chunked loader
pub struct Pipeline<W: RecordSink> {
    chunk_size: usize,
    validator: RecordValidator,
    writer: W,
    listeners: Vec<Box<dyn JobListener>>,
    execution: JobExecution,
    show_progress: bool,
}

impl<W: RecordSink> Pipeline<W> {
    /// Create a pipeline writing `chunk_size` records per transaction
    ///
    /// # Errors
    /// * `EtlError::Configuration` if `chunk_size` is zero
    pub fn new(validator: RecordValidator, writer: W, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(EtlError::configuration("chunk_size must be at least 1"));
        }

        Ok(Self {
            chunk_size,
            validator,
            writer,
            listeners: Vec::new(),
            execution: JobExecution::new(JOB_NAME),
            show_progress: false,
        })
    }

    pub fn with_job_name(mut self, job_name: impl Into<String>) -> Self {
        self.execution.job_name = job_name.into();
        self
    }

    pub fn with_listener(mut self, listener: impl JobListener + 'static) -> Self {
        self.listeners.push(Box::new(listener));
        self
    }

    /// Show a spinner updated on every commit
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn state(&self) -> PipelineState {
        self.execution.state
    }

    pub fn execution(&self) -> &JobExecution {
        &self.execution
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Run the job over `source` to completion or first fatal error
    ///
    /// Listeners are notified before the first read and after the run ends,
    /// whichever way it ends. On failure the execution stays available through
    /// [`Pipeline::execution`].
    ///
    /// # Errors
    /// * `EtlError::Configuration` if this pipeline has already run
    /// * `EtlError::ChunkWrite` if the sink rejects a chunk
    /// * `EtlError::SourceRead` if the record source fails
    pub fn run<I>(&mut self, source: I) -> Result<JobExecution>
    where
        I: IntoIterator<Item = Result<GeographicUnit>>,
    {
        if self.execution.state != PipelineState::NotStarted {
            return Err(EtlError::configuration(format!(
                "Job '{}' has already run (state {})",
                self.execution.job_name, self.execution.state
            )));
        }

        self.execution.state = PipelineState::Running;
        self.execution.started_at = Some(Utc::now());
        for listener in self.listeners.iter_mut() {
            listener.before_job(&self.execution);
        }

        info!(
            "Starting job '{}' with chunk size {}",
            self.execution.job_name, self.chunk_size
        );

        let progress = self.show_progress.then(create_progress_spinner);
        let outcome = self.process(source, progress.as_ref());

        self.execution.ended_at = Some(Utc::now());
        match &outcome {
            Ok(()) => {
                self.execution.state = PipelineState::Completed;
                if let Some(pb) = &progress {
                    pb.finish_with_message(format!(
                        "Completed: {}",
                        self.execution.stats.summary()
                    ));
                }
            }
            Err(e) => {
                self.execution.state = PipelineState::Failed;
                self.execution.failure = Some(e.to_string());
                error!("Job '{}' failed: {}", self.execution.job_name, e);
                if let Some(pb) = &progress {
                    pb.abandon_with_message(format!("Failed: {}", e));
                }
            }
        }

        for listener in self.listeners.iter_mut() {
            listener.after_job(&self.execution);
        }

        outcome.map(|()| self.execution.clone())
    }

    fn process<I>(&mut self, source: I, progress: Option<&ProgressBar>) -> Result<()>
    where
        I: IntoIterator<Item = Result<GeographicUnit>>,
    {
        let mut buffer: Vec<ValidatedUnit> = Vec::with_capacity(self.chunk_size);

        for item in source {
            let unit = match item {
                Ok(unit) => unit,
                Err(e) if e.is_record_level() => {
                    self.execution.stats.read_count += 1;
                    debug!("Dropping record: {}", e);
                    self.execution
                        .stats
                        .add_rejection(RejectionReason::MalformedLine);
                    continue;
                }
                Err(e) => return Err(e),
            };
            self.execution.stats.read_count += 1;

            match self.validator.check(&unit) {
                Ok(valid) => buffer.push(valid),
                Err(reason) => {
                    debug!(
                        "Rejected record {} ({}, {}): {}",
                        self.execution.stats.read_count, unit.anzsic06, unit.area, reason
                    );
                    self.execution.stats.add_rejection(reason);
                }
            }

            if buffer.len() >= self.chunk_size {
                self.flush(&mut buffer, progress)?;
            }
        }

        if !buffer.is_empty() {
            self.flush(&mut buffer, progress)?;
        }

        Ok(())
    }

    fn flush(
        &mut self,
        buffer: &mut Vec<ValidatedUnit>,
        progress: Option<&ProgressBar>,
    ) -> Result<()> {
        let chunk_number = self.execution.stats.commit_count + 1;
        let records = buffer.len();

        self.writer
            .write_chunk(buffer.as_slice())
            .map_err(|e| EtlError::chunk_write(chunk_number, records, e))?;
        buffer.clear();

        let stats = &mut self.execution.stats;
        stats.write_count += records;
        stats.commit_count += 1;
        debug!(
            "Committed chunk #{} ({} records, {} written so far)",
            chunk_number, records, stats.write_count
        );

        if let Some(pb) = progress {
            pb.set_message(format!(
                "{} chunks committed, {} written, {} filtered",
                stats.commit_count, stats.write_count, stats.filter_count
            ));
            pb.tick();
        }

        Ok(())
    }
}

fn create_progress_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message("Loading records...");
    pb
}
