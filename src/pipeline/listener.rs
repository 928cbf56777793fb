//! Job lifecycle listeners
//!
//! Listeners are told when a run starts and when it reaches a terminal state.
//! They only ever see the execution by shared reference.

use crate::models::{JobExecution, PipelineState};
use tracing::{error, info};

/// Observer of a pipeline run
pub trait JobListener {
    /// Called once, after the run moves to `Running` and before the first read
    fn before_job(&mut self, _execution: &JobExecution) {}

    /// Called once, after the run reaches `Completed` or `Failed`
    fn after_job(&mut self, _execution: &JobExecution) {}
}

/// Logs job start and a completion summary
#[derive(Debug, Default)]
pub struct LoggingListener;

impl JobListener for LoggingListener {
    fn before_job(&mut self, execution: &JobExecution) {
        info!("Job '{}' starting", execution.job_name);
    }

    fn after_job(&mut self, execution: &JobExecution) {
        let stats = &execution.stats;
        let elapsed = execution
            .duration()
            .map(|d| format!("{:.2}s", d.num_milliseconds() as f64 / 1000.0))
            .unwrap_or_else(|| "n/a".to_string());

        match execution.state {
            PipelineState::Completed => info!(
                "Job '{}' finished with status {} in {}: {}",
                execution.job_name,
                execution.state,
                elapsed,
                stats.summary()
            ),
            _ => error!(
                "Job '{}' finished with status {} in {}: {} ({})",
                execution.job_name,
                execution.state,
                elapsed,
                stats.summary(),
                execution.failure.as_deref().unwrap_or("no failure recorded")
            ),
        }

        for (reason, count) in &stats.rejections {
            info!("  rejected {} record(s): {}", count, reason);
        }
    }
}
