use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use geounit_etl::cli::{Args, OutputFormat};
use geounit_etl::pipeline::{CsvRecordSource, LoggingListener, Pipeline, SqliteSink};
use geounit_etl::{EtlConfig, JobExecution, PipelineState, RecordValidator, ReferenceCodes};
use std::process;
use tracing::{debug, info};

fn main() {
    // Parse command line arguments
    let args = Args::parse();
    setup_logging(&args);

    match run(&args) {
        Ok(_execution) => {
            // Summary has already been printed
            process::exit(0);
        }
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Load configuration and reference codes, then run the job
fn run(args: &Args) -> Result<JobExecution> {
    let mut config =
        EtlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    args.apply_overrides(&mut config);
    config.validate().context("Invalid configuration")?;
    debug!("Effective configuration: {:?}", config);

    // Reference sets must be complete before any record is validated
    let codes = ReferenceCodes::load(&config.reference).with_context(|| {
        format!(
            "Failed to load reference codes from {}",
            config.reference.workbook_path.display()
        )
    })?;
    let validator = RecordValidator::from_reference(codes);

    let sink = SqliteSink::open(&config.output.database_path).with_context(|| {
        format!(
            "Failed to open output database {}",
            config.output.database_path.display()
        )
    })?;
    let source = CsvRecordSource::open(&config.input)?;

    let mut pipeline = Pipeline::new(validator, sink, config.chunk_size)?
        .with_listener(LoggingListener)
        .with_progress(args.progress);

    let result = pipeline.run(source);
    print_summary(args.format, pipeline.execution())?;

    let execution = result.with_context(|| {
        format!(
            "Job '{}' stopped after {} committed chunk(s)",
            pipeline.execution().job_name,
            pipeline.execution().stats.commit_count
        )
    })?;
    info!("Loaded {} records", execution.stats.write_count);
    Ok(execution)
}

/// Set up structured logging based on CLI arguments
fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.log_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("geounit_etl={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
}

/// Print the run summary to stdout
fn print_summary(format: OutputFormat, execution: &JobExecution) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(execution)
                .context("Failed to serialize job execution")?;
            println!("{}", json);
        }
        OutputFormat::Text => print_text_summary(execution),
    }
    Ok(())
}

fn print_text_summary(execution: &JobExecution) {
    let stats = &execution.stats;
    let status = match execution.state {
        PipelineState::Completed => execution.state.to_string().bright_green().bold(),
        _ => execution.state.to_string().bright_red().bold(),
    };

    println!();
    println!("{} {}", "Job:".bright_cyan(), execution.job_name);
    println!("  {} {}", "Status:".bright_cyan(), status);
    if let Some(duration) = execution.duration() {
        println!(
            "  {} {:.2}s",
            "Duration:".bright_cyan(),
            duration.num_milliseconds() as f64 / 1000.0
        );
    }
    println!(
        "  {} {}",
        "Read:".bright_cyan(),
        stats.read_count.to_string().bright_white().bold()
    );
    println!(
        "  {} {} in {} chunk(s)",
        "Written:".bright_cyan(),
        stats.write_count.to_string().bright_white().bold(),
        stats.commit_count
    );
    println!(
        "  {} {}",
        "Filtered:".bright_cyan(),
        stats.filter_count.to_string().bright_yellow()
    );
    for (reason, count) in &stats.rejections {
        println!("    {} {}", format!("{}:", reason).dimmed(), count);
    }
    if let Some(failure) = &execution.failure {
        println!("  {} {}", "Failure:".bright_red(), failure);
    }
}
