//! Tests for chunk boundaries, counters and failure handling

use super::*;
use crate::models::RejectionReason;
use crate::pipeline::Pipeline;
use std::io;

#[test]
fn test_chunks_committed_in_source_order() {
    let mut pipeline = Pipeline::new(create_test_validator(), RecordingSink::new(), 2).unwrap();
    let source = source_of((1..=5).map(valid_unit).collect());

    let execution = pipeline.run(source).unwrap();

    assert_eq!(execution.state, PipelineState::Completed);
    assert_eq!(pipeline.writer().chunk_sizes(), vec![2, 2, 1]);
    assert_eq!(pipeline.writer().written_geo_counts(), vec![1, 2, 3, 4, 5]);
    assert_eq!(execution.stats.read_count, 5);
    assert_eq!(execution.stats.write_count, 5);
    assert_eq!(execution.stats.commit_count, 3);
    assert_eq!(execution.stats.filter_count, 0);
}

#[test]
fn test_exact_multiple_has_no_trailing_chunk() {
    let mut pipeline = Pipeline::new(create_test_validator(), RecordingSink::new(), 3).unwrap();

    let execution = pipeline
        .run(source_of((1..=6).map(valid_unit).collect()))
        .unwrap();

    assert_eq!(pipeline.writer().chunk_sizes(), vec![3, 3]);
    assert_eq!(pipeline.writer().attempts, 2);
    assert_eq!(execution.stats.commit_count, 2);
}

#[test]
fn test_chunks_count_accepted_records_only() {
    let mut pipeline = Pipeline::new(create_test_validator(), RecordingSink::new(), 2).unwrap();
    let source = source_of(vec![
        valid_unit(1),
        unit("ZZZ", "AREA1", "2020", "1", "1"),
        valid_unit(2),
        unit("A01", "AREA1", "1999", "1", "1"),
        valid_unit(3),
    ]);

    let execution = pipeline.run(source).unwrap();

    assert_eq!(pipeline.writer().chunk_sizes(), vec![2, 1]);
    assert_eq!(execution.stats.read_count, 5);
    assert_eq!(execution.stats.filter_count, 2);
    assert_eq!(execution.stats.write_count, 3);
    assert_eq!(
        execution.stats.rejections_for(RejectionReason::UnknownAnzsic06),
        1
    );
    assert_eq!(
        execution.stats.rejections_for(RejectionReason::YearOutOfRange),
        1
    );
}

#[test]
fn test_read_count_is_filtered_plus_written() {
    let mut pipeline = Pipeline::new(create_test_validator(), RecordingSink::new(), 4).unwrap();
    let mut units: Vec<_> = (0..10).map(valid_unit).collect();
    units.push(unit("A01", "AREA1", "2020", "-3", "1"));
    units.push(unit("A01", "AREA1", "2020", "1", "x"));

    let execution = pipeline.run(source_of(units)).unwrap();
    let stats = &execution.stats;

    assert_eq!(stats.read_count, 12);
    assert_eq!(stats.read_count, stats.filter_count + stats.write_count);
    assert_eq!(pipeline.writer().chunk_sizes(), vec![4, 4, 2]);
}

#[test]
fn test_all_records_rejected_writes_nothing() {
    let mut pipeline = Pipeline::new(create_test_validator(), RecordingSink::new(), 2).unwrap();
    let source = source_of(vec![
        unit("ZZZ", "AREA1", "2020", "1", "1"),
        unit("A01", "NOWHERE", "2020", "1", "1"),
    ]);

    let execution = pipeline.run(source).unwrap();

    assert_eq!(execution.state, PipelineState::Completed);
    assert_eq!(pipeline.writer().attempts, 0);
    assert_eq!(execution.stats.commit_count, 0);
    assert_eq!(execution.stats.filter_count, 2);
}

#[test]
fn test_empty_source_completes() {
    let mut pipeline = Pipeline::new(create_test_validator(), RecordingSink::new(), 2).unwrap();

    let execution = pipeline.run(source_of(Vec::new())).unwrap();

    assert_eq!(execution.state, PipelineState::Completed);
    assert_eq!(execution.stats, StepStats::default());
    assert!(execution.started_at.is_some());
    assert!(execution.duration().is_some());
}

#[test]
fn test_malformed_lines_are_dropped_and_counted() {
    let mut pipeline = Pipeline::new(create_test_validator(), RecordingSink::new(), 10).unwrap();
    let source = vec![
        Ok(valid_unit(1)),
        Err(EtlError::record_parse(2, "expected 5 fields, found 3")),
        Ok(valid_unit(3)),
    ];

    let execution = pipeline.run(source).unwrap();

    assert_eq!(execution.stats.read_count, 3);
    assert_eq!(execution.stats.filter_count, 1);
    assert_eq!(
        execution.stats.rejections_for(RejectionReason::MalformedLine),
        1
    );
    assert_eq!(pipeline.writer().written_geo_counts(), vec![1, 3]);
}

#[test]
fn test_failed_chunk_keeps_earlier_commits() {
    let mut pipeline =
        Pipeline::new(create_test_validator(), RecordingSink::failing_on(2), 2).unwrap();
    let source = source_of((1..=5).map(valid_unit).collect());

    let error = pipeline.run(source).unwrap_err();

    match &error {
        EtlError::ChunkWrite {
            chunk_number,
            records,
            ..
        } => {
            assert_eq!(*chunk_number, 2);
            assert_eq!(*records, 2);
        }
        other => panic!("Expected ChunkWrite error, got {:?}", other),
    }

    assert_eq!(pipeline.state(), PipelineState::Failed);
    assert_eq!(pipeline.writer().chunk_sizes(), vec![2]);
    assert_eq!(pipeline.writer().attempts, 2);

    let execution = pipeline.execution();
    assert_eq!(execution.stats.commit_count, 1);
    assert_eq!(execution.stats.write_count, 2);
    assert_eq!(execution.stats.read_count, 4);
    assert!(execution.ended_at.is_some());
    assert!(
        execution
            .failure
            .as_deref()
            .unwrap()
            .contains("chunk #2")
    );
}

#[test]
fn test_failed_final_partial_chunk() {
    let mut pipeline =
        Pipeline::new(create_test_validator(), RecordingSink::failing_on(3), 2).unwrap();

    let result = pipeline.run(source_of((1..=5).map(valid_unit).collect()));

    assert!(matches!(
        result,
        Err(EtlError::ChunkWrite {
            chunk_number: 3,
            records: 1,
            ..
        })
    ));
    assert_eq!(pipeline.writer().chunk_sizes(), vec![2, 2]);
    assert_eq!(pipeline.execution().stats.write_count, 4);
}

#[test]
fn test_source_failure_discards_buffer() {
    let mut pipeline = Pipeline::new(create_test_validator(), RecordingSink::new(), 2).unwrap();
    let source = vec![
        Ok(valid_unit(1)),
        Ok(valid_unit(2)),
        Ok(valid_unit(3)),
        Err(EtlError::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "stream closed",
        ))),
        Ok(valid_unit(4)),
    ];

    let result = pipeline.run(source);

    assert!(matches!(result, Err(EtlError::Io(_))));
    assert_eq!(pipeline.state(), PipelineState::Failed);
    assert_eq!(pipeline.writer().written_geo_counts(), vec![1, 2]);
    assert_eq!(pipeline.execution().stats.read_count, 3);
}

#[test]
fn test_zero_chunk_size_rejected() {
    let result = Pipeline::new(create_test_validator(), RecordingSink::new(), 0);

    assert!(matches!(result, Err(EtlError::Configuration { .. })));
}

#[test]
fn test_pipeline_runs_once() {
    let mut pipeline = Pipeline::new(create_test_validator(), RecordingSink::new(), 2).unwrap();
    pipeline.run(source_of(vec![valid_unit(1)])).unwrap();

    let second = pipeline.run(source_of(vec![valid_unit(2)]));

    assert!(matches!(second, Err(EtlError::Configuration { .. })));
    assert_eq!(pipeline.state(), PipelineState::Completed);
    assert_eq!(pipeline.writer().written_geo_counts(), vec![1]);
}

#[test]
fn test_state_transitions() {
    let pipeline = Pipeline::new(create_test_validator(), RecordingSink::new(), 2).unwrap();
    assert_eq!(pipeline.state(), PipelineState::NotStarted);
    assert!(!pipeline.state().is_terminal());
    assert_eq!(pipeline.chunk_size(), 2);

    let mut pipeline = pipeline.with_job_name("customJob");
    let execution = pipeline.run(source_of(vec![valid_unit(1)])).unwrap();

    assert_eq!(execution.job_name, "customJob");
    assert!(execution.state.is_terminal());
    assert_eq!(pipeline.into_writer().attempts, 1);
}
