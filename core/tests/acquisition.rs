//! Acquisition window behaviour against a scripted reader

mod common;

use common::{CountingPower, Read, RecordingSink, ScriptedReader};
use embassy_futures::block_on;
use rfid_core::{AcquisitionConfig, AcquisitionCycle};

fn window(iterations: u32) -> AcquisitionConfig {
    AcquisitionConfig {
        window_iterations: iterations,
        progress_every: 0,
        read_timeout_ms: 500,
        sleep_secs: 30,
    }
}

fn tag(bytes: &[u8]) -> Read {
    Read::Tag(bytes.to_vec())
}

#[test]
fn test_repeated_tag_reported_once() {
    let mut reader = ScriptedReader::with_reads([
        tag(&[0x0A, 0x0B, 0x0C]),
        Read::NoTag,
        tag(&[0x0A, 0x0B, 0x0C]),
    ]);
    let mut sink = RecordingSink::default();
    let mut power = CountingPower::default();
    let mut cycle: AcquisitionCycle = AcquisitionCycle::new(window(3));

    let summary = block_on(cycle.run_window(&mut reader, &mut sink, &mut power));

    assert_eq!(sink.reports, vec![vec!["0A0B0C".to_string()]]);
    assert_eq!(summary.iterations, 3);
    assert_eq!(summary.tag_reads, 2);
    assert_eq!(summary.no_tag, 1);
    assert_eq!(summary.reported, 1);
    assert!(summary.slept);
}

#[test]
fn test_two_tags_reported_then_cleared_and_suspended() {
    let mut reader = ScriptedReader::with_reads([tag(&[0x11, 0x11]), tag(&[0x22, 0x22])]);
    let mut sink = RecordingSink::default();
    let mut power = CountingPower::default();
    let mut cycle: AcquisitionCycle = AcquisitionCycle::new(window(2));

    block_on(cycle.run_window(&mut reader, &mut sink, &mut power));

    assert_eq!(sink.reports, vec![vec!["1111".to_string(), "2222".to_string()]]);
    assert!(cycle.tags().is_empty());
    assert_eq!(cycle.iteration(), 0);
    assert_eq!(power.sleeps, vec![30]);
}

#[test]
fn test_empty_window_neither_reports_nor_sleeps() {
    let mut reader = ScriptedReader::with_reads([Read::NoTag, Read::Error(0x0504), Read::NoTag]);
    let mut sink = RecordingSink::default();
    let mut power = CountingPower::default();
    let mut cycle: AcquisitionCycle = AcquisitionCycle::new(window(3));

    let summary = block_on(cycle.run_window(&mut reader, &mut sink, &mut power));

    assert!(sink.reports.is_empty());
    assert!(power.sleeps.is_empty());
    assert!(!summary.slept);
    assert_eq!(summary.errors, 1);
    assert_eq!(reader.read_calls, 3);
}

#[test]
fn test_reported_tags_do_not_leak_into_next_window() {
    let mut reader = ScriptedReader::with_reads([
        tag(&[0xAA]),
        tag(&[0xBB]),
        // second window
        tag(&[0xCC]),
        Read::NoTag,
    ]);
    let mut sink = RecordingSink::default();
    let mut power = CountingPower::default();
    let mut cycle: AcquisitionCycle = AcquisitionCycle::new(window(2));

    block_on(cycle.run_window(&mut reader, &mut sink, &mut power));
    block_on(cycle.run_window(&mut reader, &mut sink, &mut power));

    assert_eq!(
        sink.reports,
        vec![
            vec!["AA".to_string(), "BB".to_string()],
            vec!["CC".to_string()],
        ]
    );
    assert_eq!(power.sleeps.len(), 2);
}

#[test]
fn test_tag_reread_in_next_window_is_reported_again() {
    let mut reader = ScriptedReader::with_reads([tag(&[0x01]), tag(&[0x01])]);
    let mut sink = RecordingSink::default();
    let mut power = CountingPower::default();
    let mut cycle: AcquisitionCycle = AcquisitionCycle::new(window(1));

    block_on(cycle.run_window(&mut reader, &mut sink, &mut power));
    block_on(cycle.run_window(&mut reader, &mut sink, &mut power));

    assert_eq!(sink.reports.len(), 2);
    assert_eq!(sink.reports[1], vec!["01".to_string()]);
}

#[test]
fn test_progress_emitted_every_k_iterations() {
    let mut reader = ScriptedReader::with_reads([
        tag(&[0x01]),
        tag(&[0x02]),
        Read::NoTag,
        tag(&[0x02]),
        Read::NoTag,
    ]);
    let mut sink = RecordingSink::default();
    let mut power = CountingPower::default();
    let mut cycle: AcquisitionCycle = AcquisitionCycle::new(AcquisitionConfig {
        progress_every: 2,
        ..window(5)
    });

    block_on(cycle.run_window(&mut reader, &mut sink, &mut power));

    assert_eq!(sink.progress, vec![(2, 2), (4, 2)]);
}

#[test]
fn test_reads_use_configured_window_length() {
    let mut reader = ScriptedReader::default();
    let mut sink = RecordingSink::default();
    let mut power = CountingPower::default();
    let mut cycle: AcquisitionCycle = AcquisitionCycle::new(window(1000));

    let summary = block_on(cycle.run_window(&mut reader, &mut sink, &mut power));

    assert_eq!(reader.read_calls, 1000);
    assert_eq!(summary.no_tag, 1000);
}

#[test]
fn test_hundred_distinct_tags_all_reported() {
    let reads: Vec<Read> = (0u8..100).map(|i| tag(&[0xE2, i])).collect();
    let mut reader = ScriptedReader::with_reads(reads);
    let mut sink = RecordingSink::default();
    let mut power = CountingPower::default();
    let mut cycle: AcquisitionCycle = AcquisitionCycle::new(window(100));

    let summary = block_on(cycle.run_window(&mut reader, &mut sink, &mut power));

    assert_eq!(summary.reported, 100);
    assert_eq!(summary.dropped, 0);
    assert_eq!(sink.reports[0].len(), 100);
    assert_eq!(sink.reports[0][0], "E200");
    assert_eq!(sink.reports[0][99], "E263");
}

#[test]
fn test_overflowing_set_counts_dropped_reads() {
    let mut reader = ScriptedReader::with_reads([
        tag(&[0x01]),
        tag(&[0x02]),
        tag(&[0x03]),
        tag(&[0x01]),
        tag(&[0x04]),
    ]);
    let mut sink = RecordingSink::default();
    let mut power = CountingPower::default();
    let mut cycle: AcquisitionCycle<2> = AcquisitionCycle::new(window(5));

    let summary = block_on(cycle.run_window(&mut reader, &mut sink, &mut power));

    assert_eq!(summary.tag_reads, 5);
    assert_eq!(summary.dropped, 2);
    assert_eq!(summary.reported, 2);
    assert_eq!(sink.reports, vec![vec!["01".to_string(), "02".to_string()]]);
}

#[test]
fn test_empty_epc_is_not_reported() {
    let mut reader = ScriptedReader::with_reads([tag(&[])]);
    let mut sink = RecordingSink::default();
    let mut power = CountingPower::default();
    let mut cycle: AcquisitionCycle = AcquisitionCycle::new(window(1));

    let summary = block_on(cycle.run_window(&mut reader, &mut sink, &mut power));

    assert!(sink.reports.is_empty());
    assert!(power.sleeps.is_empty());
    assert_eq!(summary.dropped, 1);
}

#[test]
fn test_zero_length_window_still_reads() {
    let mut reader = ScriptedReader::with_reads([tag(&[0x42])]);
    let mut sink = RecordingSink::default();
    let mut power = CountingPower::default();
    let mut cycle: AcquisitionCycle = AcquisitionCycle::new(window(0));

    let summary = block_on(cycle.run_window(&mut reader, &mut sink, &mut power));

    assert_eq!(reader.read_calls, 1);
    assert_eq!(summary.iterations, 1);
    assert_eq!(sink.reports, vec![vec!["42".to_string()]]);
}
