//! Directory mode over a mix of voiced and silent recordings.

#![allow(clippy::unwrap_used)]

mod common;

use common::{Part, entry_count, short_voice, signal, write_mono_16};
use tempfile::TempDir;
use vadtrim::detection::DetectionParams;
use vadtrim::error::ErrorKind;
use vadtrim::pipeline::{BatchOptions, Extractor, run_batch};

#[test]
fn test_batch_lists_silent_files_in_error_log() {
    let input_dir = TempDir::new().unwrap();
    let output_root = TempDir::new().unwrap();
    let output_dir = output_root.path().join("trimmed");

    for name in ["a.wav", "c.wav", "e.wav"] {
        write_mono_16(&input_dir.path().join(name), &short_voice(16000), 16000);
    }
    for name in ["b.wav", "d.wav"] {
        write_mono_16(
            &input_dir.path().join(name),
            &signal(16000, &[(2.0, Part::Silence)]),
            16000,
        );
    }

    let report = run_batch(
        &Extractor::new(DetectionParams::default()),
        input_dir.path(),
        &output_dir,
        &BatchOptions::default(),
    )
    .unwrap();

    assert_eq!(report.processed, 5);
    assert_eq!(report.saved.len(), 3);
    assert_eq!(report.failures.len(), 2);
    assert!(
        report
            .failures
            .iter()
            .all(|f| f.kind == ErrorKind::NoActivity)
    );

    assert_eq!(entry_count(&output_dir), 3);
    for name in ["a_out.wav", "c_out.wav", "e_out.wav"] {
        assert!(output_dir.join(name).exists());
    }

    let log = input_dir.path().join("errors.txt");
    assert_eq!(report.error_log.as_deref(), Some(log.as_path()));
    let text = std::fs::read_to_string(log).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("b.wav"));
    assert!(lines[1].ends_with("d.wav"));
}

#[test]
fn test_clean_batch_writes_no_error_log() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    write_mono_16(&input_dir.path().join("take.wav"), &short_voice(16000), 16000);

    let options = BatchOptions {
        suffix: "_trim".to_string(),
        report_every: 1,
        progress: false,
    };
    let report = run_batch(
        &Extractor::new(DetectionParams::default()),
        input_dir.path(),
        output_dir.path(),
        &options,
    )
    .unwrap();

    assert!(report.failures.is_empty());
    assert!(report.error_log.is_none());
    assert!(!input_dir.path().join("errors.txt").exists());
    assert!(output_dir.path().join("take_trim.wav").exists());
}

#[test]
fn test_unreadable_file_is_recorded_not_fatal() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    std::fs::write(input_dir.path().join("broken.wav"), b"not a wav").unwrap();
    write_mono_16(&input_dir.path().join("good.wav"), &short_voice(16000), 16000);

    let report = run_batch(
        &Extractor::new(DetectionParams::default()),
        input_dir.path(),
        output_dir.path(),
        &BatchOptions::default(),
    )
    .unwrap();

    assert_eq!(report.saved.len(), 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].kind, ErrorKind::Io);
    assert!(report.error_log.is_some());
}

#[test]
fn test_missing_input_dir_is_error() {
    let root = TempDir::new().unwrap();
    let result = run_batch(
        &Extractor::new(DetectionParams::default()),
        &root.path().join("absent"),
        &root.path().join("out"),
        &BatchOptions::default(),
    );
    assert!(result.is_err());
}

#[test]
fn test_empty_suffix_keeps_original_names() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    write_mono_16(&input_dir.path().join("a.wav"), &short_voice(16000), 16000);

    let options = BatchOptions {
        suffix: String::new(),
        ..BatchOptions::default()
    };
    let report = run_batch(
        &Extractor::new(DetectionParams::default()),
        input_dir.path(),
        output_dir.path(),
        &options,
    )
    .unwrap();

    assert_eq!(report.saved, vec![output_dir.path().join("a.wav")]);
    assert!(output_dir.path().join("a.wav").exists());
    assert_eq!(entry_count(output_dir.path()), 1);
}

#[test]
fn test_empty_suffix_into_input_dir_is_refused() {
    let input_dir = TempDir::new().unwrap();
    let input = input_dir.path().join("a.wav");
    write_mono_16(&input, &short_voice(16000), 16000);
    let before = std::fs::read(&input).unwrap();

    let options = BatchOptions {
        suffix: String::new(),
        ..BatchOptions::default()
    };
    let err = run_batch(
        &Extractor::new(DetectionParams::default()),
        input_dir.path(),
        input_dir.path(),
        &options,
    )
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Config);
    assert_eq!(std::fs::read(&input).unwrap(), before);
}
