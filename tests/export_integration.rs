//! Integration tests for CSV export
//!
//! Samples flow through the reader and scheduler before being exported, so
//! the file reflects exactly what the plot showed.

mod common;

use chrono::NaiveDate;
use common::assert_float_eq;
use common::builders::{at, SessionBuilder};
use serialvis::backend::{MockDevice, SerialReader};
use serialvis::config::{ExportScope, PendingPolicy, YAxisMode};
use serialvis::export::{Exporter, CSV_HEADER};
use serialvis::session::{AcquisitionSession, RenderScheduler};
use tempfile::tempdir;

fn export_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 11, 14).unwrap()
}

/// Commit each `(secs, value)` through the real pipeline
fn record(session: &mut AcquisitionSession, points: &[(i64, &str)]) {
    let device = MockDevice::new();
    let mut reader = SerialReader::new(Box::new(device.opener()), None);
    let mut render = RenderScheduler::new(PendingPolicy::All, YAxisMode::Auto, "%H:%M:%S");
    for (secs, line) in points {
        device.feed_line(line);
        reader.poll(session);
        render.tick(session, at(*secs));
    }
}

fn read_rows(path: &std::path::Path) -> Vec<csv::StringRecord> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .unwrap();
    reader.records().map(|r| r.unwrap()).collect()
}

#[test]
fn test_export_writes_rows_and_statistics() {
    let dir = tempdir().unwrap();
    let mut session = SessionBuilder::new().build();
    record(&mut session, &[(0, "10"), (1, "20"), (2, "30")]);

    let exporter = Exporter::new(dir.path(), ExportScope::Window);
    let path = exporter.export(&session, export_date()).unwrap();
    assert_eq!(path, dir.path().join("2023-11-14.csv"));

    let rows = read_rows(&path);
    assert_eq!(rows.len(), 3 + 2);
    assert_eq!(rows[0].iter().collect::<Vec<_>>(), CSV_HEADER.to_vec());
    assert_eq!(&rows[1][0], "17:13:20");
    assert_eq!(&rows[1][1], "10.0");
    assert_eq!(&rows[3][0], "17:13:22");
    assert_eq!(rows[3].len(), 2);

    let trailer = &rows[4];
    assert_eq!(trailer.len(), 5);
    assert_eq!(&trailer[0], "");
    assert_float_eq(trailer[2].parse().unwrap(), (200.0f64 / 3.0).sqrt(), 1e-9);
    assert_float_eq(trailer[3].parse().unwrap(), 20.0, 1e-12);
    assert_float_eq(trailer[4].parse().unwrap(), 200.0 / 3.0, 1e-9);
}

#[test]
fn test_export_scope_window_vs_session() {
    let points = [(0, "1"), (5, "2"), (30, "3")];

    let dir = tempdir().unwrap();
    let mut windowed = SessionBuilder::new().horizon_secs(10).build();
    record(&mut windowed, &points);
    let path = Exporter::new(dir.path(), ExportScope::Window)
        .export(&windowed, export_date())
        .unwrap();
    assert_eq!(read_rows(&path).len(), 1 + 2);

    let dir = tempdir().unwrap();
    let mut full = SessionBuilder::new()
        .horizon_secs(10)
        .scope(ExportScope::Session)
        .build();
    record(&mut full, &points);
    let path = Exporter::new(dir.path(), ExportScope::Session)
        .export(&full, export_date())
        .unwrap();
    let rows = read_rows(&path);
    assert_eq!(rows.len(), 3 + 2);
    assert_eq!(&rows[2][0], "17:13:25");
}

#[test]
fn test_export_of_empty_session() {
    let dir = tempdir().unwrap();
    let session = SessionBuilder::new().idle().build();

    let path = Exporter::new(dir.path(), ExportScope::Window)
        .export(&session, export_date())
        .unwrap();
    let text = std::fs::read_to_string(path).unwrap();
    assert_eq!(text.lines().collect::<Vec<_>>().len(), 2);
    assert!(text.ends_with(",,,,\n"));
}

#[test]
fn test_export_overwrites_same_day_file() {
    let dir = tempdir().unwrap();
    let exporter = Exporter::new(dir.path(), ExportScope::Window);

    let mut session = SessionBuilder::new().build();
    record(&mut session, &[(0, "1"), (1, "2")]);
    exporter.export(&session, export_date()).unwrap();

    session.start();
    record(&mut session, &[(2, "9")]);
    let path = exporter.export(&session, export_date()).unwrap();

    let rows = read_rows(&path);
    assert_eq!(rows.len(), 1 + 2);
    assert_eq!(&rows[1][1], "9.0");
}

#[test]
fn test_export_to_missing_directory_fails() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("not-created");
    let session = SessionBuilder::new().build();

    let err = Exporter::new(&missing, ExportScope::Window)
        .export(&session, export_date())
        .unwrap_err();
    assert!(err.to_string().contains("not-created"));
}
