use chrono::{Local, TimeZone};
use pretty_assertions::assert_eq;
use terraiot_core::export::{
    export_to_path, to_csv_string, write_csv, ExportError, CSV_HEADER,
};
use terraiot_core::history::{Reading, ReadingHistory};

fn fixed_reading() -> Reading {
    let ts = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
    Reading::at(5.5, 0.25, 22.0, ts)
}

#[test]
fn test_single_reading_csv() {
    let csv = to_csv_string(&[fixed_reading()]);
    assert_eq!(
        csv,
        "Timestamp,Voltage (V),Current (A),Resistance (Ω)\n2024-03-09 14:05:07,5.50,0.25,22.00\n"
    );
}

#[test]
fn test_writer_matches_string() {
    let readings = vec![fixed_reading(), fixed_reading()];
    let mut buf = Vec::new();
    write_csv(&mut buf, &readings).unwrap();

    assert_eq!(String::from_utf8(buf).unwrap(), to_csv_string(&readings));
}

#[test]
fn test_header_only_for_empty_snapshot() {
    assert_eq!(to_csv_string(&[]), format!("{}\n", CSV_HEADER));
}

#[test]
fn test_export_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("readings.csv");

    let mut history = ReadingHistory::new();
    history.push(fixed_reading());
    history.add(12.0, 0.0, 0.0);

    let summary = export_to_path(&path, &history.get_all()).unwrap();
    assert_eq!(summary.rows, 2);
    assert_eq!(summary.path, path);

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], CSV_HEADER);
    assert_eq!(lines[1], "2024-03-09 14:05:07,5.50,0.25,22.00");
    assert!(lines[2].ends_with(",12.00,0.00,0.00"));
    assert!(content.ends_with('\n'));
}

#[test]
fn test_failed_export_leaves_history_intact() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("readings.csv");

    let mut history = ReadingHistory::new();
    history.push(fixed_reading());

    let err = export_to_path(&path, &history.get_all()).unwrap_err();
    assert!(matches!(err, ExportError::Io { .. }));
    assert_eq!(history.get_all(), vec![fixed_reading()]);
}
