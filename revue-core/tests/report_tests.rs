// Tests for table serialization and persistence

use revue_core::crawl::CrawlOutcome;
use revue_core::report::*;
use revue_scanner::{ExtractionStats, ReviewRecord, ReviewTable, ScanError};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

fn sample_table() -> ReviewTable {
    ReviewTable::from(vec![
        ReviewRecord::new("Super film", "4,5"),
        ReviewRecord::new("Pas terrible", "2,0"),
    ])
}

// ============================================================================
// CSV Tests
// ============================================================================

#[test]
fn test_csv_has_header_row() {
    let csv = generate_csv_report(&ReviewTable::new());
    assert_eq!(csv, "reviews,notes\n");
}

#[test]
fn test_csv_quotes_comma_decimal_ratings() {
    let csv = generate_csv_report(&sample_table());
    assert_eq!(
        csv,
        "reviews,notes\nSuper film,\"4,5\"\nPas terrible,\"2,0\"\n"
    );
}

#[test]
fn test_csv_escapes_quotes_and_newlines() {
    let table = ReviewTable::from(vec![ReviewRecord::new(
        "Il a dit \"culte\"\net je suis d'accord",
        "5",
    )]);
    let csv = generate_csv_report(&table);
    assert_eq!(
        csv,
        "reviews,notes\n\"Il a dit \"\"culte\"\"\net je suis d'accord\",5\n"
    );
}

#[test]
fn test_csv_leaves_plain_fields_unquoted() {
    let table = ReviewTable::from(vec![ReviewRecord::new("Magnifique; sublime", "5")]);
    let csv = generate_csv_report(&table);
    assert_eq!(csv, "reviews,notes\nMagnifique; sublime,5\n");
}

#[test]
fn test_csv_keeps_empty_fields() {
    let table = ReviewTable::from(vec![ReviewRecord::new("", "3,0")]);
    let csv = generate_csv_report(&table);
    assert_eq!(csv, "reviews,notes\n,\"3,0\"\n");
}

// ============================================================================
// JSON Tests
// ============================================================================

#[test]
fn test_json_uses_table_column_names() {
    let json = generate_json_report(&sample_table()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(
        value,
        serde_json::json!([
            {"reviews": "Super film", "notes": "4,5"},
            {"reviews": "Pas terrible", "notes": "2,0"}
        ])
    );
}

#[test]
fn test_json_round_trips_into_table() {
    let json = generate_json_report(&sample_table()).unwrap();
    let table: ReviewTable = serde_json::from_str(&json).unwrap();
    assert_eq!(table, sample_table());
}

#[test]
fn test_json_errors_surface_as_serialization_errors() {
    let err: ScanError = serde_json::from_str::<ReviewTable>("[{\"reviews\": 1}]")
        .unwrap_err()
        .into();
    assert!(matches!(err, ScanError::Serialization(_)));
}

// ============================================================================
// Format Tests
// ============================================================================

#[test]
fn test_report_format_parsing() {
    assert_eq!("csv".parse::<ReportFormat>(), Ok(ReportFormat::Csv));
    assert_eq!("JSON".parse::<ReportFormat>(), Ok(ReportFormat::Json));
    assert!("xlsx".parse::<ReportFormat>().is_err());
    assert_eq!(ReportFormat::default(), ReportFormat::Csv);
}

#[test]
fn test_render_report_dispatches_on_format() {
    let table = sample_table();
    assert_eq!(
        render_report(&table, ReportFormat::Csv).unwrap(),
        generate_csv_report(&table)
    );
    assert_eq!(
        render_report(&table, ReportFormat::Json).unwrap(),
        generate_json_report(&table).unwrap()
    );
}

// ============================================================================
// Persistence Tests
// ============================================================================

#[test]
fn test_save_report_writes_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.csv");

    save_report("reviews,notes\n", &path).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "reviews,notes\n");
    // Only the destination remains, no temporary file.
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_save_report_overwrites_existing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.csv");
    fs::write(&path, "old content that is longer than the new one").unwrap();

    save_report("reviews,notes\n", &path).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "reviews,notes\n");
}

#[test]
fn test_save_report_fails_for_missing_directory() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("data.csv");

    let err = save_report("reviews,notes\n", &path).unwrap_err();
    assert!(matches!(err, ScanError::IoError(_)));
    assert!(err.to_string().starts_with("IO error: "));
    assert!(!path.exists());
}

// ============================================================================
// Summary Tests
// ============================================================================

#[test]
fn test_summary_lists_counts_and_visit_list() {
    let outcome = CrawlOutcome {
        urls: vec![
            "https://example.com/film/critiques/?page=2".to_string(),
            "https://example.com/film/critiques/".to_string(),
        ],
        table: sample_table(),
        stats: ExtractionStats {
            pages_fetched: 2,
            containers_found: 3,
            records_kept: 2,
            containers_skipped: 1,
        },
        elapsed: Duration::from_millis(1500),
    };

    let summary = generate_summary(&outcome);

    assert!(summary.contains("Pages extracted: 2"));
    assert!(summary.contains("Review containers: 3"));
    assert!(summary.contains("Reviews extracted: 2"));
    assert!(summary.contains("Malformed reviews skipped: 1"));
    assert!(summary.contains("Elapsed: 1.50s"));
    assert!(summary.contains("## Visit list (2 URLs)"));
    assert!(summary.contains("  /film/critiques/?page=2\n"));
    assert!(summary.contains("  /film/critiques/\n"));
}

#[test]
fn test_summary_omits_skipped_line_in_strict_runs() {
    let outcome = CrawlOutcome {
        urls: vec!["https://example.com/".to_string()],
        table: ReviewTable::new(),
        stats: ExtractionStats::default(),
        elapsed: Duration::ZERO,
    };

    assert!(!generate_summary(&outcome).contains("skipped"));
}
