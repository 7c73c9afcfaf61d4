// Serialization of the review table and the end-of-run summary

use crate::crawl::{CrawlOutcome, extract_url_path};
use revue_scanner::ReviewTable;
use revue_scanner::error::Result;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_OUTPUT_PATH: &str = "data.csv";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    #[default]
    Csv,
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ReportFormat::Csv),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!("Unknown output format '{}'", other)),
        }
    }
}

/// Header row plus one row per review, `\n` terminated.
///
/// Fields containing a comma, a double quote or a line break are quoted,
/// with inner quotes doubled. Ratings are written as they were scraped.
pub fn generate_csv_report(table: &ReviewTable) -> String {
    let mut report = String::new();
    report.push_str(&ReviewTable::COLUMNS.join(","));
    report.push('\n');

    for record in table {
        report.push_str(&csv_field(&record.text));
        report.push(',');
        report.push_str(&csv_field(&record.rating));
        report.push('\n');
    }

    report
}

fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// JSON array of `{"reviews": ..., "notes": ...}` objects.
pub fn generate_json_report(table: &ReviewTable) -> Result<String> {
    Ok(serde_json::to_string_pretty(table)?)
}

pub fn render_report(table: &ReviewTable, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Csv => Ok(generate_csv_report(table)),
        ReportFormat::Json => generate_json_report(table),
    }
}

/// Write `content` to `path` in one step: a hidden sibling file is written
/// first and then renamed over the destination, so an interrupted write
/// never leaves a truncated table behind.
pub fn save_report(content: &str, path: &Path) -> Result<()> {
    let temp_path = temp_sibling(path);

    let write = (|| {
        let mut file = File::create(&temp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()
    })();

    if let Err(e) = write.and_then(|_| fs::rename(&temp_path, path)) {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }

    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}

/// Human-readable summary of a finished run.
pub fn generate_summary(outcome: &CrawlOutcome) -> String {
    let mut report = String::new();
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str("# Summary:\n");
    report.push_str(&format!("  Pages extracted: {}\n", outcome.stats.pages_fetched));
    report.push_str(&format!("  Review containers: {}\n", outcome.stats.containers_found));
    report.push_str(&format!("  Reviews extracted: {}\n", outcome.table.len()));
    if outcome.stats.containers_skipped > 0 {
        report.push_str(&format!(
            "  Malformed reviews skipped: {}\n",
            outcome.stats.containers_skipped
        ));
    }
    report.push_str(&format!(
        "  Elapsed: {:.2}s\n",
        outcome.elapsed.as_secs_f64()
    ));

    report.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str(&generate_visit_list(&outcome.urls));

    report
}

/// The visit list, one path per line, in extraction order.
pub fn generate_visit_list(urls: &[String]) -> String {
    let mut report = format!("## Visit list ({} URLs)\n", urls.len());
    for url in urls {
        report.push_str(&format!("  {}\n", extract_url_path(url)));
    }
    report
}
