/*!
 * Reporting functionality for coursesync
 *
 * Renders per-course sync results and the run summary either as console
 * tables (via tabled) or as JSON.
 */

use std::time::Duration;

use clap::ValueEnum;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::types::{FileRecord, SyncOutcome};
use crate::utils::format_file_size;

/// Result of syncing one course
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    /// Course code
    pub course: String,
    /// New files
    pub downloaded: Vec<FileRecord>,
    /// Replaced stale files
    pub updated: Vec<FileRecord>,
    /// Files already current or left out by an ignore pattern
    pub skipped: Vec<FileRecord>,
    /// Files that could not be synced, with reasons
    pub failed: Vec<FileRecord>,
    /// Bytes written
    pub bytes: u64,
    /// Wall time of the course sync
    #[serde(serialize_with = "serialize_duration")]
    pub duration: Duration,
}

impl SyncReport {
    /// Create an empty report for a course
    pub fn new(course: impl Into<String>) -> Self {
        Self {
            course: course.into(),
            ..Self::default()
        }
    }

    /// Record one file's outcome
    pub fn record(&mut self, path: String, outcome: SyncOutcome) {
        let plain = FileRecord { path, reason: None };
        match outcome {
            SyncOutcome::Downloaded { bytes } => {
                self.bytes += bytes;
                self.downloaded.push(plain);
            }
            SyncOutcome::Updated { bytes } => {
                self.bytes += bytes;
                self.updated.push(plain);
            }
            SyncOutcome::Skipped => self.skipped.push(plain),
            SyncOutcome::Ignored { pattern } => self.skipped.push(FileRecord {
                reason: Some(format!("ignored by pattern {}", pattern)),
                ..plain
            }),
            SyncOutcome::Failed(reason) => self.failed.push(FileRecord {
                reason: Some(reason),
                ..plain
            }),
        }
    }

    /// Number of files covered by the report
    pub fn total(&self) -> usize {
        self.downloaded.len() + self.updated.len() + self.skipped.len() + self.failed.len()
    }

    /// Whether any file failed
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// A course whose listings could not be fetched
#[derive(Debug, Clone, Serialize)]
pub struct CourseFailure {
    /// Course code
    pub course: String,
    /// Error description
    pub reason: String,
}

/// Results of a whole sync pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Per-course reports, in sync order
    pub courses: Vec<SyncReport>,
    /// Courses that could not be synced at all
    pub failed_courses: Vec<CourseFailure>,
}

impl RunSummary {
    /// Whether anything failed during the run
    pub fn has_failures(&self) -> bool {
        !self.failed_courses.is_empty() || self.courses.iter().any(SyncReport::has_failures)
    }
}

/// Format of the report output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Console tables
    Table,
    /// JSON documents, one per course and one for the summary
    Json,
}

impl Default for ReportFormat {
    fn default() -> Self {
        Self::Table
    }
}

/// Report generator for sync results
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    /// Create a new reporter
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Render a course report
    pub fn generate_report(&self, report: &SyncReport) -> String {
        match self.format {
            ReportFormat::Table => self.generate_console_report(report),
            ReportFormat::Json => to_json(report),
        }
    }

    /// Render the run summary
    pub fn generate_summary(&self, summary: &RunSummary) -> String {
        match self.format {
            ReportFormat::Table => self.create_summary_table(summary),
            ReportFormat::Json => to_json(&SummaryJson::from(summary)),
        }
    }

    /// Print a course report to stdout
    pub fn print_report(&self, report: &SyncReport) {
        println!("\n{}", self.generate_report(report));
    }

    /// Print the run summary to stdout
    pub fn print_summary(&self, summary: &RunSummary) {
        println!("\n{}", self.generate_summary(summary));
    }

    fn create_counts_table(&self, report: &SyncReport) -> String {
        #[derive(Tabled)]
        struct CountRow {
            #[tabled(rename = "Result")]
            key: &'static str,

            #[tabled(rename = "Files")]
            value: usize,
        }

        let rows = vec![
            CountRow {
                key: "Downloaded (new)",
                value: report.downloaded.len(),
            },
            CountRow {
                key: "Updated (replaced)",
                value: report.updated.len(),
            },
            CountRow {
                key: "Skipped",
                value: report.skipped.len(),
            },
            CountRow {
                key: "Failed",
                value: report.failed.len(),
            },
        ];

        styled(Table::new(rows))
    }

    fn generate_console_report(&self, report: &SyncReport) -> String {
        let mut out = format!("--- {} ---\n", report.course);
        out.push_str(&self.create_counts_table(report));
        out.push('\n');

        for (title, records) in [
            ("Downloaded", &report.downloaded),
            ("Updated", &report.updated),
            ("Skipped", &report.skipped),
        ] {
            if records.is_empty() {
                continue;
            }
            out.push_str(&format!("{}:\n", title));
            for record in records {
                match &record.reason {
                    Some(reason) => out.push_str(&format!("  - {} ({})\n", record.path, reason)),
                    None => out.push_str(&format!("  - {}\n", record.path)),
                }
            }
        }

        if !report.failed.is_empty() {
            out.push_str("Failed:\n");
            for record in &report.failed {
                let reason = record.reason.as_deref().unwrap_or("Unknown error");
                out.push_str(&format!("  - {}: {}\n", record.path, reason));
            }
        }

        out.push_str(&format!(
            "{} transferred in {:.2?}",
            format_file_size(report.bytes),
            report.duration
        ));
        out
    }

    fn create_summary_table(&self, summary: &RunSummary) -> String {
        #[derive(Tabled)]
        struct CourseRow {
            #[tabled(rename = "Course")]
            course: String,
            #[tabled(rename = "New")]
            downloaded: usize,
            #[tabled(rename = "Updated")]
            updated: usize,
            #[tabled(rename = "Skipped")]
            skipped: usize,
            #[tabled(rename = "Failed")]
            failed: String,
            #[tabled(rename = "Transferred")]
            bytes: String,
        }

        let mut rows: Vec<CourseRow> = summary
            .courses
            .iter()
            .map(|r| CourseRow {
                course: r.course.clone(),
                downloaded: r.downloaded.len(),
                updated: r.updated.len(),
                skipped: r.skipped.len(),
                failed: r.failed.len().to_string(),
                bytes: format_file_size(r.bytes),
            })
            .collect();

        rows.extend(summary.failed_courses.iter().map(|f| CourseRow {
            course: f.course.clone(),
            downloaded: 0,
            updated: 0,
            skipped: 0,
            failed: format!("course: {}", f.reason),
            bytes: "-".to_string(),
        }));

        format!("SYNC SUMMARY\n{}", styled(Table::new(rows)))
    }
}

fn styled(mut table: Table) -> String {
    table
        .with(Style::rounded())
        .with(Padding::new(1, 1, 0, 0))
        .with(Modify::new(Columns::new(..)).with(Alignment::left()));
    table.to_string()
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

fn serialize_duration<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

#[derive(Serialize)]
struct SummaryJson<'a> {
    courses: Vec<CourseCounts<'a>>,
    failed_courses: &'a [CourseFailure],
}

#[derive(Serialize)]
struct CourseCounts<'a> {
    course: &'a str,
    downloaded: usize,
    updated: usize,
    skipped: usize,
    failed: usize,
    bytes: u64,
}

impl<'a> From<&'a RunSummary> for SummaryJson<'a> {
    fn from(summary: &'a RunSummary) -> Self {
        Self {
            courses: summary
                .courses
                .iter()
                .map(|r| CourseCounts {
                    course: &r.course,
                    downloaded: r.downloaded.len(),
                    updated: r.updated.len(),
                    skipped: r.skipped.len(),
                    failed: r.failed.len(),
                    bytes: r.bytes,
                })
                .collect(),
            failed_courses: &summary.failed_courses,
        }
    }
}
