/*!
 * Configuration handling for coursesync
 */

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use clap_complete::Shell;
use tracing::warn;
use url::Url;

use crate::error::Result;
use crate::report::ReportFormat;
use crate::types::{Course, CourseEntry};
use crate::{bail, ensure};

/// Command-line arguments for coursesync
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "coursesync",
    version = env!("CARGO_PKG_VERSION"),
    about = "Mirror course files from Canvas to a local directory",
    long_about = "Downloads new course files, re-downloads files changed on the remote, and leaves up-to-date local copies untouched."
)]
pub struct Args {
    /// Base URL of the Canvas instance
    #[clap(long, env = "CANVAS_BASE_URL", required_unless_present = "generate")]
    pub base_url: Option<String>,

    /// API access token
    #[clap(long, env = "API_TOKEN", hide_env_values = true, required_unless_present = "generate")]
    pub token: Option<String>,

    /// Local directory the course trees are written to
    #[clap(long, env = "OUTPUT_PATH", required_unless_present = "generate")]
    pub output: Option<PathBuf>,

    /// Course codes to sync, comma-separated, or "all"
    #[clap(long, env = "COURSES", default_value = "all")]
    pub courses: String,

    /// Maximum concurrent downloads per course
    #[clap(long, default_value = "4")]
    pub threads: usize,

    /// Per-request timeout in seconds
    #[clap(long, default_value = "300")]
    pub timeout: u64,

    /// Page size for listings
    #[clap(long, default_value = "100")]
    pub per_page: u32,

    /// Comma-separated glob patterns of file names to leave out
    #[clap(long, value_delimiter = ',')]
    pub ignore_patterns: Vec<String>,

    /// Report output format
    #[clap(long, value_enum, default_value_t = ReportFormat::default())]
    pub format: ReportFormat,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[clap(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,
}

/// Which courses a run covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseSelector {
    /// Every active course
    All,
    /// Only courses with these codes
    Codes(BTreeSet<String>),
}

impl Default for CourseSelector {
    fn default() -> Self {
        Self::All
    }
}

impl CourseSelector {
    /// Parse `"all"`, an empty value, or a comma-separated list of codes
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
            return Self::All;
        }

        let codes: BTreeSet<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(String::from)
            .collect();

        if codes.is_empty() {
            Self::All
        } else {
            Self::Codes(codes)
        }
    }

    /// Whether a course code is selected
    pub fn matches(&self, code: &str) -> bool {
        match self {
            Self::All => true,
            Self::Codes(codes) => codes.contains(code),
        }
    }

    /// Filter the course listing, keeping its order.
    ///
    /// Entries without a code are dropped with a warning.
    pub fn select(&self, entries: impl IntoIterator<Item = CourseEntry>) -> Vec<Course> {
        entries
            .into_iter()
            .filter_map(|entry| match entry.course_code {
                Some(code) if !code.trim().is_empty() => Some(Course { id: entry.id, code }),
                _ => {
                    warn!(course_id = entry.id, "course has no course code, skipping");
                    None
                }
            })
            .filter(|course| self.matches(&course.code))
            .collect()
    }
}

impl std::fmt::Display for CourseSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Codes(codes) => {
                let joined: Vec<&str> = codes.iter().map(String::as_str).collect();
                write!(f, "{}", joined.join(", "))
            }
        }
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the Canvas instance
    pub base_url: String,

    /// API access token
    pub token: String,

    /// Output root
    pub output_root: PathBuf,

    /// Selected courses
    pub selector: CourseSelector,

    /// Maximum concurrent downloads per course
    pub num_threads: usize,

    /// Per-request timeout
    pub timeout: Duration,

    /// Listing page size
    pub per_page: u32,

    /// File name patterns to leave out
    pub ignore_patterns: Vec<String>,

    /// Report output format
    pub report_format: ReportFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            token: String::new(),
            output_root: PathBuf::from("."),
            selector: CourseSelector::All,
            num_threads: 4,
            timeout: Duration::from_secs(300),
            per_page: 100,
            ignore_patterns: Vec::new(),
            report_format: ReportFormat::default(),
        }
    }
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args(args: Args) -> Self {
        Self {
            base_url: args.base_url.unwrap_or_default(),
            token: args.token.unwrap_or_default(),
            output_root: args.output.unwrap_or_else(|| PathBuf::from(".")),
            selector: CourseSelector::parse(&args.courses),
            num_threads: args.threads,
            timeout: Duration::from_secs(args.timeout),
            per_page: args.per_page,
            ignore_patterns: args.ignore_patterns,
            report_format: args.format,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.parsed_base_url()?;
        ensure!(!self.token.trim().is_empty(), Config, "API token is empty");
        ensure!(self.num_threads > 0, Config, "--threads must be at least 1");
        ensure!(!self.timeout.is_zero(), Config, "--timeout must be at least 1 second");
        ensure!(self.per_page > 0, Config, "--per-page must be at least 1");

        if self.output_root.exists() && !self.output_root.is_dir() {
            bail!(
                Config,
                "Output path is not a directory: {}",
                self.output_root.display()
            );
        }

        Ok(())
    }

    /// The base URL, checked to be http(s)
    pub fn parsed_base_url(&self) -> Result<Url> {
        let url = Url::parse(self.base_url.trim())
            .map_err(|e| crate::error!(Config, "Invalid base URL {:?}: {}", self.base_url, e))?;
        ensure!(
            matches!(url.scheme(), "http" | "https"),
            Config,
            "Base URL must use http or https: {}",
            url
        );
        Ok(url)
    }
}
