/*!
 * Incremental course sync
 *
 * For each course the folder listing is turned into a `FolderTree` once, then
 * every file is resolved to a local path, classified against the local copy
 * and downloaded when absent or stale. Files run on a bounded thread pool;
 * one file failing never stops the others.
 */

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use glob_match::glob_match;
use indicatif::ProgressBar;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{Result, SyncError};
use crate::remote::Remote;
use crate::report::{CourseFailure, RunSummary, SyncReport};
use crate::staleness::{classify, Staleness};
use crate::tree::FolderTree;
use crate::types::{Course, RemoteFile, SyncOutcome};
use crate::utils::{sanitize_segment, truncate_name};

/// Sync engine for one run
pub struct Syncer {
    /// Run configuration
    config: Config,
    /// Remote API
    remote: Arc<dyn Remote>,
    /// Pool bounding concurrent transfers
    pool: ThreadPool,
    /// Progress bar, one tick per file
    pub progress: Arc<ProgressBar>,
    /// Set to stop starting and continuing transfers
    cancel: Arc<AtomicBool>,
}

impl Syncer {
    /// Create a syncer with a pool of `config.num_threads` workers
    pub fn new(config: Config, remote: Arc<dyn Remote>, progress: Arc<ProgressBar>) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.num_threads.max(1))
            .thread_name(|i| format!("coursesync-{}", i))
            .build()
            .map_err(|e| crate::error!(Unexpected, "Failed to build thread pool: {}", e))?;

        Ok(Self {
            config,
            remote,
            pool,
            progress,
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Flag that cancels the run when set
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Sync every selected course, calling `on_report` as each one finishes.
    ///
    /// Only a failed course listing is an error; a course whose folders or
    /// files cannot be listed is recorded in the summary and the run goes on.
    pub fn run<F: FnMut(&SyncReport)>(&self, mut on_report: F) -> Result<RunSummary> {
        let entries = self.remote.courses()?;
        let courses = self.config.selector.select(entries);
        info!(selector = %self.config.selector, count = courses.len(), "syncing courses");

        let mut summary = RunSummary::default();
        for course in &courses {
            if self.cancel.load(Ordering::Relaxed) {
                summary.failed_courses.push(CourseFailure {
                    course: course.code.clone(),
                    reason: SyncError::Cancelled.to_string(),
                });
                continue;
            }

            match self.sync_course(course) {
                Ok(report) => {
                    on_report(&report);
                    summary.courses.push(report);
                }
                Err(e) => {
                    error!(course = %course.code, "course sync failed: {}", e);
                    summary.failed_courses.push(CourseFailure {
                        course: course.code.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(summary)
    }

    /// Fetch a course's listings and sync its files
    pub fn sync_course(&self, course: &Course) -> Result<SyncReport> {
        let start = Instant::now();
        self.progress.set_prefix(course.code.clone());
        self.progress.set_message("Listing folders...");

        let folders = self.remote.folders(course.id)?;
        let tree = FolderTree::build(folders, &course.code);
        debug!(course = %course.code, folders = tree.len(), "built folder tree");

        self.progress.set_message("Listing files...");
        let files = self.remote.files(course.id)?;

        let mut report = self.sync_files(&course.code, &tree, &files);
        report.duration = start.elapsed();
        Ok(report)
    }

    /// Sync a course's file listing against the output root.
    ///
    /// Every file in the listing appears in the report exactly once, in
    /// listing order. Destinations are claimed in listing order too, so when
    /// two files resolve to the same local path the later one fails instead
    /// of racing the earlier one for the same file.
    pub fn sync_files(&self, course_code: &str, tree: &FolderTree, files: &[RemoteFile]) -> SyncReport {
        let mut claimed: HashMap<PathBuf, String> = HashMap::new();
        let planned: Vec<Planned> = files
            .iter()
            .map(|file| {
                let planned = self.plan(tree, file);
                match planned {
                    Planned::Transfer { label, dest } => match claimed.get(&dest) {
                        Some(owner) => {
                            warn!(file = %file.display_name, path = %label, "destination already taken");
                            Planned::Done(
                                label,
                                SyncOutcome::Failed(format!(
                                    "Duplicate destination: already written by {}",
                                    owner
                                )),
                            )
                        }
                        None => {
                            claimed.insert(dest.clone(), file.display_name.clone());
                            Planned::Transfer { label, dest }
                        }
                    },
                    done => done,
                }
            })
            .collect();

        self.progress.set_length(files.len() as u64);
        self.progress.set_position(0);

        let outcomes: Vec<(String, SyncOutcome)> = self.pool.install(|| {
            files
                .par_iter()
                .zip(planned)
                .map(|(file, planned)| self.sync_file(file, planned))
                .collect()
        });

        let mut report = SyncReport::new(course_code);
        for (path, outcome) in outcomes {
            report.record(path, outcome);
        }
        report
    }

    /// Resolve a file's local path, or settle it without a transfer
    fn plan(&self, tree: &FolderTree, file: &RemoteFile) -> Planned {
        let dir = match tree.relative_dir(file.folder_id) {
            Ok(dir) => dir,
            Err(e) => {
                warn!(file = %file.display_name, "cannot resolve folder: {}", e);
                return Planned::Done(file.display_name.clone(), SyncOutcome::Failed(e.to_string()));
            }
        };

        let relative = dir.join(sanitize_segment(&file.display_name));
        let label = relative.to_string_lossy().to_string();

        if let Some(pattern) = self.ignored_by(file) {
            debug!(file = %label, pattern, "ignored by pattern");
            return Planned::Done(
                label,
                SyncOutcome::Ignored {
                    pattern: pattern.to_string(),
                },
            );
        }

        let dest = self.config.output_root.join(&relative);
        Planned::Transfer { label, dest }
    }

    /// Classify and transfer a single planned file
    fn sync_file(&self, file: &RemoteFile, planned: Planned) -> (String, SyncOutcome) {
        self.progress.set_message(truncate_name(&file.display_name, 40));
        let result = match planned {
            Planned::Done(label, outcome) => (label, outcome),
            Planned::Transfer { label, dest } => {
                let outcome = self.transfer(file, &label, &dest);
                (label, outcome)
            }
        };
        self.progress.inc(1);
        result
    }

    fn transfer(&self, file: &RemoteFile, label: &str, dest: &Path) -> SyncOutcome {
        let staleness = match classify(file.updated_at.as_deref(), dest) {
            Ok(staleness) => staleness,
            Err(e) => {
                warn!(file = %label, "cannot inspect local copy: {}", e);
                return SyncOutcome::Failed(SyncError::Io(e).to_string());
            }
        };
        debug!(file = %label, %staleness, size = file.size, "classified");

        if !staleness.needs_transfer() {
            return SyncOutcome::Skipped;
        }

        if self.cancel.load(Ordering::Relaxed) {
            return SyncOutcome::Failed(SyncError::Cancelled.to_string());
        }

        match self.remote.download(file, dest, &self.cancel) {
            Ok(bytes) if staleness == Staleness::Absent => SyncOutcome::Downloaded { bytes },
            Ok(bytes) => SyncOutcome::Updated { bytes },
            Err(e) => {
                let e = SyncError::from(e);
                warn!(file = %label, "download failed: {}", e);
                SyncOutcome::Failed(e.to_string())
            }
        }
    }

    /// The first ignore pattern matching the file's name
    fn ignored_by(&self, file: &RemoteFile) -> Option<&str> {
        self.config
            .ignore_patterns
            .iter()
            .map(String::as_str)
            .find(|pattern| glob_match(pattern, &file.display_name))
    }
}

/// What to do with one listed file
enum Planned {
    /// Download to `dest` if absent or stale
    Transfer { label: String, dest: PathBuf },
    /// Already settled, no transfer
    Done(String, SyncOutcome),
}
