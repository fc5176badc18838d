/*!
 * coursesync - Incrementally mirror course files to a local directory
 *
 * This library resolves each remote file of a course to a local path under
 * the output root, decides whether the local copy is absent, stale or
 * current, and downloads only what changed.
 */

pub mod config;
pub mod error;
pub mod logging;
pub mod remote;
pub mod report;
pub mod staleness;
pub mod sync;
pub mod tree;
pub mod types;
pub mod utils;


// Re-export main components for easier access
pub use config::{Config, CourseSelector};
pub use error::{Result, SyncError};
pub use remote::{CanvasClient, Remote, RemoteError};
pub use report::{ReportFormat, Reporter, RunSummary, SyncReport};
pub use staleness::{classify, Staleness};
pub use sync::Syncer;
pub use tree::{FolderNode, FolderTree};
pub use types::{Course, CourseEntry, FileRecord, FolderEntry, RemoteFile, SyncOutcome};
pub use utils::format_file_size;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
