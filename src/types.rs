/*!
 * Core types and data structures for coursesync
 */

use serde::{Deserialize, Serialize};

/// Identifier of a course on the remote
pub type CourseId = u64;

/// Identifier of a folder, unique within one course
pub type FolderId = u64;

/// Course entry as returned by the course listing
#[derive(Debug, Clone, Deserialize)]
pub struct CourseEntry {
    /// Course identifier
    pub id: CourseId,
    /// Display code, absent for some restricted entries
    #[serde(default)]
    pub course_code: Option<String>,
}

/// A course selected for syncing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    /// Course identifier
    pub id: CourseId,
    /// Display code, used as the root folder name
    pub code: String,
}

/// Folder entry as returned by the folder listing
#[derive(Debug, Clone, Deserialize)]
pub struct FolderEntry {
    /// Folder identifier
    pub id: FolderId,
    /// Folder display name
    pub name: String,
    /// Enclosing folder, absent for the root
    #[serde(default)]
    pub parent_folder_id: Option<FolderId>,
}

/// One file entry from the remote file listing
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteFile {
    /// File name (leaf only)
    #[serde(rename = "filename")]
    pub display_name: String,
    /// Owning folder
    pub folder_id: FolderId,
    /// Location of the binary payload
    pub url: String,
    /// Last remote modification, RFC 3339
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Size in bytes, when reported
    #[serde(default)]
    pub size: Option<u64>,
}

/// Result of syncing a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// File was new and has been downloaded
    Downloaded { bytes: u64 },
    /// A stale local copy was replaced
    Updated { bytes: u64 },
    /// Local copy is already current
    Skipped,
    /// Name matched an ignore pattern, nothing was fetched
    Ignored { pattern: String },
    /// Resolution, transfer or filesystem error
    Failed(String),
}

/// A file and what happened to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    /// Path relative to the output root, or the display name if the path
    /// could not be resolved
    pub path: String,
    /// Failure reason, or the matching pattern for ignored files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
