/*!
 * Remote learning-management API access
 */

mod canvas;
pub mod download;
mod error;

pub use canvas::{next_link, CanvasClient};
pub use download::write_stream;
pub use error::{RemoteError, RemoteResult};

use std::path::Path;
use std::sync::atomic::AtomicBool;

use crate::types::{CourseEntry, CourseId, FolderEntry, RemoteFile};

/// Listing and transfer operations the sync engine needs from the remote
pub trait Remote: Send + Sync {
    /// Active courses, in listing order
    fn courses(&self) -> RemoteResult<Vec<CourseEntry>>;

    /// Every folder of a course
    fn folders(&self, course: CourseId) -> RemoteResult<Vec<FolderEntry>>;

    /// Every file of a course
    fn files(&self, course: CourseId) -> RemoteResult<Vec<RemoteFile>>;

    /// Stream `file`'s payload into `dest`, returning bytes written
    fn download(&self, file: &RemoteFile, dest: &Path, cancel: &AtomicBool) -> RemoteResult<u64>;
}
